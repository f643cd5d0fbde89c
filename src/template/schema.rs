//! Argument schemas: the variables a caller must supply for a command

use std::collections::BTreeSet;
use std::fmt;

use tracing::debug;

use crate::error::ResolveError;
use crate::placeholder::{Arguments, PlaceholderPath};
use crate::value::{lookup_in, KeyPath};

use super::groups::resolve_group_templates;
use super::registry::TemplateRegistry;

/// Where a required placeholder was declared
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Origin {
    Command,
    Group(String),
}

impl fmt::Display for Origin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Origin::Command => write!(f, "command"),
            Origin::Group(name) => write!(f, "group {}", name),
        }
    }
}

/// A live placeholder and the template it came from
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SchemaEntry {
    pub origin: Origin,
    pub placeholder: PlaceholderPath,
}

/// The set of variable names a command needs
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ArgumentSchema {
    variables: BTreeSet<String>,
    entries: Vec<SchemaEntry>,
}

impl ArgumentSchema {
    fn from_entries(entries: Vec<SchemaEntry>) -> Self {
        let variables = entries
            .iter()
            .map(|e| e.placeholder.variable.clone())
            .collect();
        Self { variables, entries }
    }

    /// Required variable names, sorted
    pub fn variables(&self) -> &BTreeSet<String> {
        &self.variables
    }

    pub fn contains(&self, name: &str) -> bool {
        self.variables.contains(name)
    }

    pub fn len(&self) -> usize {
        self.variables.len()
    }

    pub fn is_empty(&self) -> bool {
        self.variables.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.variables.iter().map(|s| s.as_str())
    }

    /// Each placeholder occurrence that contributed to the schema
    pub fn entries(&self) -> &[SchemaEntry] {
        &self.entries
    }

    /// Required names absent from `args`, sorted
    pub fn missing(&self, args: &Arguments) -> Vec<String> {
        self.variables
            .iter()
            .filter(|name| !args.contains_key(name.as_str()))
            .cloned()
            .collect()
    }
}

/// Build the argument schema for a registered command
///
/// Variables in the command's own fields are always required. A group's
/// variable is required only when the command does not define the same
/// key-path itself.
pub fn build_schema(registry: &TemplateRegistry, command: &str) -> Result<ArgumentSchema, ResolveError> {
    let template = registry.command(command)?;
    let groups = resolve_group_templates(registry, template)?;
    let extractor = registry.extractor();

    let mut entries: Vec<SchemaEntry> = extractor
        .extract_paths(template.fields())?
        .into_iter()
        .map(|placeholder| SchemaEntry {
            origin: Origin::Command,
            placeholder,
        })
        .collect();

    for (group_name, group) in groups {
        let overridden = |path: &KeyPath| lookup_in(template.fields(), path).is_some();
        for placeholder in extractor.extract_paths_except(group.fields(), overridden)? {
            entries.push(SchemaEntry {
                origin: Origin::Group(group_name.to_string()),
                placeholder,
            });
        }
    }

    let schema = ArgumentSchema::from_entries(entries);
    debug!(command, variables = schema.len(), "built argument schema");
    Ok(schema)
}

impl TemplateRegistry {
    /// Argument schema for a command; see [`build_schema`]
    pub fn argument_schema(&self, command: &str) -> Result<ArgumentSchema, ResolveError> {
        build_schema(self, command)
    }
}
