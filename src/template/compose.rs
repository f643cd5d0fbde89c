//! Request composition - merges a command over its groups and fills placeholders

use std::collections::BTreeMap;

use tracing::{debug, warn};

use crate::error::ResolveError;
use crate::placeholder::Arguments;
use crate::value::{TemplateMap, TemplateValue};

use super::groups::resolve_group_templates;
use super::registry::TemplateRegistry;
use super::schema::build_schema;

pub const METHOD_KEY: &str = "METHOD";
pub const URI_KEY: &str = "URI";
pub const HEADERS_KEY: &str = "HEADERS";

/// A fully resolved request shape, ready for a transport layer
#[derive(Debug, Clone, PartialEq)]
pub struct RequestDescriptor {
    command: String,
    fields: TemplateMap,
}

impl RequestDescriptor {
    /// Name of the command this descriptor was composed for
    pub fn command(&self) -> &str {
        &self.command
    }

    pub fn fields(&self) -> &TemplateMap {
        &self.fields
    }

    pub fn into_fields(self) -> TemplateMap {
        self.fields
    }

    /// Any top-level key, including vendor passthrough keys
    pub fn get(&self, key: &str) -> Option<&TemplateValue> {
        self.fields.get(key)
    }

    pub fn method(&self) -> Option<&str> {
        self.get(METHOD_KEY).and_then(TemplateValue::as_str)
    }

    pub fn uri(&self) -> Option<&str> {
        self.get(URI_KEY).and_then(TemplateValue::as_str)
    }

    /// String-valued headers; non-string header values are skipped
    pub fn headers(&self) -> BTreeMap<&str, &str> {
        self.get(HEADERS_KEY)
            .and_then(TemplateValue::as_map)
            .map(|headers| {
                headers
                    .iter()
                    .filter_map(|(name, value)| value.as_str().map(|v| (name.as_str(), v)))
                    .collect()
            })
            .unwrap_or_default()
    }
}

/// Merge template layers leaf by leaf
///
/// Earlier layers win. Maps present in several layers are merged
/// recursively; any other value is taken from the first layer defining it.
pub fn merge_templates<'a>(layers: impl IntoIterator<Item = &'a TemplateMap>) -> TemplateMap {
    let mut merged = TemplateMap::new();
    for layer in layers {
        fill_missing(&mut merged, layer);
    }
    merged
}

fn fill_missing(target: &mut TemplateMap, source: &TemplateMap) {
    for (key, value) in source {
        match target.get_mut(key) {
            None => {
                target.insert(key.clone(), value.clone());
            }
            Some(TemplateValue::Map(existing)) => {
                if let TemplateValue::Map(incoming) = value {
                    fill_missing(existing, incoming);
                }
            }
            Some(_) => {}
        }
    }
}

/// A command merged over its group chain, placeholders still in place
pub fn merge_command(registry: &TemplateRegistry, command: &str) -> Result<TemplateMap, ResolveError> {
    let template = registry.command(command)?;
    let groups = resolve_group_templates(registry, template)?;
    let layers = std::iter::once(template.fields()).chain(groups.iter().map(|(_, g)| g.fields()));
    Ok(merge_templates(layers))
}

/// Compose the request descriptor for a command
///
/// Every variable in the command's schema must be present in `args`;
/// otherwise all missing names are reported together and nothing is
/// substituted. Extra arguments are ignored.
pub fn compose_request(
    registry: &TemplateRegistry,
    command: &str,
    args: &Arguments,
) -> Result<RequestDescriptor, ResolveError> {
    let schema = build_schema(registry, command)?;
    let missing = schema.missing(args);
    if !missing.is_empty() {
        warn!(command, missing = ?missing, "missing arguments");
        return Err(ResolveError::MissingArguments {
            command: command.to_string(),
            missing,
        });
    }

    let merged = merge_command(registry, command)?;
    let fields = registry.extractor().substitute_map(&merged, args);
    debug!(command, keys = fields.len(), "composed request");

    Ok(RequestDescriptor {
        command: command.to_string(),
        fields,
    })
}

impl TemplateRegistry {
    /// Compose a request for a command; see [`compose_request`]
    pub fn compose_request(
        &self,
        command: &str,
        args: &Arguments,
    ) -> Result<RequestDescriptor, ResolveError> {
        compose_request(self, command, args)
    }
}
