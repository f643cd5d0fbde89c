//! Template registry for storing command and group templates

use std::collections::HashMap;

use tracing::{debug, info};

use crate::error::{EntryKind, ResolveError};
use crate::placeholder::{Delimiters, Extractor, ScanMode};
use crate::value::{TemplateMap, TemplateValue};

/// Group applied to every command, after any declared groups
pub const DEFAULT_GROUP: &str = "DEFAULT";

/// Template key holding the ordered list of group names
pub const GROUPS_KEY: &str = "GROUPS";

/// A command's request template
///
/// `GROUPS` is split off at construction; `fields` holds every other key.
#[derive(Debug, Clone, PartialEq)]
pub struct RequestTemplate {
    groups: Vec<String>,
    fields: TemplateMap,
}

impl RequestTemplate {
    /// Build a template from raw key-value data
    pub fn from_map(name: &str, mut map: TemplateMap) -> Result<Self, ResolveError> {
        let groups = match map.remove(GROUPS_KEY) {
            None => Vec::new(),
            Some(TemplateValue::List(items)) => items
                .into_iter()
                .map(|item| match item {
                    TemplateValue::String(s) => Ok(s),
                    other => Err(ResolveError::invalid_template(
                        name,
                        format!("{} entries must be strings, found {}", GROUPS_KEY, other),
                    )),
                })
                .collect::<Result<Vec<_>, _>>()?,
            Some(other) => {
                return Err(ResolveError::invalid_template(
                    name,
                    format!("{} must be a list of group names, found {}", GROUPS_KEY, other),
                ))
            }
        };
        Ok(Self { groups, fields: map })
    }

    /// Declared group names, in declaration order
    pub fn groups(&self) -> &[String] {
        &self.groups
    }

    /// Every key except `GROUPS`
    pub fn fields(&self) -> &TemplateMap {
        &self.fields
    }
}

/// A named, reusable set of template fields
#[derive(Debug, Clone, PartialEq)]
pub struct GroupTemplate {
    fields: TemplateMap,
}

impl GroupTemplate {
    /// Build a group from raw key-value data; groups cannot declare `GROUPS`
    pub fn from_map(name: &str, map: TemplateMap) -> Result<Self, ResolveError> {
        if map.contains_key(GROUPS_KEY) {
            return Err(ResolveError::invalid_template(
                name,
                format!("groups cannot declare {}", GROUPS_KEY),
            ));
        }
        Ok(Self { fields: map })
    }

    pub fn fields(&self) -> &TemplateMap {
        &self.fields
    }
}

/// Placeholder scanning options shared by every lookup on a registry
#[derive(Debug, Clone, Copy, Default)]
pub struct RegistryConfig {
    pub delimiters: Delimiters,
    pub scan_mode: ScanMode,
}

impl RegistryConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the placeholder delimiter pair
    pub fn with_delimiters(mut self, open: char, close: char) -> Self {
        self.delimiters = Delimiters { open, close };
        self
    }

    /// Set how malformed placeholders are treated
    pub fn with_scan_mode(mut self, mode: ScanMode) -> Self {
        self.scan_mode = mode;
        self
    }

    pub fn extractor(&self) -> Extractor {
        Extractor::new(self.delimiters, self.scan_mode)
    }
}

/// Registry of command and group templates
///
/// Populated once, then frozen. A frozen registry is read-only and can be
/// shared across threads behind an `Arc`.
#[derive(Debug, Default)]
pub struct TemplateRegistry {
    commands: HashMap<String, RequestTemplate>,
    groups: HashMap<String, GroupTemplate>,
    config: RegistryConfig,
    frozen: bool,
}

impl TemplateRegistry {
    /// Create a new empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a new empty registry with custom scanning options
    pub fn with_config(config: RegistryConfig) -> Self {
        Self {
            config,
            ..Self::default()
        }
    }

    /// Register a command template
    pub fn register_command(
        &mut self,
        name: impl Into<String>,
        template: RequestTemplate,
    ) -> Result<(), ResolveError> {
        let name = name.into();
        self.check_open(EntryKind::Command, &name)?;
        if self.commands.contains_key(&name) {
            return Err(ResolveError::DuplicateName {
                kind: EntryKind::Command,
                name,
            });
        }
        debug!(command = %name, groups = template.groups().len(), "registered command");
        self.commands.insert(name, template);
        Ok(())
    }

    /// Register a group template
    pub fn register_group(
        &mut self,
        name: impl Into<String>,
        template: GroupTemplate,
    ) -> Result<(), ResolveError> {
        let name = name.into();
        self.check_open(EntryKind::Group, &name)?;
        if self.groups.contains_key(&name) {
            return Err(ResolveError::DuplicateName {
                kind: EntryKind::Group,
                name,
            });
        }
        debug!(group = %name, "registered group");
        self.groups.insert(name, template);
        Ok(())
    }

    fn check_open(&self, kind: EntryKind, name: &str) -> Result<(), ResolveError> {
        if self.frozen {
            return Err(ResolveError::RegistryClosed {
                kind,
                name: name.to_string(),
            });
        }
        Ok(())
    }

    /// Close the registry to further registration (idempotent)
    pub fn freeze(&mut self) {
        if !self.frozen {
            self.frozen = true;
            info!(
                commands = self.commands.len(),
                groups = self.groups.len(),
                "template registry frozen"
            );
        }
    }

    pub fn is_frozen(&self) -> bool {
        self.frozen
    }

    /// Get a command template by name
    pub fn command(&self, name: &str) -> Result<&RequestTemplate, ResolveError> {
        self.commands
            .get(name)
            .ok_or_else(|| ResolveError::not_found(EntryKind::Command, name))
    }

    /// Get a group template by name
    pub fn group(&self, name: &str) -> Result<&GroupTemplate, ResolveError> {
        self.groups
            .get(name)
            .ok_or_else(|| ResolveError::not_found(EntryKind::Group, name))
    }

    /// Get a group template together with its registered name
    pub fn group_entry(&self, name: &str) -> Option<(&str, &GroupTemplate)> {
        self.groups
            .get_key_value(name)
            .map(|(key, group)| (key.as_str(), group))
    }

    pub fn contains_command(&self, name: &str) -> bool {
        self.commands.contains_key(name)
    }

    pub fn contains_group(&self, name: &str) -> bool {
        self.groups.contains_key(name)
    }

    /// All command names, sorted
    pub fn command_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.commands.keys().map(|s| s.as_str()).collect();
        names.sort_unstable();
        names
    }

    /// All group names, sorted
    pub fn group_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.groups.keys().map(|s| s.as_str()).collect();
        names.sort_unstable();
        names
    }

    pub fn config(&self) -> &RegistryConfig {
        &self.config
    }

    /// Placeholder extractor configured for this registry
    pub fn extractor(&self) -> Extractor {
        self.config.extractor()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn uri(value: &str) -> TemplateMap {
        let mut map = TemplateMap::new();
        map.insert("URI".to_string(), value.into());
        map
    }

    fn command(value: &str) -> RequestTemplate {
        RequestTemplate::from_map("test", uri(value)).expect("Should build")
    }

    #[test]
    fn test_registry_register_and_get() {
        let mut registry = TemplateRegistry::new();
        registry
            .register_command("C1", command("cars/{id}/lock"))
            .expect("Should register");
        assert!(registry.contains_command("C1"));
        assert_eq!(
            registry.command("C1").expect("Should exist").fields()["URI"],
            "cars/{id}/lock".into()
        );
    }

    #[test]
    fn test_registry_duplicate_error() {
        let mut registry = TemplateRegistry::new();
        registry
            .register_command("C1", command("a"))
            .expect("First register should succeed");
        let result = registry.register_command("C1", command("b"));
        assert!(matches!(
            result,
            Err(ResolveError::DuplicateName {
                kind: EntryKind::Command,
                ..
            })
        ));
    }

    #[test]
    fn test_registry_duplicate_group_error() {
        let mut registry = TemplateRegistry::new();
        registry
            .register_group("AUTH", GroupTemplate::from_map("AUTH", uri("a")).expect("Should build"))
            .expect("First register should succeed");
        let result = registry
            .register_group("AUTH", GroupTemplate::from_map("AUTH", uri("b")).expect("Should build"));
        match result {
            Err(ResolveError::DuplicateName { kind, name }) => {
                assert_eq!(kind, EntryKind::Group);
                assert_eq!(name, "AUTH");
            }
            other => panic!("Expected duplicate group error, got {:?}", other),
        }
        assert_eq!(registry.group_names(), vec!["AUTH"]);
    }

    #[test]
    fn test_command_and_group_namespaces_are_separate() {
        let mut registry = TemplateRegistry::new();
        registry
            .register_command("AUTH", command("a"))
            .expect("Should register command");
        registry
            .register_group("AUTH", GroupTemplate::from_map("AUTH", uri("b")).expect("Should build"))
            .expect("Should register group with same name");
        assert!(registry.contains_group("AUTH"));
    }

    #[test]
    fn test_lookup_not_found() {
        let registry = TemplateRegistry::new();
        assert!(matches!(
            registry.command("missing"),
            Err(ResolveError::NotFound {
                kind: EntryKind::Command,
                ..
            })
        ));
        assert!(matches!(
            registry.group("missing"),
            Err(ResolveError::NotFound {
                kind: EntryKind::Group,
                ..
            })
        ));
    }

    #[test]
    fn test_freeze_closes_registry() {
        let mut registry = TemplateRegistry::new();
        registry.freeze();
        registry.freeze();
        assert!(registry.is_frozen());

        let result = registry.register_command("C1", command("a"));
        assert!(matches!(result, Err(ResolveError::RegistryClosed { .. })));

        let group = GroupTemplate::from_map("G", uri("a")).expect("Should build");
        let result = registry.register_group("G", group);
        assert!(matches!(
            result,
            Err(ResolveError::RegistryClosed {
                kind: EntryKind::Group,
                ..
            })
        ));
    }

    #[test]
    fn test_groups_split_from_fields() {
        let map: TemplateMap = toml::from_str(
            r#"
GROUPS = ["AUTH", "JSON"]
METHOD = "POST"
"#,
        )
        .expect("Should parse");
        let template = RequestTemplate::from_map("LOCK", map).expect("Should build");
        assert_eq!(template.groups(), ["AUTH", "JSON"]);
        assert!(!template.fields().contains_key(GROUPS_KEY));
    }

    #[test]
    fn test_groups_must_be_string_list() {
        let mut map = TemplateMap::new();
        map.insert(GROUPS_KEY.to_string(), "AUTH".into());
        let result = RequestTemplate::from_map("LOCK", map);
        assert!(matches!(result, Err(ResolveError::InvalidTemplate { .. })));

        let mut map = TemplateMap::new();
        map.insert(
            GROUPS_KEY.to_string(),
            TemplateValue::List(vec![TemplateValue::Integer(1)]),
        );
        let result = RequestTemplate::from_map("LOCK", map);
        assert!(matches!(result, Err(ResolveError::InvalidTemplate { .. })));
    }

    #[test]
    fn test_group_rejects_groups_key() {
        let mut map = TemplateMap::new();
        map.insert(GROUPS_KEY.to_string(), TemplateValue::List(vec![]));
        let result = GroupTemplate::from_map("AUTH", map);
        assert!(matches!(result, Err(ResolveError::InvalidTemplate { .. })));
    }

    #[test]
    fn test_names_sorted() {
        let mut registry = TemplateRegistry::new();
        registry.register_command("UNLOCK", command("u")).expect("Should register");
        registry.register_command("LOCK", command("l")).expect("Should register");
        assert_eq!(registry.command_names(), vec!["LOCK", "UNLOCK"]);
        assert!(registry.group_names().is_empty());
    }

    #[test]
    fn test_config_builder() {
        let config = RegistryConfig::new()
            .with_delimiters('<', '>')
            .with_scan_mode(ScanMode::Strict);
        let registry = TemplateRegistry::with_config(config);
        assert_eq!(registry.extractor().delimiters().open, '<');
        assert_eq!(registry.extractor().mode(), ScanMode::Strict);
    }
}
