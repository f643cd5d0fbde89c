//! Vendor configuration files
//!
//! A vendor table is a mapping of group names and command names to plain
//! key-value templates, written in TOML (or JSON):
//!
//! ```toml
//! [metadata]
//! vendor = "acme"
//!
//! [settings]
//! strict = true
//!
//! [groups.DEFAULT]
//! HEADERS = { "X-Api-Key" = "{apiKey}" }
//!
//! [commands.LOCK]
//! METHOD = "POST"
//! URI = "https://api.example.com/cars/{vin}/lock"
//! ```

use std::fmt;
use std::ops::Range;
use std::path::Path;

use ariadne::{Color, Label, Report, ReportKind, Source};
use serde::de::{MapAccess, Visitor};
use serde::{Deserialize, Deserializer};
use thiserror::Error;
use tracing::info;

use crate::error::ResolveError;
use crate::placeholder::ScanMode;
use crate::template::{GroupTemplate, RegistryConfig, RequestTemplate, TemplateRegistry};
use crate::value::TemplateMap;

/// Errors that can occur when loading a vendor configuration
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read vendor config file: {0}")]
    IoError(#[from] std::io::Error),
    #[error("Failed to parse vendor config TOML: {0}")]
    TomlError(#[from] toml::de::Error),
    #[error("Failed to parse vendor config JSON: {0}")]
    JsonError(#[from] serde_json::Error),
    #[error(transparent)]
    Resolve(#[from] ResolveError),
}

impl ConfigError {
    /// Format the error with source context using ariadne
    ///
    /// Errors without a source location fall back to their display text.
    pub fn format(&self, source: &str, filename: &str) -> String {
        let (span, message) = match self {
            ConfigError::TomlError(err) => match err.span() {
                Some(span) => (span, err.message().to_string()),
                None => return self.to_string(),
            },
            ConfigError::JsonError(err) if err.line() > 0 => {
                let offset = line_column_offset(source, err.line(), err.column());
                (offset..offset, err.to_string())
            }
            _ => return self.to_string(),
        };
        render_report(source, filename, span, &message).unwrap_or_else(|| self.to_string())
    }
}

fn render_report(source: &str, filename: &str, span: Range<usize>, message: &str) -> Option<String> {
    let mut buf = Vec::new();
    Report::build(ReportKind::Error, filename, span.start)
        .with_message(message)
        .with_label(
            Label::new((filename, span))
                .with_message(message)
                .with_color(Color::Red),
        )
        .finish()
        .write((filename, Source::from(source)), &mut buf)
        .ok()?;
    String::from_utf8(buf).ok()
}

/// Byte offset of a 1-based line and column, clamped to the source length
fn line_column_offset(source: &str, line: usize, column: usize) -> usize {
    let line_start: usize = source
        .split_inclusive('\n')
        .take(line.saturating_sub(1))
        .map(str::len)
        .sum();
    (line_start + column.saturating_sub(1)).min(source.len())
}

/// Descriptive metadata, not used for resolution
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Metadata {
    pub vendor: Option<String>,
    pub description: Option<String>,
}

/// Placeholder scanning settings
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Settings {
    pub open: Option<char>,
    pub close: Option<char>,
    #[serde(default)]
    pub strict: bool,
}

impl Settings {
    pub fn registry_config(&self) -> RegistryConfig {
        let defaults = RegistryConfig::default().delimiters;
        let mode = if self.strict {
            ScanMode::Strict
        } else {
            ScanMode::Lenient
        };
        RegistryConfig::new()
            .with_delimiters(
                self.open.unwrap_or(defaults.open),
                self.close.unwrap_or(defaults.close),
            )
            .with_scan_mode(mode)
    }
}

/// A parsed vendor configuration file
///
/// Groups and commands are kept in file order, repeated names included, so
/// that registration reports them as [`ResolveError::DuplicateName`].
#[derive(Debug, Clone, Default, Deserialize)]
pub struct VendorConfig {
    #[serde(default)]
    pub metadata: Metadata,
    #[serde(default)]
    pub settings: Settings,
    #[serde(default, deserialize_with = "named_entries")]
    pub groups: Vec<(String, TemplateMap)>,
    #[serde(default, deserialize_with = "named_entries")]
    pub commands: Vec<(String, TemplateMap)>,
}

fn named_entries<'de, D>(deserializer: D) -> Result<Vec<(String, TemplateMap)>, D::Error>
where
    D: Deserializer<'de>,
{
    struct EntriesVisitor;

    impl<'de> Visitor<'de> for EntriesVisitor {
        type Value = Vec<(String, TemplateMap)>;

        fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            f.write_str("a table of named templates")
        }

        fn visit_map<A>(self, mut access: A) -> Result<Self::Value, A::Error>
        where
            A: MapAccess<'de>,
        {
            let mut entries = Vec::with_capacity(access.size_hint().unwrap_or(0));
            while let Some(entry) = access.next_entry()? {
                entries.push(entry);
            }
            Ok(entries)
        }
    }

    deserializer.deserialize_map(EntriesVisitor)
}

impl VendorConfig {
    /// Load a vendor configuration file; `.json` files are read as JSON,
    /// everything else as TOML
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let is_json = path
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));
        if is_json {
            Self::from_json_str(&content)
        } else {
            Self::from_str(&content)
        }
    }

    /// Parse a TOML vendor configuration
    pub fn from_str(content: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(content)?)
    }

    /// Parse a JSON vendor configuration
    pub fn from_json_str(content: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(content)?)
    }

    /// Register every group and command, then freeze the registry
    pub fn into_registry(self) -> Result<TemplateRegistry, ConfigError> {
        let mut registry = TemplateRegistry::with_config(self.settings.registry_config());

        for (name, fields) in self.groups {
            let group = GroupTemplate::from_map(&name, fields)?;
            registry.register_group(name, group)?;
        }
        for (name, fields) in self.commands {
            let command = RequestTemplate::from_map(&name, fields)?;
            registry.register_command(name, command)?;
        }
        registry.freeze();

        info!(
            vendor = self.metadata.vendor.as_deref().unwrap_or("unnamed"),
            "loaded vendor configuration"
        );
        Ok(registry)
    }
}
