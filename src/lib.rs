//! Request Templates - declarative request descriptors for vendor command tables
//!
//! Vendor endpoint tables describe each remote command as a small template
//! (method, URI, headers and vendor-specific keys) that can share fields
//! through named groups. This library merges a command with its groups,
//! discovers the `{placeholder}` variables the result needs, and fills them
//! from caller arguments. Sending the request is left to the caller.
//!
//! # Example
//!
//! ```rust
//! use request_templates::{compose, Arguments, VendorConfig};
//!
//! let registry = VendorConfig::from_str(r#"
//!     [groups.DEFAULT]
//!     HEADERS = { "X-Api-Key" = "{apiKey}" }
//!
//!     [commands.LOCK]
//!     METHOD = "POST"
//!     URI = "cars/{vin}/lock"
//! "#).unwrap().into_registry().unwrap();
//!
//! let mut args = Arguments::new();
//! args.insert("vin".to_string(), "WVW1".to_string());
//! args.insert("apiKey".to_string(), "secret".to_string());
//!
//! let request = compose(&registry, "LOCK", &args).unwrap();
//! assert_eq!(request.uri(), Some("cars/WVW1/lock"));
//! assert_eq!(request.headers()["X-Api-Key"], "secret");
//! ```

pub mod config;
pub mod error;
pub mod logging;
pub mod placeholder;
pub mod template;
pub mod value;

pub use config::{ConfigError, VendorConfig};
pub use error::{EntryKind, ResolveError};
pub use placeholder::{Arguments, Delimiters, Extractor, PlaceholderPath, ScanMode, MAX_DEPTH};
pub use template::{
    ArgumentSchema, GroupTemplate, RegistryConfig, RequestDescriptor, RequestTemplate,
    TemplateRegistry, DEFAULT_GROUP,
};
pub use value::{KeyPath, TemplateMap, TemplateValue};

/// Required argument names for a command
///
/// # Example
///
/// ```rust
/// use request_templates::{argument_schema, VendorConfig};
///
/// let registry = VendorConfig::from_str(r#"
///     [commands.C1]
///     URI = "cars/{id}/lock"
/// "#).unwrap().into_registry().unwrap();
///
/// let schema = argument_schema(&registry, "C1").unwrap();
/// assert_eq!(schema.iter().collect::<Vec<_>>(), vec!["id"]);
/// ```
pub fn argument_schema(
    registry: &TemplateRegistry,
    command: &str,
) -> Result<ArgumentSchema, ResolveError> {
    template::build_schema(registry, command)
}

/// Compose the request descriptor for a command
///
/// Fails with [`ResolveError::NotFound`] for an unknown command or declared
/// group, and with [`ResolveError::MissingArguments`] listing every absent
/// variable.
pub fn compose(
    registry: &TemplateRegistry,
    command: &str,
    args: &Arguments,
) -> Result<RequestDescriptor, ResolveError> {
    template::compose_request(registry, command, args)
}
