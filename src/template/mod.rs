//! Command templates, group chains and request composition
//!
//! A command template is merged over the groups it declares (plus the
//! implicit `DEFAULT` group) and its placeholders are filled from caller
//! arguments.
//!
//! # Example
//!
//! ```text
//! [groups.DEFAULT]
//! HEADERS = { "X-Api-Key" = "{apiKey}" }
//!
//! [commands.LOCK]
//! METHOD = "POST"
//! URI = "cars/{vin}/lock"
//! ```
//!
//! `LOCK` requires `apiKey` and `vin`; composing it with both yields the
//! method, URI and headers with every placeholder replaced.

mod compose;
mod groups;
mod registry;
mod schema;

pub use compose::{
    compose_request, merge_command, merge_templates, RequestDescriptor, HEADERS_KEY, METHOD_KEY,
    URI_KEY,
};
pub use groups::{resolve_group_names, resolve_group_templates};
pub use registry::{
    GroupTemplate, RegistryConfig, RequestTemplate, TemplateRegistry, DEFAULT_GROUP, GROUPS_KEY,
};
pub use schema::{build_schema, ArgumentSchema, Origin, SchemaEntry};
