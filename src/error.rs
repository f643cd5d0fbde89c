//! Error types for template registration and request resolution

use std::fmt;

use thiserror::Error;

use crate::value::KeyPath;

/// Which registry namespace a name belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryKind {
    Command,
    Group,
}

impl fmt::Display for EntryKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EntryKind::Command => write!(f, "command"),
            EntryKind::Group => write!(f, "group"),
        }
    }
}

/// Errors that can occur while registering templates or resolving requests
#[derive(Debug, Error)]
pub enum ResolveError {
    /// Name already registered in its namespace
    #[error("duplicate {kind} name: {name}")]
    DuplicateName { kind: EntryKind, name: String },

    /// Command or explicitly declared group is not registered
    #[error("{kind} not found: {name}")]
    NotFound { kind: EntryKind, name: String },

    /// Registration attempted after the registry was frozen
    #[error("registry is frozen, cannot register {kind} {name}")]
    RegistryClosed { kind: EntryKind, name: String },

    /// Composition invoked without every required variable
    #[error("missing arguments for command {command}: {}", missing.join(", "))]
    MissingArguments {
        command: String,
        missing: Vec<String>,
    },

    /// Template data does not have the expected shape
    #[error("invalid template {name}: {reason}")]
    InvalidTemplate { name: String, reason: String },

    /// Unterminated or empty placeholder (strict scan mode only)
    #[error("malformed placeholder at {path}: {value:?}")]
    MalformedPlaceholder { path: KeyPath, value: String },
}

impl ResolveError {
    pub fn not_found(kind: EntryKind, name: impl Into<String>) -> Self {
        Self::NotFound {
            kind,
            name: name.into(),
        }
    }

    pub fn invalid_template(name: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidTemplate {
            name: name.into(),
            reason: reason.into(),
        }
    }
}
