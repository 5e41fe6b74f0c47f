//! Configuration error types.
//!
//! Every variant here is fatal: configuration errors abort the whole run
//! before any per-document work is scheduled.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    /// Figment extraction or merge error.
    #[error("Configuration error: {0}")]
    Figment(#[from] Box<figment::Error>),

    /// An override key does not address any configuration field.
    #[error("Unknown override key '{key}'")]
    UnknownOverride { key: String },

    /// An override assignment is not of the form `group.path.key=value`.
    #[error("Malformed override '{assignment}': expected group.path.key=value")]
    MalformedOverride { assignment: String },

    /// The same key appears in more than one override assignment.
    #[error("Duplicate override key '{key}'")]
    DuplicateOverride { key: String },

    /// A configuration field has an invalid value.
    #[error("Invalid configuration value for '{field}': {reason}")]
    InvalidValue { field: String, reason: String },
}

impl From<figment::Error> for ConfigError {
    fn from(err: figment::Error) -> Self {
        Self::Figment(Box::new(err))
    }
}
