//! Schema registry error types.

use std::fmt;

use thiserror::Error;

/// One field-level schema violation.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Violation {
    /// JSON pointer to the offending location in the instance.
    pub path: String,
    /// Validator message (missing required field, type mismatch, ...).
    pub message: String,
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.path.is_empty() {
            f.write_str(&self.message)
        } else {
            write!(f, "{}: {}", self.path, self.message)
        }
    }
}

/// Errors from the extraction-schema registry.
#[derive(Debug, Error)]
pub enum SchemaError {
    /// Requested schema name was not found in the registry.
    #[error("Schema not found: {0}")]
    NotFound(String),

    /// A schema name was registered twice with different contents.
    #[error("Schema '{0}' is already registered with a different definition")]
    Duplicate(String),

    /// JSON value did not pass schema validation.
    #[error("Validation failed: {violations:?}")]
    ValidationFailed {
        /// Individual field-level violations from the validator.
        violations: Vec<Violation>,
    },

    /// Schema generation or compilation error.
    #[error("Schema generation error: {0}")]
    Generation(String),
}
