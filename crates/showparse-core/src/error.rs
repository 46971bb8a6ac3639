//! Error types for showparse
//!
//! All fallible operations return `Result<T, Error>`.
//! Structural failures carry the key path where they were detected.

use thiserror::Error;

use crate::path::KeyPath;

/// A record failed validation against its schema
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    /// The schema demands a key no rule produced
    #[error("missing required key '{key}' at {path}")]
    MissingRequiredKey { path: KeyPath, key: String },

    /// A leaf has the wrong runtime type
    #[error("type mismatch at {path}: expected {expected}, found {actual}")]
    TypeMismatch {
        path: KeyPath,
        expected: String,
        actual: String,
    },

    /// A leaf falls outside its enumerated domain
    #[error("invalid value {value} at {path}, allowed: {}", .allowed.join(", "))]
    InvalidEnumValue {
        path: KeyPath,
        value: String,
        allowed: Vec<String>,
    },

    /// Strict mode: a key the schema does not declare
    #[error("unexpected key '{key}' at {path}")]
    UnexpectedKey { path: KeyPath, key: String },

    /// Nothing was extracted (whole record, or a required table)
    #[error("no data extracted at {path}")]
    EmptyResult { path: KeyPath },
}

impl ValidationError {
    /// Path where the violation was detected
    pub fn path(&self) -> &KeyPath {
        match self {
            ValidationError::MissingRequiredKey { path, .. }
            | ValidationError::TypeMismatch { path, .. }
            | ValidationError::InvalidEnumValue { path, .. }
            | ValidationError::UnexpectedKey { path, .. }
            | ValidationError::EmptyResult { path } => path,
        }
    }
}

/// The execution capability failed to produce output
#[derive(Debug, Clone, PartialEq, Error)]
pub enum DeviceError {
    #[error("device has no output for '{0}'")]
    NoOutput(String),

    #[error("device execution failed: {0}")]
    Execution(String),
}

/// showparse error types
#[derive(Debug, Clone, PartialEq, Error)]
pub enum Error {
    /// Device returned blank output; no rule was evaluated
    #[error("empty output for '{command}'")]
    EmptyParser { command: String },

    /// Accumulated record does not conform to the parser's schema
    #[error("validation failed: {0}")]
    Validation(#[from] ValidationError),

    /// A captured value could not be converted to its declared type.
    /// This is a defect in the rule, never silently recovered.
    #[error("line {line}: rule '{rule}' cannot convert {text:?} to {target} for field '{field}'")]
    Coercion {
        line: usize,
        rule: String,
        field: String,
        text: String,
        target: String,
    },

    /// A rule tried to descend through or write over a non-mapping
    #[error("line {line}: rule '{rule}' conflicts with existing value at {path}")]
    PathConflict {
        line: usize,
        rule: String,
        path: KeyPath,
    },

    /// A descend rule's key group captured nothing, so no entry can be named
    #[error("line {line}: rule '{rule}' captured an empty key in group '{group}'")]
    EmptyKey {
        line: usize,
        rule: String,
        group: String,
    },

    /// A rule referenced a named cursor slot that was never set
    #[error("line {line}: rule '{rule}' references unset slot '{slot}'")]
    UnsetSlot {
        line: usize,
        rule: String,
        slot: String,
    },

    #[error(transparent)]
    Device(#[from] DeviceError),

    #[error("no parser registered for '{0}'")]
    UnknownCommand(String),

    #[error("command '{command}' requires parameter '{name}'")]
    MissingParameter { command: String, name: String },

    #[error("configuration error: {0}")]
    Config(String),
}

impl Error {
    /// True for failures meaning "the device produced nothing usable"
    pub fn is_empty_result(&self) -> bool {
        matches!(
            self,
            Error::EmptyParser { .. } | Error::Validation(ValidationError::EmptyResult { .. })
        )
    }
}

/// Result type alias for showparse operations
pub type Result<T> = std::result::Result<T, Error>;
