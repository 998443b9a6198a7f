//! Error types for form assembly and serialization.
//!
//! Provides a unified error type covering tree validation, definition
//! loading, and JSON/YAML encoding failures.

use thiserror::Error;

/// Errors that can occur while building, mutating, or encoding a form.
#[derive(Debug, Error)]
pub enum FormError {
    /// Two components anywhere in the tree share a non-empty field name.
    #[error("duplicate field: {0}")]
    DuplicateField(String),

    /// A supplied rule cannot be turned into a component.
    #[error("component type mismatch: {0}")]
    ComponentTypeMismatch(String),

    /// JSON parsing or serialization failure.
    #[error("serialization failure: {0}")]
    SerializationFailure(#[from] serde_json::Error),

    /// YAML parsing or serialization failure.
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// File I/O failure.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Definition file extension is neither JSON nor YAML.
    #[error("unsupported definition format: {0}")]
    UnsupportedFormat(String),
}

/// Convenience alias for results with [`FormError`].
pub type Result<T> = std::result::Result<T, FormError>;
