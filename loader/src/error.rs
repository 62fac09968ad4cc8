//! Error types for schema loading and document reading.
//!
//! Every failure here happens before validation starts: a schema or document
//! file that cannot be read or understood is rejected at load time and never
//! reaches the validator.

use docschema_core::SchemaError;
use thiserror::Error;

/// Errors that can occur while loading schemas, documents, or configuration.
#[derive(Debug, Error)]
pub enum LoadError {
    /// File I/O failure.
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    /// JSON parsing or serialization failure.
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    /// YAML parsing or serialization failure.
    #[error("YAML error: {0}")]
    YamlError(#[from] serde_yaml::Error),

    /// The description parsed but describes an unusable schema (empty
    /// type-set, duplicate field, unknown type name, ...).
    #[error("invalid schema: {0}")]
    InvalidSchema(#[from] SchemaError),

    /// The description does not have a recognised shape.
    #[error("invalid schema description: {0}")]
    InvalidFormat(String),

    /// File extension other than `.json`, `.yaml` or `.yml`.
    #[error("unsupported file extension: {0}")]
    UnsupportedExtension(String),

    /// A document could not be converted to typed values.
    #[error("invalid document at {location}: {reason}")]
    InvalidDocument { location: String, reason: String },
}

/// Convenience alias for results with [`LoadError`].
pub type Result<T> = std::result::Result<T, LoadError>;
