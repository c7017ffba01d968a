//! Error types for form document operations.

use thiserror::Error;

/// Result type for form document operations.
pub type FormResult<T> = Result<T, FormError>;

/// Errors that can occur while editing a form document.
#[derive(Debug, Error)]
pub enum FormError {
    /// Field not found anywhere in the document.
    #[error("Field not found: {0}")]
    FieldNotFound(String),

    /// Step not found in the document.
    #[error("Step not found: {0}")]
    StepNotFound(String),

    /// An index fell outside the valid range.
    #[error("Index {index} out of range (length {len})")]
    IndexOutOfRange {
        /// The rejected index.
        index: usize,
        /// Length of the sequence it was checked against.
        len: usize,
    },

    /// The last remaining step cannot be deleted.
    #[error("A form must keep at least one step")]
    LastStep,

    /// The field type string is not one of the supported types.
    #[error("Unknown field type: {0}")]
    UnknownFieldType(String),

    /// A template without steps cannot be loaded.
    #[error("Template has no steps")]
    EmptyTemplate,

    /// Document serialization/deserialization error.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
