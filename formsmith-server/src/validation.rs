//! Input validation for untrusted data.
//!
//! All user-supplied input MUST be validated before use.
//! This module provides validators for common data types.

use thiserror::Error;

/// Maximum length for session IDs.
pub const MAX_SESSION_ID_LEN: usize = 64;
/// Maximum length for form names, field labels/names, and step titles.
pub const MAX_NAME_LEN: usize = 256;
/// Maximum length for validation regex sources.
pub const MAX_PATTERN_LEN: usize = 1024;
/// Maximum size of an imported document.
pub const MAX_IMPORT_LEN: usize = 1_048_576; // 1MB
/// Maximum fields per step.
pub const MAX_FIELDS_PER_STEP: usize = 200;
/// Maximum options per choice field.
pub const MAX_OPTIONS_PER_FIELD: usize = 100;

/// Validation error types.
#[derive(Debug, Error)]
pub enum ValidationError {
    /// Session ID exceeds maximum length.
    #[error("session_id too long (max {MAX_SESSION_ID_LEN} chars)")]
    SessionIdTooLong,
    /// Session ID contains invalid characters.
    #[error("session_id contains invalid characters")]
    SessionIdInvalidChars,
    /// A name, label, or title exceeds maximum length.
    #[error("{0} too long (max {MAX_NAME_LEN} chars)")]
    NameTooLong(&'static str),
    /// Pattern source exceeds maximum length.
    #[error("pattern too long (max {MAX_PATTERN_LEN} bytes)")]
    PatternTooLong,
    /// Imported document exceeds maximum size.
    #[error("import too large (max {MAX_IMPORT_LEN} bytes)")]
    ImportTooLarge,
    /// Too many fields in a step.
    #[error("too many fields in step (max {MAX_FIELDS_PER_STEP})")]
    TooManyFields,
    /// Too many options on a field.
    #[error("too many options (max {MAX_OPTIONS_PER_FIELD})")]
    TooManyOptions,
}

/// Check if a character is valid for IDs (alphanumeric, hyphen, or underscore).
fn is_valid_id_char(c: char) -> bool {
    c.is_alphanumeric() || c == '-' || c == '_'
}

/// Validate a session ID.
///
/// Valid session IDs:
/// - 1-64 characters
/// - Alphanumeric, hyphen, underscore only
///
/// # Errors
///
/// Returns [`ValidationError::SessionIdTooLong`] if the ID exceeds 64 characters.
/// Returns [`ValidationError::SessionIdInvalidChars`] if the ID is empty or contains invalid characters.
pub fn validate_session_id(id: &str) -> Result<(), ValidationError> {
    if id.len() > MAX_SESSION_ID_LEN {
        return Err(ValidationError::SessionIdTooLong);
    }
    if id.is_empty() || !id.chars().all(is_valid_id_char) {
        return Err(ValidationError::SessionIdInvalidChars);
    }
    Ok(())
}

/// Validate a form name, field label/name, or step title length.
///
/// # Errors
///
/// Returns [`ValidationError::NameTooLong`] if the text exceeds 256 characters.
pub fn validate_name(kind: &'static str, text: &str) -> Result<(), ValidationError> {
    if text.chars().count() > MAX_NAME_LEN {
        return Err(ValidationError::NameTooLong(kind));
    }
    Ok(())
}

/// Validate a regex pattern source length.
///
/// Note: whether the pattern compiles is the evaluator's concern; this
/// catches obviously oversized sources.
///
/// # Errors
///
/// Returns [`ValidationError::PatternTooLong`] if the source exceeds 1KB.
pub fn validate_pattern(pattern: &str) -> Result<(), ValidationError> {
    if pattern.len() > MAX_PATTERN_LEN {
        return Err(ValidationError::PatternTooLong);
    }
    Ok(())
}

/// Validate imported document size.
///
/// # Errors
///
/// Returns [`ValidationError::ImportTooLarge`] if the document exceeds 1MB.
pub fn validate_import_size(size: usize) -> Result<(), ValidationError> {
    if size > MAX_IMPORT_LEN {
        return Err(ValidationError::ImportTooLarge);
    }
    Ok(())
}

/// Validate field count in a step.
///
/// # Errors
///
/// Returns [`ValidationError::TooManyFields`] if the count reaches the limit.
pub fn validate_field_count(count: usize) -> Result<(), ValidationError> {
    if count >= MAX_FIELDS_PER_STEP {
        return Err(ValidationError::TooManyFields);
    }
    Ok(())
}

/// Validate option count on a field.
///
/// # Errors
///
/// Returns [`ValidationError::TooManyOptions`] if the count exceeds the limit.
pub fn validate_option_count(count: usize) -> Result<(), ValidationError> {
    if count > MAX_OPTIONS_PER_FIELD {
        return Err(ValidationError::TooManyOptions);
    }
    Ok(())
}
