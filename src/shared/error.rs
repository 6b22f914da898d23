//! Shared Error Types
//!
//! Errors both sides of the API can produce: the server while checking a
//! request body, the editor client before it sends one.
//!
//! - `ValidationError` names the offending field so a caller can point at it
//! - `SerializationError` covers JSON encoding and decoding
//!
//! ```rust
//! use codepocket::shared::error::SharedError;
//!
//! let error = SharedError::validation("title", "title cannot be empty");
//! assert_eq!(error.field(), Some("title"));
//! assert_eq!(error.detail(), "title cannot be empty");
//! ```
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SharedError {
    #[error("Serialization error: {message}")]
    SerializationError { message: String },

    /// Input rejected by a validator; `field` is the request field name
    #[error("Validation error in field '{field}': {message}")]
    ValidationError { field: String, message: String },
}

impl SharedError {
    pub fn serialization(message: impl Into<String>) -> Self {
        Self::SerializationError {
            message: message.into(),
        }
    }

    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::ValidationError {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Offending field, for validation errors
    pub fn field(&self) -> Option<&str> {
        match self {
            Self::ValidationError { field, .. } => Some(field),
            Self::SerializationError { .. } => None,
        }
    }

    /// The message without the variant prefix
    pub fn detail(&self) -> &str {
        match self {
            Self::ValidationError { message, .. } | Self::SerializationError { message } => message,
        }
    }

    pub fn is_validation(&self) -> bool {
        matches!(self, Self::ValidationError { .. })
    }
}

impl From<serde_json::Error> for SharedError {
    fn from(err: serde_json::Error) -> Self {
        Self::serialization(format!("JSON error: {}", err))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::validation::{normalize_tags, validate_title};

    #[test]
    fn test_validators_report_their_field() {
        let err = validate_title("   ").unwrap_err();
        assert!(err.is_validation());
        assert_eq!(err.field(), Some("title"));

        let err = normalize_tags(&["Has Space".to_string()]).unwrap_err();
        assert_eq!(err.field(), Some("tags"));
        assert_eq!(err.detail(), "Invalid tag: has space");
    }

    #[test]
    fn test_display_includes_field() {
        let err = SharedError::validation("language", "Unsupported language: klingon");
        assert_eq!(
            err.to_string(),
            "Validation error in field 'language': Unsupported language: klingon"
        );
    }

    #[test]
    fn test_from_serde_error() {
        let err: SharedError = serde_json::from_str::<serde_json::Value>("{ nope")
            .unwrap_err()
            .into();
        assert!(!err.is_validation());
        assert_eq!(err.field(), None);
        assert!(err.detail().starts_with("JSON error"));
    }
}
