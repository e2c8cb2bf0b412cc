//! Shared Error Types
//!
//! Error types used by the shared model: decoding records from the wire or the
//! cache, and validating caller-supplied input before it enters the client
//! state.
//!
//! # Error Categories
//!
//! - `SerializationError` - JSON serialization/deserialization failures
//! - `ValidationError` - Data validation failures
//!
//! # Usage
//!
//! ```rust
//! use cms_client::shared::error::SharedError;
//!
//! let error = SharedError::validation("title", "Title cannot be empty");
//! assert!(error.to_string().contains("title"));
//! ```
use thiserror::Error;

/// Errors raised by the shared model
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SharedError {
    /// JSON serialization or deserialization error
    #[error("Serialization error: {message}")]
    SerializationError {
        /// Human-readable error message
        message: String,
    },

    /// Data validation error
    #[error("Validation error in field '{field}': {message}")]
    ValidationError {
        /// The field that failed validation
        field: String,
        /// Human-readable error message
        message: String,
    },
}

impl SharedError {
    /// Create a new serialization error
    pub fn serialization(message: impl Into<String>) -> Self {
        Self::SerializationError {
            message: message.into(),
        }
    }

    /// Create a new validation error
    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::ValidationError {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Message suitable for showing to the user, without the category prefix
    pub fn user_message(&self) -> &str {
        match self {
            Self::SerializationError { message } | Self::ValidationError { message, .. } => message,
        }
    }
}

impl From<serde_json::Error> for SharedError {
    fn from(err: serde_json::Error) -> Self {
        Self::serialization(format!("JSON error: {}", err))
    }
}
