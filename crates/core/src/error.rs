//! Error types shared by LearnHub crates

use thiserror::Error;

/// Errors raised by the shared LearnHub infrastructure
///
/// Covers configuration loading, record validation and database access.
/// Recommendation-specific failures live in `learnhub-recommend`.
#[derive(Debug, Error)]
pub enum LearnHubError {
    /// Configuration could not be loaded or failed validation
    #[error("Configuration error: {message}")]
    ConfigurationError {
        message: String,
        /// Environment variable or config key at fault
        key: Option<String>,
    },

    /// A record or value is outside its documented range
    #[error("Validation error: {message}")]
    ValidationError {
        message: String,
        field: Option<String>,
    },

    /// A database operation failed
    #[error("Database error during {operation}: {message}")]
    DatabaseError { message: String, operation: String },
}

impl LearnHubError {
    pub fn validation_field(message: impl Into<String>, field: impl Into<String>) -> Self {
        Self::ValidationError {
            message: message.into(),
            field: Some(field.into()),
        }
    }

    pub fn database(message: impl Into<String>, operation: impl Into<String>) -> Self {
        Self::DatabaseError {
            message: message.into(),
            operation: operation.into(),
        }
    }

    pub fn configuration(message: impl Into<String>, key: impl Into<String>) -> Self {
        Self::ConfigurationError {
            message: message.into(),
            key: Some(key.into()),
        }
    }
}

impl From<validator::ValidationErrors> for LearnHubError {
    fn from(errors: validator::ValidationErrors) -> Self {
        let field = errors.field_errors().keys().next().map(|f| f.to_string());
        Self::ValidationError {
            message: errors.to_string(),
            field,
        }
    }
}
