//! # Error Types
//!
//! Typed error handling for the woodpecker backend.
//! Every fallible operation returns `Result<T, AppError>`.

use thiserror::Error;

/// Core error type shared by the store, the access layer and the gateway
#[derive(Debug, Error)]
pub enum AppError {
    /// No credential was presented at all
    #[error("Unauthorized access: {0}")]
    Unauthenticated(String),

    /// A credential was presented but is invalid or lacks privilege
    #[error("Forbidden access: {0}")]
    Forbidden(String),

    /// Referenced entity does not exist
    #[error("{entity} not found: {key}")]
    NotFound { entity: &'static str, key: String },

    /// Malformed identifier or payload
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// Document store or payment processor call failed
    #[error("Upstream failure [{service}]: {message}")]
    Upstream { service: String, message: String },

    /// Missing or invalid configuration
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Internal error (should not happen)
    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    pub fn not_found(entity: &'static str, key: impl Into<String>) -> Self {
        AppError::NotFound {
            entity,
            key: key.into(),
        }
    }

    pub fn upstream(service: impl Into<String>, message: impl ToString) -> Self {
        AppError::Upstream {
            service: service.into(),
            message: message.to_string(),
        }
    }

    /// Returns the HTTP status code appropriate for this error
    pub fn status_code(&self) -> u16 {
        match self {
            AppError::Unauthenticated(_) => 401,
            AppError::Forbidden(_) => 403,
            AppError::NotFound { .. } => 404,
            AppError::InvalidArgument(_) => 400,
            AppError::Upstream { .. } => 502,
            AppError::Configuration(_) => 500,
            AppError::Internal(_) => 500,
        }
    }

    /// True for failures that were resolved at the auth boundary
    pub fn is_auth_failure(&self) -> bool {
        matches!(self, AppError::Unauthenticated(_) | AppError::Forbidden(_))
    }
}

impl From<validator::ValidationErrors> for AppError {
    fn from(errors: validator::ValidationErrors) -> Self {
        AppError::InvalidArgument(errors.to_string())
    }
}

/// Result type alias for backend operations
pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes() {
        assert_eq!(AppError::Unauthenticated("x".into()).status_code(), 401);
        assert_eq!(AppError::Forbidden("x".into()).status_code(), 403);
        assert_eq!(AppError::not_found("order", "abc").status_code(), 404);
        assert_eq!(AppError::InvalidArgument("x".into()).status_code(), 400);
        assert_eq!(AppError::upstream("stripe", "boom").status_code(), 502);
    }

    #[test]
    fn test_auth_failures() {
        assert!(AppError::Unauthenticated("x".into()).is_auth_failure());
        assert!(AppError::Forbidden("x".into()).is_auth_failure());
        assert!(!AppError::not_found("tool", "1").is_auth_failure());
    }

    #[test]
    fn test_not_found_message() {
        let err = AppError::not_found("order", "64b7f0c2a1b2c3d4e5f60718");
        assert_eq!(err.to_string(), "order not found: 64b7f0c2a1b2c3d4e5f60718");
    }
}
