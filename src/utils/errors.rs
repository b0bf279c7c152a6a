//! Error handling for the GatherPay engine
//!
//! This module defines the main error types used throughout the engine
//! and provides a unified error handling strategy.

use thiserror::Error;

use crate::models::form::FieldError;

/// Main error type for engine operations
#[derive(Error, Debug)]
pub enum EngineError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Database migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    #[error("Redis error: {0}")]
    Redis(#[from] redis::RedisError),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    /// Bad input shape, rejected before touching storage. Carries every
    /// offending field, never just the first.
    #[error("Validation failed for {} field(s)", errors.len())]
    Validation { errors: Vec<FieldError> },

    /// The requested transition is illegal given current state. The reason
    /// string is suitable for direct end-user display.
    #[error("{0}")]
    StateConflict(String),

    /// Stored data contradicts an engine invariant. Fatal to the operation;
    /// the engine aborts rather than silently repairing the data.
    #[error("Consistency violation: {0}")]
    ConsistencyViolation(String),

    #[error("Event not found: {event_id}")]
    EventNotFound { event_id: i64 },

    #[error("Registration not found: {registration_id}")]
    RegistrationNotFound { registration_id: i64 },

    #[error("Collection not found: {collection_id}")]
    CollectionNotFound { collection_id: i64 },

    #[error("Merchandise item not found: {item_id}")]
    MerchandiseItemNotFound { item_id: i64 },

    #[error("Permission denied: {0}")]
    PermissionDenied(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

/// Result type alias for engine operations
pub type Result<T> = std::result::Result<T, EngineError>;

impl EngineError {
    /// Check if the error is recoverable by retrying the operation
    pub fn is_recoverable(&self) -> bool {
        match self {
            EngineError::Database(_) => true,
            EngineError::Migration(_) => false,
            EngineError::Redis(_) => true,
            EngineError::Serialization(_) => false,
            EngineError::Config(_) => false,
            EngineError::Validation { .. } => false,
            EngineError::StateConflict(_) => false,
            EngineError::ConsistencyViolation(_) => false,
            EngineError::EventNotFound { .. } => false,
            EngineError::RegistrationNotFound { .. } => false,
            EngineError::CollectionNotFound { .. } => false,
            EngineError::MerchandiseItemNotFound { .. } => false,
            EngineError::PermissionDenied(_) => false,
            EngineError::InvalidInput(_) => false,
        }
    }

    /// Get error severity level
    pub fn severity(&self) -> ErrorSeverity {
        match self {
            EngineError::Database(_) => ErrorSeverity::Critical,
            EngineError::Migration(_) => ErrorSeverity::Critical,
            EngineError::Config(_) => ErrorSeverity::Critical,
            EngineError::ConsistencyViolation(_) => ErrorSeverity::Critical,
            EngineError::Redis(_) => ErrorSeverity::Warning,
            EngineError::PermissionDenied(_) => ErrorSeverity::Warning,
            EngineError::Validation { .. } => ErrorSeverity::Info,
            EngineError::StateConflict(_) => ErrorSeverity::Info,
            EngineError::InvalidInput(_) => ErrorSeverity::Info,
            _ => ErrorSeverity::Error,
        }
    }
}

/// Error severity levels
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorSeverity {
    Info,
    Warning,
    Error,
    Critical,
}

impl std::fmt::Display for ErrorSeverity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ErrorSeverity::Info => write!(f, "INFO"),
            ErrorSeverity::Warning => write!(f, "WARN"),
            ErrorSeverity::Error => write!(f, "ERROR"),
            ErrorSeverity::Critical => write!(f, "CRITICAL"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn state_conflict_displays_reason_verbatim() {
        let err = EngineError::StateConflict("Event is full".to_string());
        assert_eq!(err.to_string(), "Event is full");
    }

    #[test]
    fn validation_reports_field_count() {
        let err = EngineError::Validation {
            errors: vec![
                FieldError {
                    field_id: 1,
                    label: "Email".to_string(),
                    message: "invalid email address".to_string(),
                },
                FieldError {
                    field_id: 2,
                    label: "Phone".to_string(),
                    message: "required".to_string(),
                },
            ],
        };
        assert_eq!(err.to_string(), "Validation failed for 2 field(s)");
        assert!(!err.is_recoverable());
    }

    #[test]
    fn consistency_violation_is_critical() {
        let err = EngineError::ConsistencyViolation("total mismatch".to_string());
        assert_eq!(err.severity(), ErrorSeverity::Critical);
    }
}
