// Domain errors - Error types for the domain layer

use std::fmt;

/// Domain-specific error types
#[derive(Debug, Clone, PartialEq)]
pub enum DomainError {
    /// Invalid arguments provided
    BadArgs(String),
    /// A clip record is missing a required value
    MissingField { uid: String, field: &'static str },
    /// A clip record carries a value outside its domain
    InvalidClip { uid: String, reason: String },
    /// Invalid time range
    InvalidTimeRange(String),
    /// Validation failed
    ValidationFailed(String),
}

impl fmt::Display for DomainError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DomainError::BadArgs(msg) => write!(f, "Bad arguments: {}", msg),
            DomainError::MissingField { uid, field } => {
                write!(f, "Clip '{}' is missing required field '{}'", uid, field)
            }
            DomainError::InvalidClip { uid, reason } => {
                write!(f, "Clip '{}' is invalid: {}", uid, reason)
            }
            DomainError::InvalidTimeRange(msg) => write!(f, "Invalid time range: {}", msg),
            DomainError::ValidationFailed(msg) => write!(f, "Validation failed: {}", msg),
        }
    }
}

impl std::error::Error for DomainError {}
