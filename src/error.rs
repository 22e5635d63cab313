//! # Error Types
//!
//! Crate-wide error handling using thiserror. Every failure is terminal for the
//! request that raised it; nothing here is retried or partially recovered.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ApprovalError {
    /// The task store could not be reached or a query failed
    #[error("Data access error during {operation}: {source}")]
    DataAccess {
        operation: String,
        #[source]
        source: sqlx::Error,
    },

    /// Stored or submitted data that cannot be mapped back onto the known domain
    #[error("Integrity violation: {message}")]
    IntegrityViolation { message: String },

    #[error("Configuration error: {message}")]
    Configuration { message: String },

    #[error("Flow state error: {message}")]
    FlowState { message: String },
}

impl ApprovalError {
    pub fn data_access(operation: impl Into<String>, source: sqlx::Error) -> Self {
        Self::DataAccess {
            operation: operation.into(),
            source,
        }
    }

    pub fn integrity(message: impl Into<String>) -> Self {
        Self::IntegrityViolation {
            message: message.into(),
        }
    }

    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    pub fn flow_state(message: impl Into<String>) -> Self {
        Self::FlowState {
            message: message.into(),
        }
    }

    /// Whether the error came from the task store rather than from bad data
    pub fn is_data_access(&self) -> bool {
        matches!(self, Self::DataAccess { .. })
    }

    pub fn is_integrity_violation(&self) -> bool {
        matches!(self, Self::IntegrityViolation { .. })
    }
}

impl From<config::ConfigError> for ApprovalError {
    fn from(error: config::ConfigError) -> Self {
        Self::configuration(error.to_string())
    }
}

pub type ApprovalResult<T> = std::result::Result<T, ApprovalError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = ApprovalError::integrity("unknown action 'upgrade'");
        assert_eq!(err.to_string(), "Integrity violation: unknown action 'upgrade'");

        let err = ApprovalError::data_access("pending_task_groups", sqlx::Error::PoolTimedOut);
        assert!(err.to_string().starts_with("Data access error during pending_task_groups"));
        assert!(err.is_data_access());
        assert!(!err.is_integrity_violation());
    }
}
