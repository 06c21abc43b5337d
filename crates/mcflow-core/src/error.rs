//! Unified error handling for mcflow core.
//!
//! This module provides a unified error type that wraps domain and application
//! errors, with rich context and user-actionable suggestions.

use thiserror::Error;

use crate::application::ApplicationError;
use crate::domain::DomainError;

/// Root error type for mcflow core operations.
///
/// This enum wraps all possible errors that can occur when using mcflow-core,
/// providing a unified interface for error handling.
#[derive(Debug, Error, Clone)]
pub enum McflowError {
    /// Errors from the domain layer (rule or state violations).
    #[error("Domain error: {0}")]
    Domain(#[from] DomainError),

    /// Errors from the application layer (I/O and orchestration failures).
    #[error("Application error: {0}")]
    Application(#[from] ApplicationError),

    /// Unexpected internal errors (bugs).
    #[error("Internal error: {message}. This is a bug, please report it.")]
    Internal { message: String },
}

impl McflowError {
    /// Get user-actionable suggestions for fixing this error.
    pub fn suggestions(&self) -> Vec<String> {
        match self {
            Self::Domain(e) => e.suggestions(),
            Self::Application(e) => e.suggestions(),
            Self::Internal { .. } => vec![
                "This appears to be a bug in mcflow".into(),
                "Please report this issue at: https://github.com/cosecruz/mcflow/issues".into(),
            ],
        }
    }

    /// Get error category for display/styling purposes.
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::Domain(e) => match e.category() {
                crate::domain::ErrorCategory::Validation => ErrorCategory::Validation,
                crate::domain::ErrorCategory::Configuration => ErrorCategory::Configuration,
                crate::domain::ErrorCategory::Internal => ErrorCategory::Internal,
            },
            Self::Application(e) => e.category(),
            Self::Internal { .. } => ErrorCategory::Internal,
        }
    }

    /// `true` when the error left the project untouched and a re-run is safe.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::Application(ApplicationError::LockPoisoned)
                | Self::Application(ApplicationError::MigrationFailed { .. })
        )
    }
}

/// Error categories for UI display.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Validation,
    NotFound,
    Configuration,
    Internal,
}

/// Convenient result type alias.
pub type McflowResult<T> = Result<T, McflowError>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn domain_configuration_maps_to_configuration() {
        let err: McflowError = DomainError::MissingMigrateTarget {
            files: vec!["a.md".into()],
        }
        .into();
        assert_eq!(err.category(), ErrorCategory::Configuration);
    }

    #[test]
    fn missing_upstream_is_not_found() {
        let err: McflowError = ApplicationError::UpstreamNotFound {
            path: PathBuf::from("/nowhere"),
        }
        .into();
        assert_eq!(err.category(), ErrorCategory::NotFound);
        assert!(!err.suggestions().is_empty());
    }

    #[test]
    fn failed_migration_is_retryable() {
        let err: McflowError = ApplicationError::MigrationFailed {
            unit: "v21".into(),
            reason: "bad json".into(),
        }
        .into();
        assert!(err.is_retryable());
    }
}
