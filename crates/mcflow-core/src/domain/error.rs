// ============================================================================
// domain/error.rs - RULE AND STATE VIOLATIONS
// ============================================================================

use thiserror::Error;

use super::migration::MigrationState;

/// Root domain error type.
///
/// All errors are:
/// - Cloneable (for retry logic)
/// - Categorizable (for CLI display)
/// - Actionable (provides suggestions)
#[derive(Debug, Error, Clone, PartialEq)]
pub enum DomainError {
    // ========================================================================
    // Rule table errors (configuration)
    // ========================================================================
    #[error("Obsolete rule for {files:?} uses action 'migrate' without a migrateTo target")]
    MissingMigrateTarget { files: Vec<String> },

    #[error("Unknown obsolete rule action '{action}'")]
    UnknownRuleAction { action: String },

    #[error("Invalid obsolete rule: {reason}")]
    InvalidRule { reason: String },

    // ========================================================================
    // Document structure errors
    // ========================================================================
    #[error("Invalid section pattern for '{section}': {reason}")]
    InvalidSectionPattern { section: String, reason: String },

    #[error("Task metadata is not a JSON object")]
    TaskMetaNotObject,

    // ========================================================================
    // State machine violations
    // ========================================================================
    #[error("Illegal migration transition {from:?} -> {to:?}")]
    IllegalTransition {
        from: MigrationState,
        to: MigrationState,
    },
}

impl DomainError {
    /// Get user-actionable suggestions for fixing this error.
    pub fn suggestions(&self) -> Vec<String> {
        match self {
            Self::MissingMigrateTarget { files } => vec![
                format!("The rule covering {} file(s) needs a target", files.len()),
                "Add \"migrateTo\": \"<directory>\" to the rule".into(),
                "Or change its action to delete, backup, or warn".into(),
            ],
            Self::UnknownRuleAction { action } => vec![
                format!("'{}' is not a known action", action),
                "Valid actions: delete, backup, migrate, warn".into(),
            ],
            Self::InvalidRule { reason } => vec![
                "Check the obsolete rules file".into(),
                format!("Details: {}", reason),
            ],
            Self::TaskMetaNotObject => vec![
                "A .task-meta.json file must contain a JSON object".into(),
                "Restore it from .backup-v20/ or fix it by hand".into(),
            ],
            _ => vec!["See documentation for more details".into()],
        }
    }

    /// Error category for CLI display styling.
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::MissingMigrateTarget { .. }
            | Self::UnknownRuleAction { .. }
            | Self::InvalidRule { .. } => ErrorCategory::Configuration,
            Self::TaskMetaNotObject => ErrorCategory::Validation,
            Self::InvalidSectionPattern { .. } | Self::IllegalTransition { .. } => {
                ErrorCategory::Internal
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Validation,
    Configuration,
    Internal,
}
