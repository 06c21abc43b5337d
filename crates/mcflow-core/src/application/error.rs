//! Application layer errors.
//!
//! These errors represent failures in orchestration and I/O, not rule
//! violations. Rule violations are `DomainError` from `crate::domain`.

use std::path::PathBuf;
use thiserror::Error;

use crate::error::ErrorCategory;

/// Errors that occur during application orchestration.
#[derive(Debug, Error, Clone)]
pub enum ApplicationError {
    /// Filesystem operation failed.
    #[error("Filesystem error at {path}: {reason}")]
    FilesystemError { path: PathBuf, reason: String },

    /// The upstream workflow directory does not exist.
    #[error("Upstream workflow not found at {path}")]
    UpstreamNotFound { path: PathBuf },

    /// A file the operation needs is missing from the upstream tree.
    #[error("Upstream file missing: {path}")]
    MissingUpstreamFile { path: PathBuf },

    /// The project directory does not exist.
    #[error("Project directory not found: {path}")]
    ProjectNotFound { path: PathBuf },

    /// Deploying into the upstream repository itself.
    #[error("Refusing to deploy into the upstream workflow repository: {path}")]
    DeployIntoUpstream { path: PathBuf },

    /// No workflow installation was found in the project.
    #[error("No workflow installation found in {path}")]
    NotInstalled { path: PathBuf },

    /// A JSON document could not be parsed or produced.
    #[error("Invalid JSON in {path}: {reason}")]
    InvalidJson { path: PathBuf, reason: String },

    /// A migration unit failed after it started mutating files.
    #[error("Migration {unit} failed: {reason}")]
    MigrationFailed { unit: String, reason: String },

    /// A migration unit still reports itself applicable right after completing.
    #[error("Migration {unit} still applies after completing")]
    MigrationNotIdempotent { unit: String },

    /// The confirmation prompt could not be shown or answered.
    #[error("Prompt failed: {reason}")]
    PromptFailed { reason: String },

    /// Shared adapter state lock was poisoned.
    #[error("Adapter state lock poisoned")]
    LockPoisoned,
}

impl ApplicationError {
    /// Shorthand for [`ApplicationError::FilesystemError`].
    pub fn filesystem(path: impl Into<PathBuf>, reason: impl ToString) -> Self {
        Self::FilesystemError {
            path: path.into(),
            reason: reason.to_string(),
        }
    }

    /// Get user-actionable suggestions.
    pub fn suggestions(&self) -> Vec<String> {
        match self {
            Self::FilesystemError { path, .. } => vec![
                format!("Failed to access: {}", path.display()),
                "Check that you have write permissions".into(),
                "Ensure the parent directory exists".into(),
            ],
            Self::UpstreamNotFound { path } => vec![
                format!("Expected the workflow checkout at {}", path.display()),
                "Pass --upstream <DIR> or set MCFLOW_HOME".into(),
                "Or set workflow.home in the config file".into(),
            ],
            Self::MissingUpstreamFile { path } => vec![
                format!("The upstream tree has no {}", path.display()),
                "Update the upstream workflow checkout and retry".into(),
            ],
            Self::ProjectNotFound { path } => vec![
                format!("No directory at {}", path.display()),
                "Pass the project path as the last argument".into(),
            ],
            Self::DeployIntoUpstream { .. } => vec![
                "The target is the upstream workflow checkout".into(),
                "Run the command from a downstream MODSDK project".into(),
            ],
            Self::NotInstalled { .. } => vec![
                "Nothing to remove: no manifest or version file was found".into(),
                "Run 'mcflow deploy' to install the workflow".into(),
            ],
            Self::InvalidJson { path, .. } => vec![
                format!("Fix or remove {}", path.display()),
            ],
            Self::MigrationFailed { .. } => vec![
                "The manifest was not updated, so the migration will run again".into(),
                "Backups were written before any change (see .backup-* directories)".into(),
            ],
            Self::MigrationNotIdempotent { unit } => vec![
                format!("Migration {} did not reach its target state", unit),
                "Inspect the project and re-run 'mcflow migrate'".into(),
            ],
            Self::PromptFailed { .. } => vec![
                "Interactive input is unavailable".into(),
                "Re-run with --yes to accept the defaults".into(),
            ],
            Self::LockPoisoned => vec!["Try again in a moment".into()],
        }
    }

    /// Get error category.
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::UpstreamNotFound { .. }
            | Self::MissingUpstreamFile { .. }
            | Self::ProjectNotFound { .. }
            | Self::NotInstalled { .. } => ErrorCategory::NotFound,
            Self::DeployIntoUpstream { .. } | Self::InvalidJson { .. } => {
                ErrorCategory::Validation
            }
            Self::PromptFailed { .. } => ErrorCategory::Validation,
            Self::FilesystemError { .. }
            | Self::MigrationFailed { .. }
            | Self::MigrationNotIdempotent { .. }
            | Self::LockPoisoned => ErrorCategory::Internal,
        }
    }
}
