//! Error handling for the mcflow CLI.
//!
//! Provides structured errors with:
//! - User-friendly messages
//! - Actionable suggestions
//! - Exit code mapping

use std::error::Error;
use std::path::PathBuf;

use owo_colors::OwoColorize;
use thiserror::Error;

use mcflow_core::error::{ErrorCategory as CoreCategory, McflowError};

/// Result type alias for CLI operations.
pub type CliResult<T> = Result<T, CliError>;

#[derive(Debug, Error)]
pub enum CliError {
    /// Invalid user input.
    #[error("Invalid input: {message}")]
    InvalidInput { message: String },

    /// The project path given on the command line does not exist.
    #[error("Project directory not found: {path}")]
    ProjectNotFound { path: PathBuf },

    /// A configuration file could not be read, parsed, or written.
    #[error("Configuration error: {message}")]
    ConfigError {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// An error propagated from `mcflow-core`.
    #[error("{0}")]
    Core(#[from] McflowError),

    /// An I/O operation failed.
    #[error("I/O error: {message}")]
    IoError {
        message: String,
        #[source]
        source: std::io::Error,
    },

    /// The user declined a confirmation.
    #[error("Operation cancelled{}", cancelled_at(.stage))]
    Cancelled { stage: Option<&'static str> },
}

fn cancelled_at(stage: &Option<&'static str>) -> String {
    stage.map(|s| format!(" at migration {s}")).unwrap_or_default()
}

impl From<std::io::Error> for CliError {
    fn from(err: std::io::Error) -> Self {
        CliError::IoError {
            message: err.to_string(),
            source: err,
        }
    }
}

impl CliError {
    /// Get user-actionable suggestions for fixing this error.
    pub fn suggestions(&self) -> Vec<String> {
        match self {
            Self::InvalidInput { message } => vec![
                format!("Check your input: {message}"),
                "Use --help for usage information".into(),
            ],

            Self::ProjectNotFound { path } => vec![
                format!("No directory at {}", path.display()),
                "Pass an existing project directory, or run from inside one".into(),
            ],

            Self::ConfigError { message, .. } => vec![
                format!("Configuration issue: {message}"),
                "Check the file shown by 'mcflow config path'".into(),
                "Use 'mcflow init --force' to write a fresh default config".into(),
            ],

            Self::Core(core_err) => {
                let mut hints = core_err.suggestions();
                if core_err.is_retryable() {
                    hints.push("The manifest was not updated; it is safe to run the command again".into());
                }
                hints
            }

            Self::IoError { message, .. } => vec![
                format!("I/O operation failed: {message}"),
                "Check file permissions".into(),
            ],

            Self::Cancelled { .. } => vec![
                "No changes were made by the declined step".into(),
                "Re-run with --yes to accept the defaults".into(),
            ],
        }
    }

    /// Get the error category for styling and exit codes.
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::InvalidInput { .. } => ErrorCategory::UserError,
            Self::ProjectNotFound { .. } => ErrorCategory::NotFound,
            Self::ConfigError { .. } => ErrorCategory::Configuration,
            Self::Core(core) => match core.category() {
                CoreCategory::Validation => ErrorCategory::UserError,
                CoreCategory::NotFound => ErrorCategory::NotFound,
                CoreCategory::Configuration => ErrorCategory::Configuration,
                CoreCategory::Internal => ErrorCategory::Internal,
            },
            Self::IoError { .. } => ErrorCategory::Internal,
            Self::Cancelled { .. } => ErrorCategory::UserError,
        }
    }

    /// Exit code to pass to the OS.
    ///
    /// | Category      | Code |
    /// |---------------|------|
    /// | User error    |  2   |
    /// | Not found     |  3   |
    /// | Configuration |  4   |
    /// | Internal      |  1   |
    pub fn exit_code(&self) -> u8 {
        match self.category() {
            ErrorCategory::UserError => 2,
            ErrorCategory::NotFound => 3,
            ErrorCategory::Configuration => 4,
            ErrorCategory::Internal => 1,
        }
    }

    /// Format the error for display with colors and suggestions.
    pub fn format_colored(&self, verbose: bool) -> String {
        let mut output = String::new();

        output.push_str(&format!(
            "\n{} {}\n\n",
            "✗".red().bold(),
            "Error:".red().bold()
        ));
        output.push_str(&format!("  {}\n", self.to_string().red()));

        if verbose {
            let mut source = self.source();
            while let Some(err) = source {
                output.push_str(&format!(
                    "\n  {} {}\n",
                    "→".dimmed(),
                    err.to_string().dimmed()
                ));
                source = err.source();
            }
        }

        let suggestions = self.suggestions();
        if !suggestions.is_empty() {
            output.push_str(&format!("\n{}\n", "Suggestions:".yellow().bold()));
            for suggestion in suggestions {
                output.push_str(&format!("  {suggestion}\n"));
            }
        }

        if !verbose {
            output.push('\n');
            output.push_str(&format!(
                "{} {}\n",
                "\u{2139}".blue(),
                "Use -v / --verbose for more details.".dimmed(),
            ));
        }

        output
    }

    /// Plain-text version of [`Self::format_colored`], no ANSI codes.
    pub fn format_plain(&self, verbose: bool) -> String {
        let mut out = String::new();
        out.push_str(&format!("\nError: {self}\n"));

        if verbose {
            let mut src = self.source();
            while let Some(err) = src {
                out.push_str(&format!("  Caused by: {err}\n"));
                src = err.source();
            }
        }

        let suggestions = self.suggestions();
        if !suggestions.is_empty() {
            out.push_str("\nSuggestions:\n");
            for s in &suggestions {
                out.push_str(&format!("  {s}\n"));
            }
        }

        if !verbose {
            out.push_str("\nUse -v / --verbose for more details.\n");
        }

        out
    }

    /// Log the error using tracing.
    pub fn log(&self) {
        match self.category() {
            ErrorCategory::UserError => tracing::warn!("User error: {}", self),
            ErrorCategory::NotFound => tracing::warn!("Not found: {}", self),
            ErrorCategory::Configuration => tracing::error!("Configuration error: {}", self),
            ErrorCategory::Internal => tracing::error!("Internal error: {}", self),
        }

        if let Some(source) = self.source() {
            tracing::debug!("Caused by: {}", source);
        }
    }
}

/// Error categories for classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// User input error, including a declined confirmation.
    UserError,
    NotFound,
    Configuration,
    /// Internal/system error.
    Internal,
}

// ── IntoCli trait ─────────────────────────────────────────────────────────────

/// Converts foreign error types into [`CliError`] at call-sites with a
/// descriptive context message.
///
/// No blanket impl: it would overlap with the concrete ones.
pub trait IntoCli<T> {
    /// Convert to `CliResult` attaching a human-readable context message.
    fn with_cli_context<F, S>(self, f: F) -> CliResult<T>
    where
        F: FnOnce() -> S,
        S: Into<String>;
}

impl<T> IntoCli<T> for Result<T, std::io::Error> {
    fn with_cli_context<F, S>(self, f: F) -> CliResult<T>
    where
        F: FnOnce() -> S,
        S: Into<String>,
    {
        self.map_err(|e| CliError::IoError {
            message: f().into(),
            source: e,
        })
    }
}

impl<T> IntoCli<T> for Result<T, McflowError> {
    /// Core errors already carry their own context; the message is dropped.
    fn with_cli_context<F, S>(self, _f: F) -> CliResult<T>
    where
        F: FnOnce() -> S,
        S: Into<String>,
    {
        self.map_err(CliError::Core)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mcflow_core::{application::ApplicationError, domain::DomainError};
    use std::io;

    #[test]
    fn missing_upstream_is_not_found() {
        let err = CliError::Core(
            ApplicationError::UpstreamNotFound {
                path: PathBuf::from("/nowhere"),
            }
            .into(),
        );
        assert_eq!(err.exit_code(), 3);
        assert!(err.suggestions().iter().any(|s| s.contains("--upstream")));
    }

    #[test]
    fn bad_rule_table_is_a_config_error() {
        let err = CliError::Core(
            DomainError::MissingMigrateTarget {
                files: vec!["a.md".into()],
            }
            .into(),
        );
        assert_eq!(err.exit_code(), 4);
    }

    #[test]
    fn cancellation_is_a_user_error() {
        let err = CliError::Cancelled { stage: Some("v18") };
        assert_eq!(err.exit_code(), 2);
        assert_eq!(err.to_string(), "Operation cancelled at migration v18");
        assert_eq!(CliError::Cancelled { stage: None }.to_string(), "Operation cancelled");
    }

    #[test]
    fn failed_migration_suggests_rerun() {
        let err = CliError::Core(
            ApplicationError::MigrationFailed {
                unit: "v21".into(),
                reason: "bad json".into(),
            }
            .into(),
        );
        assert_eq!(err.exit_code(), 1);
        assert!(err.suggestions().iter().any(|s| s.contains("safe to run")));
    }

    #[test]
    fn exit_code_internal() {
        assert_eq!(
            CliError::IoError {
                message: "x".into(),
                source: io::Error::other("e"),
            }
            .exit_code(),
            1
        );
    }

    #[test]
    fn format_plain_contains_error_header() {
        let err = CliError::ProjectNotFound {
            path: PathBuf::from("/tmp/x"),
        };
        let s = err.format_plain(false);
        assert!(s.contains("Error:"));
        assert!(s.contains("Suggestions:"));
        assert!(s.contains("--verbose"));
    }

    #[test]
    fn format_plain_verbose_shows_cause() {
        let err = CliError::IoError {
            message: "writing config".into(),
            source: io::Error::other("disk full"),
        };
        let s = err.format_plain(true);
        assert!(s.contains("Caused by: disk full"));
        assert!(!s.contains("--verbose"));
    }

    #[test]
    fn into_cli_io_error() {
        let result: Result<(), io::Error> = Err(io::Error::new(io::ErrorKind::NotFound, "missing"));
        let cli: CliResult<()> = result.with_cli_context(|| "reading config");
        assert!(matches!(cli, Err(CliError::IoError { ref message, .. }) if message == "reading config"));
    }
}
