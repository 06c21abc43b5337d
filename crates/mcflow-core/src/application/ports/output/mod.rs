//! Driven (output) ports - implemented by infrastructure.
//!
//! These traits define what the application needs from external systems.
//! The `mcflow-adapters` crate provides implementations.

use std::path::{Path, PathBuf};

use crate::application::ApplicationError;
use crate::domain::RenderContext;
use crate::error::McflowResult;

/// Port for filesystem operations.
///
/// Implemented by:
/// - `mcflow_adapters::filesystem::LocalFilesystem` (production)
/// - `mcflow_adapters::filesystem::MemoryFilesystem` (testing)
///
/// Paths are absolute: services join project- and upstream-relative paths
/// onto their roots before calling in.
pub trait Filesystem: Send + Sync {
    /// Read raw bytes.
    fn read(&self, path: &Path) -> McflowResult<Vec<u8>>;

    /// Write content to a file. The parent directory must exist.
    fn write_file(&self, path: &Path, content: &str) -> McflowResult<()>;

    /// Check if path exists (file or directory).
    fn exists(&self, path: &Path) -> bool;

    fn is_dir(&self, path: &Path) -> bool;

    /// Create a directory and all parent directories.
    fn create_dir_all(&self, path: &Path) -> McflowResult<()>;

    /// Remove a file, or a directory with all its contents.
    fn remove(&self, path: &Path) -> McflowResult<()>;

    /// Move a file or directory, replacing whatever is at `to`.
    fn rename(&self, from: &Path, to: &Path) -> McflowResult<()>;

    /// Copy one file, replacing `to`. The parent directory must exist.
    fn copy_file(&self, from: &Path, to: &Path) -> McflowResult<()>;

    /// Direct children of a directory, sorted by path.
    fn read_dir(&self, path: &Path) -> McflowResult<Vec<PathBuf>>;

    /// Read a UTF-8 text file.
    fn read_to_string(&self, path: &Path) -> McflowResult<String> {
        let bytes = self.read(path)?;
        String::from_utf8(bytes).map_err(|e| ApplicationError::filesystem(path, e).into())
    }

    /// Write a file, creating missing parent directories first.
    fn write_file_all(&self, path: &Path, content: &str) -> McflowResult<()> {
        if let Some(parent) = path.parent() {
            self.create_dir_all(parent)?;
        }
        self.write_file(path, content)
    }

    /// Recursively copy a directory tree, merging into `to`.
    fn copy_dir_all(&self, from: &Path, to: &Path) -> McflowResult<()> {
        self.create_dir_all(to)?;
        for entry in self.read_dir(from)? {
            let Some(name) = entry.file_name() else {
                continue;
            };
            let target = to.join(name);
            if self.is_dir(&entry) {
                self.copy_dir_all(&entry, &target)?;
            } else {
                self.copy_file(&entry, &target)?;
            }
        }
        Ok(())
    }

    /// Copy a file or directory, creating missing parents of `to`.
    fn copy_all(&self, from: &Path, to: &Path) -> McflowResult<()> {
        if self.is_dir(from) {
            return self.copy_dir_all(from, to);
        }
        if let Some(parent) = to.parent() {
            self.create_dir_all(parent)?;
        }
        self.copy_file(from, to)
    }
}

/// Port for user confirmation.
///
/// The engine never talks to a terminal; the CLI injects an interactive
/// implementation, tests inject scripted ones.
#[cfg_attr(test, mockall::automock)]
pub trait Prompt {
    /// Yes/no question.
    fn confirm(&self, message: &str, default: bool) -> McflowResult<bool>;

    /// Pick one of `options`; returns its index.
    fn select(&self, message: &str, options: &[String], default: usize) -> McflowResult<usize>;
}

/// Prompt that accepts every default without asking.
#[derive(Debug, Clone, Copy, Default)]
pub struct AutoConfirm;

impl Prompt for AutoConfirm {
    fn confirm(&self, _message: &str, _default: bool) -> McflowResult<bool> {
        Ok(true)
    }

    fn select(&self, _message: &str, _options: &[String], default: usize) -> McflowResult<usize> {
        Ok(default)
    }
}

/// Port for template rendering.
///
/// Implemented by:
/// - `mcflow_adapters::renderer::SimpleRenderer` (variable substitution)
pub trait TemplateRenderer: Send + Sync {
    /// Render one template text with the given variables.
    fn render(&self, template: &str, context: &RenderContext) -> McflowResult<String>;
}
