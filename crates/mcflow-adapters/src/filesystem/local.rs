//! Local filesystem adapter using std::fs.

use std::io;
use std::path::{Path, PathBuf};

use mcflow_core::{
    application::{ApplicationError, ports::Filesystem},
    error::{McflowError, McflowResult},
};
use tracing::trace;

/// Production filesystem implementation using `std::fs`.
#[derive(Debug, Clone, Copy)]
pub struct LocalFilesystem;

impl LocalFilesystem {
    /// Create a new local filesystem adapter.
    pub fn new() -> Self {
        Self
    }
}

impl Default for LocalFilesystem {
    fn default() -> Self {
        Self::new()
    }
}

impl Filesystem for LocalFilesystem {
    fn read(&self, path: &Path) -> McflowResult<Vec<u8>> {
        std::fs::read(path).map_err(|e| map_io_error(path, e, "read file"))
    }

    fn write_file(&self, path: &Path, content: &str) -> McflowResult<()> {
        std::fs::write(path, content).map_err(|e| map_io_error(path, e, "write file"))
    }

    fn exists(&self, path: &Path) -> bool {
        path.exists()
    }

    fn is_dir(&self, path: &Path) -> bool {
        path.is_dir()
    }

    fn create_dir_all(&self, path: &Path) -> McflowResult<()> {
        std::fs::create_dir_all(path).map_err(|e| map_io_error(path, e, "create directory"))
    }

    fn remove(&self, path: &Path) -> McflowResult<()> {
        if path.is_dir() {
            std::fs::remove_dir_all(path).map_err(|e| map_io_error(path, e, "remove directory"))
        } else {
            std::fs::remove_file(path).map_err(|e| map_io_error(path, e, "remove file"))
        }
    }

    fn rename(&self, from: &Path, to: &Path) -> McflowResult<()> {
        if to.exists() {
            self.remove(to)?;
        }
        match std::fs::rename(from, to) {
            Ok(()) => Ok(()),
            Err(e) => {
                // Cross-device moves cannot rename.
                trace!(from = %from.display(), error = %e, "rename failed, copying instead");
                self.copy_all(from, to)?;
                self.remove(from)
            }
        }
    }

    fn copy_file(&self, from: &Path, to: &Path) -> McflowResult<()> {
        std::fs::copy(from, to)
            .map(|_| ())
            .map_err(|e| map_io_error(from, e, "copy file"))
    }

    fn read_dir(&self, path: &Path) -> McflowResult<Vec<PathBuf>> {
        let mut entries = walkdir::WalkDir::new(path)
            .min_depth(1)
            .max_depth(1)
            .into_iter()
            .map(|entry| {
                entry
                    .map(walkdir::DirEntry::into_path)
                    .map_err(|e| map_io_error(path, io::Error::other(e), "read directory"))
            })
            .collect::<McflowResult<Vec<_>>>()?;
        entries.sort();
        Ok(entries)
    }
}

fn map_io_error(path: &Path, e: io::Error, operation: &str) -> McflowError {
    ApplicationError::FilesystemError {
        path: path.to_path_buf(),
        reason: format!("Failed to {}: {}", operation, e),
    }
    .into()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn rename_replaces_existing_target() {
        let dir = TempDir::new().unwrap();
        let fs = LocalFilesystem::new();
        let from = dir.path().join("a.md");
        let to = dir.path().join("b.md");
        fs.write_file(&from, "new").unwrap();
        fs.write_file(&to, "old").unwrap();

        fs.rename(&from, &to).unwrap();

        assert!(!fs.exists(&from));
        assert_eq!(fs.read_to_string(&to).unwrap(), "new");
    }

    #[test]
    fn remove_handles_files_and_directories() {
        let dir = TempDir::new().unwrap();
        let fs = LocalFilesystem::new();
        let nested = dir.path().join("x/y");
        fs.create_dir_all(&nested).unwrap();
        fs.write_file(&nested.join("f.txt"), "1").unwrap();

        fs.remove(&dir.path().join("x")).unwrap();
        assert!(!fs.exists(&dir.path().join("x")));
    }

    #[test]
    fn read_dir_is_sorted_and_shallow() {
        let dir = TempDir::new().unwrap();
        let fs = LocalFilesystem::new();
        fs.write_file(&dir.path().join("b.md"), "").unwrap();
        fs.write_file(&dir.path().join("a.md"), "").unwrap();
        fs.create_dir_all(&dir.path().join("c/d")).unwrap();

        let names: Vec<_> = fs
            .read_dir(dir.path())
            .unwrap()
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, ["a.md", "b.md", "c"]);
    }

    #[test]
    fn copy_dir_all_merges_trees() {
        let dir = TempDir::new().unwrap();
        let fs = LocalFilesystem::new();
        let src = dir.path().join("src");
        fs.create_dir_all(&src.join("inner")).unwrap();
        fs.write_file(&src.join("inner/doc.md"), "hello").unwrap();

        let dst = dir.path().join("dst");
        fs.copy_dir_all(&src, &dst).unwrap();

        assert_eq!(fs.read_to_string(&dst.join("inner/doc.md")).unwrap(), "hello");
    }
}
