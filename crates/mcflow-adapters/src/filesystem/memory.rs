//! In-memory filesystem adapter for testing.

use std::{
    collections::{BTreeMap, BTreeSet},
    path::{Path, PathBuf},
    sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard},
};

use mcflow_core::{
    application::{ApplicationError, ports::Filesystem},
    error::McflowResult,
};

/// In-memory filesystem for testing.
///
/// Clones share the same tree, so a test can keep a handle after boxing one
/// into a `WorkflowContext`.
#[derive(Debug, Clone, Default)]
pub struct MemoryFilesystem {
    inner: Arc<RwLock<MemoryFilesystemInner>>,
}

#[derive(Debug, Default)]
struct MemoryFilesystemInner {
    files: BTreeMap<PathBuf, Vec<u8>>,
    directories: BTreeSet<PathBuf>,
}

impl MemoryFilesystemInner {
    fn add_dirs(&mut self, path: &Path) {
        let mut current = PathBuf::new();
        for component in path.components() {
            current.push(component);
            self.directories.insert(current.clone());
        }
    }

    fn parent_exists(&self, path: &Path) -> bool {
        match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => self.directories.contains(parent),
            _ => true,
        }
    }
}

impl MemoryFilesystem {
    /// Create a new empty memory filesystem.
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a file, creating its parent directories (testing helper).
    pub fn with_file(self, path: impl AsRef<Path>, content: impl AsRef<str>) -> Self {
        self.insert(path, content);
        self
    }

    /// Seed a file in place, creating its parent directories.
    pub fn insert(&self, path: impl AsRef<Path>, content: impl AsRef<str>) {
        let path = path.as_ref();
        if let Ok(mut inner) = self.inner.write() {
            if let Some(parent) = path.parent() {
                inner.add_dirs(parent);
            }
            inner
                .files
                .insert(path.to_path_buf(), content.as_ref().as_bytes().to_vec());
        }
    }

    /// Read a file's content (testing helper).
    pub fn read_file(&self, path: impl AsRef<Path>) -> Option<String> {
        let inner = self.inner.read().ok()?;
        let bytes = inner.files.get(path.as_ref())?;
        String::from_utf8(bytes.clone()).ok()
    }

    /// List all files, sorted.
    pub fn list_files(&self) -> Vec<PathBuf> {
        self.inner
            .read()
            .map(|inner| inner.files.keys().cloned().collect())
            .unwrap_or_default()
    }

    fn read_guard(&self) -> McflowResult<RwLockReadGuard<'_, MemoryFilesystemInner>> {
        self.inner
            .read()
            .map_err(|_| ApplicationError::LockPoisoned.into())
    }

    fn write_guard(&self) -> McflowResult<RwLockWriteGuard<'_, MemoryFilesystemInner>> {
        self.inner
            .write()
            .map_err(|_| ApplicationError::LockPoisoned.into())
    }
}

impl Filesystem for MemoryFilesystem {
    fn read(&self, path: &Path) -> McflowResult<Vec<u8>> {
        let inner = self.read_guard()?;
        inner
            .files
            .get(path)
            .cloned()
            .ok_or_else(|| ApplicationError::filesystem(path, "No such file").into())
    }

    fn write_file(&self, path: &Path, content: &str) -> McflowResult<()> {
        let mut inner = self.write_guard()?;
        if !inner.parent_exists(path) {
            return Err(ApplicationError::filesystem(path, "Parent directory does not exist").into());
        }
        if inner.directories.contains(path) {
            return Err(ApplicationError::filesystem(path, "Is a directory").into());
        }
        inner.files.insert(path.to_path_buf(), content.as_bytes().to_vec());
        Ok(())
    }

    fn exists(&self, path: &Path) -> bool {
        self.inner
            .read()
            .map(|inner| inner.files.contains_key(path) || inner.directories.contains(path))
            .unwrap_or(false)
    }

    fn is_dir(&self, path: &Path) -> bool {
        self.inner
            .read()
            .map(|inner| inner.directories.contains(path))
            .unwrap_or(false)
    }

    fn create_dir_all(&self, path: &Path) -> McflowResult<()> {
        let mut inner = self.write_guard()?;
        if inner.files.contains_key(path) {
            return Err(ApplicationError::filesystem(path, "A file exists at this path").into());
        }
        inner.add_dirs(path);
        Ok(())
    }

    fn remove(&self, path: &Path) -> McflowResult<()> {
        let mut inner = self.write_guard()?;
        if inner.files.remove(path).is_some() {
            return Ok(());
        }
        if !inner.directories.contains(path) {
            return Err(ApplicationError::filesystem(path, "No such file or directory").into());
        }
        inner.directories.retain(|p| !p.starts_with(path));
        inner.files.retain(|p, _| !p.starts_with(path));
        Ok(())
    }

    fn rename(&self, from: &Path, to: &Path) -> McflowResult<()> {
        let mut inner = self.write_guard()?;
        if !inner.parent_exists(to) {
            return Err(ApplicationError::filesystem(to, "Parent directory does not exist").into());
        }

        if let Some(bytes) = inner.files.remove(from) {
            inner.directories.retain(|p| !p.starts_with(to));
            inner.files.retain(|p, _| !p.starts_with(to));
            inner.files.insert(to.to_path_buf(), bytes);
            return Ok(());
        }
        if !inner.directories.contains(from) {
            return Err(ApplicationError::filesystem(from, "No such file or directory").into());
        }

        inner.directories.retain(|p| !p.starts_with(to));
        inner.files.retain(|p, _| !p.starts_with(to));

        let moved_dirs: Vec<PathBuf> = inner
            .directories
            .iter()
            .filter(|p| p.starts_with(from))
            .cloned()
            .collect();
        for dir in moved_dirs {
            inner.directories.remove(&dir);
            if let Ok(rest) = dir.strip_prefix(from) {
                inner.directories.insert(to.join(rest));
            }
        }

        let moved_files: Vec<PathBuf> = inner
            .files
            .keys()
            .filter(|p| p.starts_with(from))
            .cloned()
            .collect();
        for file in moved_files {
            if let (Some(bytes), Ok(rest)) = (inner.files.remove(&file), file.strip_prefix(from)) {
                inner.files.insert(to.join(rest), bytes);
            }
        }
        Ok(())
    }

    fn copy_file(&self, from: &Path, to: &Path) -> McflowResult<()> {
        let mut inner = self.write_guard()?;
        let bytes = inner
            .files
            .get(from)
            .cloned()
            .ok_or_else(|| ApplicationError::filesystem(from, "No such file"))?;
        if !inner.parent_exists(to) {
            return Err(ApplicationError::filesystem(to, "Parent directory does not exist").into());
        }
        inner.files.insert(to.to_path_buf(), bytes);
        Ok(())
    }

    fn read_dir(&self, path: &Path) -> McflowResult<Vec<PathBuf>> {
        let inner = self.read_guard()?;
        if !inner.directories.contains(path) {
            return Err(ApplicationError::filesystem(path, "Not a directory").into());
        }
        let children: BTreeSet<PathBuf> = inner
            .directories
            .iter()
            .chain(inner.files.keys())
            .filter(|p| p.parent() == Some(path))
            .cloned()
            .collect();
        Ok(children.into_iter().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn write_requires_parent() {
        let fs = MemoryFilesystem::new();
        assert!(fs.write_file(Path::new("/p/a.md"), "x").is_err());
        fs.create_dir_all(Path::new("/p")).unwrap();
        fs.write_file(Path::new("/p/a.md"), "x").unwrap();
        assert_eq!(fs.read_file("/p/a.md").as_deref(), Some("x"));
    }

    #[test]
    fn rename_moves_directory_trees() {
        let fs = MemoryFilesystem::new()
            .with_file("/p/markdown/ai/a.md", "a")
            .with_file("/p/markdown/ai/deep/b.md", "b");
        fs.create_dir_all(Path::new("/p/backup")).unwrap();

        fs.rename(Path::new("/p/markdown/ai"), Path::new("/p/backup/ai"))
            .unwrap();

        assert!(!fs.exists(Path::new("/p/markdown/ai")));
        assert_eq!(fs.read_file("/p/backup/ai/deep/b.md").as_deref(), Some("b"));
        assert!(fs.is_dir(Path::new("/p/backup/ai/deep")));
    }

    #[test]
    fn remove_directory_drops_descendants() {
        let fs = MemoryFilesystem::new().with_file("/p/x/y/z.txt", "1");
        fs.remove(Path::new("/p/x")).unwrap();
        assert!(fs.list_files().is_empty());
        assert!(fs.is_dir(Path::new("/p")));
    }

    #[test]
    fn read_dir_lists_direct_children_once() {
        let fs = MemoryFilesystem::new()
            .with_file("/p/b.md", "")
            .with_file("/p/a.md", "")
            .with_file("/p/sub/c.md", "");
        let children = fs.read_dir(Path::new("/p")).unwrap();
        assert_eq!(
            children,
            vec![
                PathBuf::from("/p/a.md"),
                PathBuf::from("/p/b.md"),
                PathBuf::from("/p/sub"),
            ]
        );
    }

    #[test]
    fn clones_share_state() {
        let fs = MemoryFilesystem::new();
        let handle = fs.clone();
        fs.insert("/p/f.txt", "shared");
        assert_eq!(handle.read_file("/p/f.txt").as_deref(), Some("shared"));
    }
}
