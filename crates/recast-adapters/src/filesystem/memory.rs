//! In-memory filesystem adapter for testing and pretend runs.

use std::{
    collections::{BTreeMap, BTreeSet},
    path::{Path, PathBuf},
    sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard},
};

use recast_core::{
    application::{ApplicationError, ports::Filesystem},
    error::{RecastError, RecastResult},
};

/// In-memory filesystem. Clones share the same tree.
#[derive(Debug, Clone, Default)]
pub struct MemoryFilesystem {
    inner: Arc<RwLock<MemoryFilesystemInner>>,
}

#[derive(Debug, Default)]
struct MemoryFilesystemInner {
    files: BTreeMap<PathBuf, Vec<u8>>,
    directories: BTreeSet<PathBuf>,
    executables: BTreeSet<PathBuf>,
}

impl MemoryFilesystem {
    /// Create a new empty memory filesystem.
    pub fn new() -> Self {
        Self::default()
    }

    /// A file's content as text (testing helper).
    pub fn contents(&self, path: &Path) -> Option<String> {
        let inner = self.inner.read().ok()?;
        inner
            .files
            .get(path)
            .map(|b| String::from_utf8_lossy(b).into_owned())
    }

    /// Check if a file is marked executable.
    pub fn is_executable(&self, path: &Path) -> bool {
        self.inner
            .read()
            .is_ok_and(|inner| inner.executables.contains(path))
    }

    /// All files, sorted.
    pub fn list_files(&self) -> Vec<PathBuf> {
        self.inner
            .read()
            .map(|inner| inner.files.keys().cloned().collect())
            .unwrap_or_default()
    }

    fn read(&self) -> RecastResult<RwLockReadGuard<'_, MemoryFilesystemInner>> {
        self.inner.read().map_err(|_| poisoned())
    }

    fn write(&self) -> RecastResult<RwLockWriteGuard<'_, MemoryFilesystemInner>> {
        self.inner.write().map_err(|_| poisoned())
    }
}

fn poisoned() -> RecastError {
    RecastError::Internal {
        message: "memory filesystem lock poisoned".into(),
    }
}

impl Filesystem for MemoryFilesystem {
    fn create_dir_all(&self, path: &Path) -> RecastResult<()> {
        let mut inner = self.write()?;

        let mut current = PathBuf::new();
        for component in path.components() {
            current.push(component);
            inner.directories.insert(current.clone());
        }

        Ok(())
    }

    fn write_file(&self, path: &Path, content: &[u8]) -> RecastResult<()> {
        let mut inner = self.write()?;

        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() && !inner.directories.contains(parent) {
                return Err(ApplicationError::FilesystemError {
                    path: path.to_path_buf(),
                    reason: "Parent directory does not exist".into(),
                }
                .into());
            }
        }

        inner.files.insert(path.to_path_buf(), content.to_vec());
        Ok(())
    }

    fn read_file(&self, path: &Path) -> RecastResult<Option<Vec<u8>>> {
        Ok(self.read()?.files.get(path).cloned())
    }

    fn set_permissions(&self, path: &Path, executable: bool) -> RecastResult<()> {
        let mut inner = self.write()?;

        if executable {
            inner.executables.insert(path.to_path_buf());
        } else {
            inner.executables.remove(path);
        }

        Ok(())
    }

    fn exists(&self, path: &Path) -> bool {
        self.inner
            .read()
            .is_ok_and(|inner| inner.files.contains_key(path) || inner.directories.contains(path))
    }

    fn is_dir(&self, path: &Path) -> bool {
        self.inner
            .read()
            .is_ok_and(|inner| inner.directories.contains(path))
    }

    fn remove_file(&self, path: &Path) -> RecastResult<()> {
        let mut inner = self.write()?;
        inner.files.remove(path);
        inner.executables.remove(path);
        Ok(())
    }

    fn remove_dir_all(&self, path: &Path) -> RecastResult<()> {
        let mut inner = self.write()?;

        inner.directories.retain(|p| !p.starts_with(path));
        inner.files.retain(|p, _| !p.starts_with(path));
        inner.executables.retain(|p| !p.starts_with(path));

        Ok(())
    }

    fn remove_dir_if_empty(&self, path: &Path) -> RecastResult<bool> {
        let mut inner = self.write()?;

        let occupied = inner.files.keys().any(|p| p.parent() == Some(path))
            || inner.directories.iter().any(|d| d.parent() == Some(path));
        if occupied || !inner.directories.contains(path) {
            return Ok(false);
        }

        inner.directories.remove(path);
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn write_requires_parent() {
        let fs = MemoryFilesystem::new();
        assert!(fs.write_file(Path::new("/a/b.txt"), b"x").is_err());

        fs.create_dir_all(Path::new("/a")).unwrap();
        fs.write_file(Path::new("/a/b.txt"), b"x").unwrap();
        assert_eq!(fs.contents(Path::new("/a/b.txt")).as_deref(), Some("x"));
    }

    #[test]
    fn prune_only_empty_directories() {
        let fs = MemoryFilesystem::new();
        fs.create_dir_all(Path::new("/p/docs/api")).unwrap();
        fs.write_file(Path::new("/p/docs/api/index.md"), b"x").unwrap();

        assert!(!fs.remove_dir_if_empty(Path::new("/p/docs/api")).unwrap());
        fs.remove_file(Path::new("/p/docs/api/index.md")).unwrap();
        assert!(fs.remove_dir_if_empty(Path::new("/p/docs/api")).unwrap());
        assert!(fs.remove_dir_if_empty(Path::new("/p/docs")).unwrap());
        assert!(!fs.is_dir(Path::new("/p/docs")));
    }

    #[test]
    fn remove_dir_all_drops_subtree() {
        let fs = MemoryFilesystem::new();
        fs.create_dir_all(Path::new("/p/src")).unwrap();
        fs.write_file(Path::new("/p/src/main.py"), b"").unwrap();
        fs.set_permissions(Path::new("/p/src/main.py"), true).unwrap();

        fs.remove_dir_all(Path::new("/p")).unwrap();
        assert!(!fs.exists(Path::new("/p")));
        assert!(fs.list_files().is_empty());
        assert!(!fs.is_executable(Path::new("/p/src/main.py")));
    }
}
