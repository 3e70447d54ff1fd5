//! Local filesystem adapter using std::fs.

use std::io;
use std::path::Path;

use recast_core::{
    application::{ApplicationError, ports::Filesystem},
    error::{RecastError, RecastResult},
};

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
    fn create_dir_all(&self, path: &Path) -> RecastResult<()> {
        std::fs::create_dir_all(path).map_err(|e| map_io_error(path, e, "create directory"))
    }

    fn write_file(&self, path: &Path, content: &[u8]) -> RecastResult<()> {
        std::fs::write(path, content).map_err(|e| map_io_error(path, e, "write file"))
    }

    fn read_file(&self, path: &Path) -> RecastResult<Option<Vec<u8>>> {
        if path.is_dir() {
            return Ok(None);
        }
        match std::fs::read(path) {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(map_io_error(path, e, "read file")),
        }
    }

    fn set_permissions(&self, path: &Path, executable: bool) -> RecastResult<()> {
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let metadata =
                std::fs::metadata(path).map_err(|e| map_io_error(path, e, "get metadata"))?;
            let mut perms = metadata.permissions();
            let mode = perms.mode();
            let wanted = if executable {
                mode | 0o111
            } else {
                mode & !0o111
            };
            if wanted != mode {
                perms.set_mode(wanted);
                std::fs::set_permissions(path, perms)
                    .map_err(|e| map_io_error(path, e, "set permissions"))?;
            }
        }
        #[cfg(not(unix))]
        {
            // No executable bit to carry.
            let _ = (path, executable);
        }
        Ok(())
    }

    fn exists(&self, path: &Path) -> bool {
        path.exists()
    }

    fn is_dir(&self, path: &Path) -> bool {
        path.is_dir()
    }

    fn remove_file(&self, path: &Path) -> RecastResult<()> {
        match std::fs::remove_file(path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(map_io_error(path, e, "remove file")),
        }
    }

    fn remove_dir_all(&self, path: &Path) -> RecastResult<()> {
        std::fs::remove_dir_all(path).map_err(|e| map_io_error(path, e, "remove directory"))
    }

    fn remove_dir_if_empty(&self, path: &Path) -> RecastResult<bool> {
        let mut entries =
            std::fs::read_dir(path).map_err(|e| map_io_error(path, e, "read directory"))?;
        if entries.next().is_some() {
            return Ok(false);
        }
        std::fs::remove_dir(path).map_err(|e| map_io_error(path, e, "remove directory"))?;
        Ok(true)
    }
}

fn map_io_error(path: &Path, e: io::Error, operation: &str) -> RecastError {
    ApplicationError::FilesystemError {
        path: path.to_path_buf(),
        reason: format!("Failed to {operation}: {e}"),
    }
    .into()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn read_missing_file_is_none() {
        let temp = TempDir::new().unwrap();
        let fs = LocalFilesystem::new();
        assert_eq!(fs.read_file(&temp.path().join("nope")).unwrap(), None);
        assert_eq!(fs.read_file(temp.path()).unwrap(), None);
    }

    #[test]
    fn write_then_read_bytes() {
        let temp = TempDir::new().unwrap();
        let fs = LocalFilesystem::new();
        let path = temp.path().join("data.bin");

        fs.write_file(&path, &[0, 159, 146, 150]).unwrap();
        assert_eq!(fs.read_file(&path).unwrap(), Some(vec![0, 159, 146, 150]));
    }

    #[test]
    fn remove_dir_if_empty_only_removes_empty() {
        let temp = TempDir::new().unwrap();
        let fs = LocalFilesystem::new();
        let full = temp.path().join("full");
        let empty = temp.path().join("empty");
        fs.create_dir_all(&full).unwrap();
        fs.create_dir_all(&empty).unwrap();
        fs.write_file(&full.join("x"), b"x").unwrap();

        assert!(!fs.remove_dir_if_empty(&full).unwrap());
        assert!(fs.remove_dir_if_empty(&empty).unwrap());
        assert!(!empty.exists());
    }

    #[test]
    fn removing_missing_file_is_ok() {
        let temp = TempDir::new().unwrap();
        assert!(LocalFilesystem::new()
            .remove_file(&temp.path().join("gone"))
            .is_ok());
    }

    #[cfg(unix)]
    #[test]
    fn executable_bit_round_trip() {
        use std::os::unix::fs::PermissionsExt;

        let temp = TempDir::new().unwrap();
        let fs = LocalFilesystem::new();
        let path = temp.path().join("run.sh");
        fs.write_file(&path, b"#!/bin/sh\n").unwrap();

        fs.set_permissions(&path, true).unwrap();
        let mode = std::fs::metadata(&path).unwrap().permissions().mode();
        assert_ne!(mode & 0o111, 0);

        fs.set_permissions(&path, false).unwrap();
        let mode = std::fs::metadata(&path).unwrap().permissions().mode();
        assert_eq!(mode & 0o111, 0);
    }
}
