//! Per-project exclusive lock.
//!
//! The lock is a sibling file `.<dirname>.recast-lock` in the parent of the
//! project directory, created with create-new semantics and removed on drop.
//! It lives outside the project so rollback and tree snapshots never see it.

use std::{
    fs::{self, OpenOptions},
    io::{self, Write},
    path::{Path, PathBuf},
};

use recast_core::{application::ApplicationError, error::RecastResult};
use tracing::{debug, warn};

const LOCK_SUFFIX: &str = ".recast-lock";

/// Held for the duration of one generate or update.
#[derive(Debug)]
pub struct ProjectLock {
    path: PathBuf,
}

impl ProjectLock {
    /// Take the lock for `project`. A lock already held is a
    /// `DestinationConflict`.
    pub fn acquire(project: &Path) -> RecastResult<Self> {
        let path = lock_path(project)?;

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| ApplicationError::FilesystemError {
                path: parent.to_path_buf(),
                reason: format!("Failed to create directory: {e}"),
            })?;
        }

        let mut file = match OpenOptions::new().write(true).create_new(true).open(&path) {
            Ok(file) => file,
            Err(e) if e.kind() == io::ErrorKind::AlreadyExists => {
                return Err(ApplicationError::DestinationConflict {
                    path: project.to_path_buf(),
                    reason: format!(
                        "another recast run holds {}; remove it if no run is active",
                        path.display()
                    ),
                }
                .into());
            }
            Err(e) => {
                return Err(ApplicationError::FilesystemError {
                    path,
                    reason: format!("Failed to create lock: {e}"),
                }
                .into());
            }
        };

        // The pid is informational only.
        let _ = writeln!(file, "{}", std::process::id());
        debug!(lock = %path.display(), "Lock acquired");
        Ok(Self { path })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for ProjectLock {
    fn drop(&mut self) {
        if let Err(e) = fs::remove_file(&self.path) {
            warn!(lock = %self.path.display(), error = %e, "Failed to release lock");
        }
    }
}

fn lock_path(project: &Path) -> RecastResult<PathBuf> {
    let absolute = if project.exists() {
        project.canonicalize()
    } else {
        std::path::absolute(project)
    }
    .map_err(|e| ApplicationError::FilesystemError {
        path: project.to_path_buf(),
        reason: format!("Failed to resolve path: {e}"),
    })?;

    let (Some(parent), Some(name)) = (absolute.parent(), absolute.file_name()) else {
        return Err(ApplicationError::DestinationConflict {
            path: project.to_path_buf(),
            reason: "cannot lock a filesystem root".into(),
        }
        .into());
    };

    Ok(parent.join(format!(".{}{LOCK_SUFFIX}", name.to_string_lossy())))
}

#[cfg(test)]
mod tests {
    use super::*;
    use recast_core::error::ErrorKind;
    use tempfile::TempDir;

    #[test]
    fn lock_is_exclusive_and_released_on_drop() {
        let temp = TempDir::new().unwrap();
        let project = temp.path().join("proj");

        let lock = ProjectLock::acquire(&project).unwrap();
        assert!(lock.path().exists());
        assert_eq!(
            lock.path().file_name().unwrap().to_string_lossy(),
            ".proj.recast-lock"
        );

        let err = ProjectLock::acquire(&project).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::DestinationConflict);

        let path = lock.path().to_path_buf();
        drop(lock);
        assert!(!path.exists());
        assert!(ProjectLock::acquire(&project).is_ok());
    }

    #[test]
    fn lock_stays_outside_project() {
        let temp = TempDir::new().unwrap();
        let project = temp.path().join("proj");
        fs::create_dir(&project).unwrap();

        let _lock = ProjectLock::acquire(&project).unwrap();
        assert_eq!(fs::read_dir(&project).unwrap().count(), 0);
    }
}
