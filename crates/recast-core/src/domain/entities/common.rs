use super::DomainError;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::path::{Component, Path, PathBuf};

/// A project-relative path, normalized to `/`-separated segments.
///
/// Invariant: never absolute, never contains `.`/`..` or empty segments.
/// The string form is what provenance records key files by, so it must be
/// identical on every platform.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RelativePath(String);

impl RelativePath {
    /// Fallible constructor from a `/`-separated string.
    pub fn try_new(path: impl AsRef<str>) -> Result<Self, DomainError> {
        let raw = path.as_ref();
        if raw.starts_with('/') || Path::new(raw).is_absolute() {
            return Err(DomainError::AbsolutePathNotAllowed { path: raw.into() });
        }

        let mut segments = Vec::new();
        for segment in raw.split(['/', '\\']) {
            match segment {
                "" | "." => continue,
                ".." => return Err(DomainError::PathEscapesRoot { path: raw.into() }),
                s => segments.push(s),
            }
        }

        if segments.is_empty() {
            return Err(DomainError::InvalidTemplate(format!(
                "empty path: '{raw}'"
            )));
        }

        Ok(Self(segments.join("/")))
    }

    /// Build from a filesystem path relative to some root.
    pub fn from_path(path: &Path) -> Result<Self, DomainError> {
        let mut segments = Vec::new();
        for component in path.components() {
            match component {
                Component::Normal(s) => segments.push(s.to_string_lossy().into_owned()),
                Component::CurDir => {}
                Component::ParentDir => {
                    return Err(DomainError::PathEscapesRoot {
                        path: path.display().to_string(),
                    });
                }
                Component::RootDir | Component::Prefix(_) => {
                    return Err(DomainError::AbsolutePathNotAllowed {
                        path: path.display().to_string(),
                    });
                }
            }
        }
        Self::try_new(segments.join("/"))
    }

    /// Join a segment, maintaining the relative invariant.
    pub fn join(&self, segment: &str) -> Result<Self, DomainError> {
        Self::try_new(format!("{}/{segment}", self.0))
    }

    pub fn segments(&self) -> impl Iterator<Item = &str> {
        self.0.split('/')
    }

    /// Parent directory, `None` at the root level.
    pub fn parent(&self) -> Option<Self> {
        self.0
            .rsplit_once('/')
            .map(|(parent, _)| Self(parent.to_string()))
    }

    /// File name (last segment).
    pub fn file_name(&self) -> &str {
        self.0.rsplit('/').next().unwrap_or(&self.0)
    }

    /// Whether `self` equals `prefix` or lies beneath it.
    pub fn starts_with(&self, prefix: &RelativePath) -> bool {
        self.0 == prefix.0
            || (self.0.starts_with(&prefix.0) && self.0[prefix.0.len()..].starts_with('/'))
    }

    /// Sibling path with `suffix` appended to the file name (`a/b.txt` → `a/b.txt.rej`).
    pub fn with_suffix(&self, suffix: &str) -> Self {
        Self(format!("{}{suffix}", self.0))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Absolute location of this path under `root`.
    pub fn under(&self, root: &Path) -> PathBuf {
        self.segments().fold(root.to_path_buf(), |acc, s| acc.join(s))
    }
}

impl fmt::Display for RelativePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl Serialize for RelativePath {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for RelativePath {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Self::try_new(&s).map_err(serde::de::Error::custom)
    }
}

/// Capability-based permissions model.
///
/// Only the executable bit survives the trip through a template; everything
/// else follows the user's umask.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Permissions {
    executable: bool,
}

impl Permissions {
    pub const fn read_write() -> Self {
        Self { executable: false }
    }

    pub const fn executable() -> Self {
        Self { executable: true }
    }

    pub const fn is_executable(&self) -> bool {
        self.executable
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalizes_separators_and_dots() {
        let p = RelativePath::try_new("./src\\pkg//mod.py").unwrap();
        assert_eq!(p.as_str(), "src/pkg/mod.py");
    }

    #[test]
    fn rejects_absolute_and_parent() {
        assert!(matches!(
            RelativePath::try_new("/etc/passwd"),
            Err(DomainError::AbsolutePathNotAllowed { .. })
        ));
        assert!(matches!(
            RelativePath::try_new("src/../../x"),
            Err(DomainError::PathEscapesRoot { .. })
        ));
        assert!(RelativePath::try_new("./").is_err());
    }

    #[test]
    fn starts_with_respects_segment_boundaries() {
        let docs = RelativePath::try_new("docs").unwrap();
        assert!(RelativePath::try_new("docs/index.md").unwrap().starts_with(&docs));
        assert!(docs.starts_with(&docs));
        assert!(!RelativePath::try_new("docsite/x").unwrap().starts_with(&docs));
    }

    #[test]
    fn parent_and_file_name() {
        let p = RelativePath::try_new("a/b/c.txt").unwrap();
        assert_eq!(p.file_name(), "c.txt");
        assert_eq!(p.parent().unwrap().as_str(), "a/b");
        assert!(RelativePath::try_new("top").unwrap().parent().is_none());
    }

    #[test]
    fn under_joins_segments() {
        let p = RelativePath::try_new("a/b").unwrap();
        assert_eq!(p.under(Path::new("/root")), Path::new("/root/a/b"));
    }
}
