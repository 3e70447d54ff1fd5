use std::collections::{BTreeMap, BTreeSet};

use crate::domain::entities::common::{Permissions, RelativePath};
use crate::domain::error::DomainError;
use crate::domain::value_objects::ContentHash;

/// Fully rendered project tree, not yet written anywhere.
///
/// Output of rendering a template against a data context; input to the
/// generator's write step and to update reconciliation. Keyed by final
/// (rendered) path, so iteration order is stable.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RenderedTree {
    files: BTreeMap<RelativePath, RenderedFile>,
    directories: BTreeSet<RelativePath>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedFile {
    pub content: Vec<u8>,
    pub permissions: Permissions,
}

impl RenderedFile {
    pub fn hash(&self) -> ContentHash {
        ContentHash::of(&self.content)
    }
}

impl RenderedTree {
    pub fn new() -> Self {
        Self::default()
    }

    /// Two template files rendering to the same path is a template bug.
    pub fn add_file(
        &mut self,
        path: RelativePath,
        content: Vec<u8>,
        permissions: Permissions,
    ) -> Result<(), DomainError> {
        if self.files.contains_key(&path) || self.directories.contains(&path) {
            return Err(DomainError::DuplicatePath {
                path: path.to_string(),
            });
        }
        self.files.insert(
            path,
            RenderedFile {
                content,
                permissions,
            },
        );
        Ok(())
    }

    /// Record a directory that must exist even without files in it.
    pub fn add_directory(&mut self, path: RelativePath) -> Result<(), DomainError> {
        if self.files.contains_key(&path) {
            return Err(DomainError::DuplicatePath {
                path: path.to_string(),
            });
        }
        self.directories.insert(path);
        Ok(())
    }

    pub fn with_file(mut self, path: &str, content: &str) -> Result<Self, DomainError> {
        self.add_file(
            RelativePath::try_new(path)?,
            content.as_bytes().to_vec(),
            Permissions::read_write(),
        )?;
        Ok(self)
    }

    pub fn get(&self, path: &RelativePath) -> Option<&RenderedFile> {
        self.files.get(path)
    }

    pub fn contains(&self, path: &RelativePath) -> bool {
        self.files.contains_key(path)
    }

    pub fn files(&self) -> impl Iterator<Item = (&RelativePath, &RenderedFile)> {
        self.files.iter()
    }

    pub fn paths(&self) -> impl Iterator<Item = &RelativePath> {
        self.files.keys()
    }

    pub fn directories(&self) -> impl Iterator<Item = &RelativePath> {
        self.directories.iter()
    }

    pub fn file_count(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty() && self.directories.is_empty()
    }

    /// Baseline hashes for provenance.
    pub fn hashes(&self) -> BTreeMap<RelativePath, ContentHash> {
        self.files
            .iter()
            .map(|(path, file)| (path.clone(), file.hash()))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn iterates_in_path_order() {
        let tree = RenderedTree::new()
            .with_file("src/b.py", "")
            .and_then(|t| t.with_file("README.md", "# x"))
            .and_then(|t| t.with_file("src/a.py", ""))
            .unwrap();

        let paths: Vec<_> = tree.paths().map(RelativePath::as_str).collect();
        assert_eq!(paths, ["README.md", "src/a.py", "src/b.py"]);
    }

    #[test]
    fn rejects_duplicate_file() {
        let result = RenderedTree::new()
            .with_file("a.txt", "1")
            .and_then(|t| t.with_file("a.txt", "2"));
        assert!(matches!(result, Err(DomainError::DuplicatePath { .. })));
    }

    #[test]
    fn hashes_cover_every_file() {
        let tree = RenderedTree::new()
            .with_file("a.txt", "1")
            .and_then(|t| t.with_file("b.txt", "2"))
            .unwrap();
        let hashes = tree.hashes();
        assert_eq!(hashes.len(), 2);
        assert_eq!(
            hashes[&RelativePath::try_new("a.txt").unwrap()],
            ContentHash::of(b"1")
        );
    }
}
