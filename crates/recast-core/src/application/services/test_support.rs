//! Test doubles for service tests.

use std::{
    collections::{BTreeMap, BTreeSet},
    path::{Path, PathBuf},
    sync::{Arc, Mutex},
};

use crate::{
    application::{
        ApplicationError,
        ports::{Filesystem, TemplateLoader, TemplateRenderer},
    },
    domain::{Condition, RenderContext, Template},
    error::RecastResult,
};

// ── filesystem ───────────────────────────────────────────────────────────────

#[derive(Debug, Default)]
struct FsState {
    files: BTreeMap<PathBuf, Vec<u8>>,
    dirs: BTreeSet<PathBuf>,
    executables: BTreeSet<PathBuf>,
}

/// Map-backed filesystem; clones share state.
#[derive(Debug, Clone, Default)]
pub struct FakeFs {
    state: Arc<Mutex<FsState>>,
}

impl FakeFs {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn put(&self, path: impl AsRef<Path>, content: &str) {
        let path = path.as_ref();
        let mut s = self.state.lock().unwrap();
        for ancestor in path.ancestors().skip(1) {
            s.dirs.insert(ancestor.to_path_buf());
        }
        s.files.insert(path.to_path_buf(), content.as_bytes().to_vec());
    }

    pub fn text(&self, path: impl AsRef<Path>) -> Option<String> {
        let s = self.state.lock().unwrap();
        s.files
            .get(path.as_ref())
            .map(|b| String::from_utf8_lossy(b).into_owned())
    }

    pub fn has_dir(&self, path: impl AsRef<Path>) -> bool {
        self.state.lock().unwrap().dirs.contains(path.as_ref())
    }

    pub fn is_executable(&self, path: impl AsRef<Path>) -> bool {
        self.state.lock().unwrap().executables.contains(path.as_ref())
    }

    /// Every file under `root`, relative, with content.
    pub fn snapshot(&self, root: &Path) -> BTreeMap<String, Vec<u8>> {
        let s = self.state.lock().unwrap();
        s.files
            .iter()
            .filter_map(|(p, c)| {
                p.strip_prefix(root)
                    .ok()
                    .map(|rel| (rel.to_string_lossy().replace('\\', "/"), c.clone()))
            })
            .collect()
    }
}

impl Filesystem for FakeFs {
    fn create_dir_all(&self, path: &Path) -> RecastResult<()> {
        let mut s = self.state.lock().unwrap();
        for ancestor in path.ancestors() {
            s.dirs.insert(ancestor.to_path_buf());
        }
        Ok(())
    }

    fn write_file(&self, path: &Path, content: &[u8]) -> RecastResult<()> {
        let mut s = self.state.lock().unwrap();
        let parent_ok = path.parent().is_none_or(|p| s.dirs.contains(p));
        if !parent_ok {
            return Err(ApplicationError::FilesystemError {
                path: path.to_path_buf(),
                reason: "parent directory does not exist".into(),
            }
            .into());
        }
        s.files.insert(path.to_path_buf(), content.to_vec());
        Ok(())
    }

    fn read_file(&self, path: &Path) -> RecastResult<Option<Vec<u8>>> {
        Ok(self.state.lock().unwrap().files.get(path).cloned())
    }

    fn set_permissions(&self, path: &Path, executable: bool) -> RecastResult<()> {
        let mut s = self.state.lock().unwrap();
        if executable {
            s.executables.insert(path.to_path_buf());
        } else {
            s.executables.remove(path);
        }
        Ok(())
    }

    fn exists(&self, path: &Path) -> bool {
        let s = self.state.lock().unwrap();
        s.files.contains_key(path) || s.dirs.contains(path)
    }

    fn is_dir(&self, path: &Path) -> bool {
        self.state.lock().unwrap().dirs.contains(path)
    }

    fn remove_file(&self, path: &Path) -> RecastResult<()> {
        self.state.lock().unwrap().files.remove(path);
        Ok(())
    }

    fn remove_dir_all(&self, path: &Path) -> RecastResult<()> {
        let mut s = self.state.lock().unwrap();
        s.files.retain(|p, _| !p.starts_with(path));
        s.dirs.retain(|p| !p.starts_with(path));
        Ok(())
    }

    fn remove_dir_if_empty(&self, path: &Path) -> RecastResult<bool> {
        let mut s = self.state.lock().unwrap();
        let occupied = s.files.keys().any(|p| p.parent() == Some(path))
            || s.dirs.iter().any(|d| d.parent() == Some(path));
        if occupied || !s.dirs.contains(path) {
            return Ok(false);
        }
        s.dirs.remove(path);
        Ok(true)
    }
}

// ── loader ───────────────────────────────────────────────────────────────────

/// Serves whatever template is currently installed, for any source path.
#[derive(Clone)]
pub struct SwapLoader {
    current: Arc<Mutex<Template>>,
}

impl SwapLoader {
    pub fn new(template: Template) -> Self {
        Self {
            current: Arc::new(Mutex::new(template)),
        }
    }

    pub fn replace(&self, template: Template) {
        *self.current.lock().unwrap() = template;
    }
}

impl TemplateLoader for SwapLoader {
    fn load(&self, _source: &Path) -> RecastResult<Template> {
        Ok(self.current.lock().unwrap().clone())
    }
}

// ── renderer ─────────────────────────────────────────────────────────────────

/// `{{name}}` substitution. Conditions are a variable name, optionally
/// prefixed with `!`. Unknown placeholders are a render error.
pub struct SubstRenderer;

impl TemplateRenderer for SubstRenderer {
    fn render_str(&self, name: &str, template: &str, ctx: &RenderContext) -> RecastResult<String> {
        let mut result = template.to_string();
        for (key, value) in ctx.iter() {
            result = result.replace(&format!("{{{{{key}}}}}"), &value.to_string());
        }
        if result.contains("{{") {
            return Err(ApplicationError::RenderingFailed {
                item: name.to_string(),
                reason: "unknown placeholder".into(),
            }
            .into());
        }
        Ok(result)
    }

    fn evaluate(&self, condition: &Condition, ctx: &RenderContext) -> RecastResult<bool> {
        let (negate, var) = match condition.expr().strip_prefix('!') {
            Some(rest) => (true, rest),
            None => (false, condition.expr()),
        };
        let truthy = ctx.get(var).is_some_and(|v| v.is_truthy());
        Ok(truthy != negate)
    }
}
