//! Driven (output) ports - implemented by infrastructure.
//!
//! These traits define what the application needs from external systems.
//! The `recast-adapters` crate provides implementations; tests use the
//! generated mocks or the in-memory filesystem.

use std::path::Path;

use crate::domain::{Condition, DataValue, RenderContext, Template, VariableSpec};
use crate::error::RecastResult;

/// Port for filesystem operations.
///
/// Implemented by:
/// - `recast_adapters::filesystem::LocalFilesystem` (production)
/// - `recast_adapters::filesystem::MemoryFilesystem` (testing)
///
/// Paths are absolute (destination joined with a project-relative path).
/// Content is bytes: literal template files need not be UTF-8.
#[cfg_attr(test, mockall::automock)]
pub trait Filesystem: Send + Sync {
    /// Create a directory and all parent directories.
    fn create_dir_all(&self, path: &Path) -> RecastResult<()>;

    /// Write content to a file, replacing it if present.
    fn write_file(&self, path: &Path, content: &[u8]) -> RecastResult<()>;

    /// Read a file; `None` if it does not exist.
    fn read_file(&self, path: &Path) -> RecastResult<Option<Vec<u8>>>;

    /// Set the executable bit (no-op where unsupported).
    fn set_permissions(&self, path: &Path, executable: bool) -> RecastResult<()>;

    /// Check if path exists.
    fn exists(&self, path: &Path) -> bool;

    /// Check if path is a directory.
    fn is_dir(&self, path: &Path) -> bool;

    /// Remove a single file.
    fn remove_file(&self, path: &Path) -> RecastResult<()>;

    /// Remove a directory and all contents.
    fn remove_dir_all(&self, path: &Path) -> RecastResult<()>;

    /// Remove a directory only if it is empty. Returns whether it was removed.
    fn remove_dir_if_empty(&self, path: &Path) -> RecastResult<bool>;
}

/// Port for reading a template source.
///
/// Implemented by `recast_adapters::template_loader::FilesystemTemplateLoader`.
#[cfg_attr(test, mockall::automock)]
pub trait TemplateLoader: Send + Sync {
    /// Load the template rooted at `source`.
    ///
    /// Fails with `TemplateNotFound` when there is no template there.
    fn load(&self, source: &Path) -> RecastResult<Template>;
}

/// Port for the template engine.
///
/// Implemented by `recast_adapters::renderer::HandlebarsRenderer`.
#[cfg_attr(test, mockall::automock)]
pub trait TemplateRenderer: Send + Sync {
    /// Render one template string. `name` identifies it in error messages.
    fn render_str(&self, name: &str, template: &str, context: &RenderContext)
    -> RecastResult<String>;

    /// Evaluate an inclusion condition.
    fn evaluate(&self, condition: &Condition, context: &RenderContext) -> RecastResult<bool>;
}

/// Port for asking the user for a value.
///
/// Implemented by the CLI when running interactively.
#[cfg_attr(test, mockall::automock)]
pub trait Prompter: Send + Sync {
    /// Ask for `spec`, offering `default` (already rendered and coerced).
    fn ask(&self, spec: &VariableSpec, default: Option<DataValue>) -> RecastResult<DataValue>;
}
