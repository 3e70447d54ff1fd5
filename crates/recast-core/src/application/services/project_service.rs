//! Project service - the application's driving port.
//!
//! One service instance owns the adapters for a single invocation and
//! exposes the three use cases:
//! 1. `generate` a project from a template source
//! 2. `update` a generated project to the current template
//! 3. `status` of a generated project against its baseline
//!
//! Each use case lives in its own module as an `impl ProjectService` block.

use std::path::{Path, PathBuf};

use semver::Version;
use serde::Serialize;
use tracing::{debug, instrument};

use crate::{
    application::{
        ApplicationError,
        ports::{Filesystem, Prompter, TemplateLoader, TemplateRenderer},
    },
    domain::{
        ConflictMode, DataContext, FileStatus, PROVENANCE_FILE, PreserveReason, ProvenanceRecord,
        RenderContext, Template,
    },
    error::{RecastError, RecastResult},
};

/// Main application service.
pub struct ProjectService {
    pub(super) loader: Box<dyn TemplateLoader>,
    pub(super) renderer: Box<dyn TemplateRenderer>,
    pub(super) filesystem: Box<dyn Filesystem>,
    pub(super) prompter: Option<Box<dyn Prompter>>,
}

impl ProjectService {
    /// Create a service with the given adapters and no prompter.
    ///
    /// # Example
    ///
    /// ```rust,ignore
    /// use recast_core::application::ProjectService;
    ///
    /// let service = ProjectService::new(
    ///     Box::new(loader),     // impl TemplateLoader
    ///     Box::new(renderer),   // impl TemplateRenderer
    ///     Box::new(filesystem), // impl Filesystem
    /// );
    /// ```
    pub fn new(
        loader: Box<dyn TemplateLoader>,
        renderer: Box<dyn TemplateRenderer>,
        filesystem: Box<dyn Filesystem>,
    ) -> Self {
        Self {
            loader,
            renderer,
            filesystem,
            prompter: None,
        }
    }

    /// Ask missing answers through `prompter` unless `use_defaults` is set.
    pub fn with_prompter(mut self, prompter: Box<dyn Prompter>) -> Self {
        self.prompter = Some(prompter);
        self
    }

    // -------------------------------------------------------------------------
    // Shared helpers
    // -------------------------------------------------------------------------

    /// Load a template and make sure this build can render it.
    #[instrument(skip(self), fields(source = %source.display()))]
    pub(super) fn load_template(&self, source: &Path) -> RecastResult<Template> {
        let template = self.loader.load(source)?;
        template.check_compatibility(&engine_version()?)?;
        debug!(template = %template.id, variables = template.variables.len(), "Template loaded");
        Ok(template)
    }

    pub(super) fn render_context(template: &Template, answers: &DataContext) -> RenderContext {
        RenderContext::new(answers)
            .with_builtins(template.id.name(), &template.id.version().to_string())
    }

    pub(super) fn read_provenance(&self, project: &Path) -> RecastResult<ProvenanceRecord> {
        let path = project.join(PROVENANCE_FILE);
        let bytes = self.filesystem.read_file(&path)?.ok_or_else(|| {
            ApplicationError::ProvenanceMissing {
                path: project.to_path_buf(),
                reason: format!("{PROVENANCE_FILE} not found"),
            }
        })?;
        let text = String::from_utf8(bytes).map_err(|_| ApplicationError::ProvenanceMissing {
            path: path.clone(),
            reason: "not valid UTF-8".into(),
        })?;
        ProvenanceRecord::from_toml(&text).map_err(|e| {
            ApplicationError::ProvenanceMissing {
                path,
                reason: e.to_string(),
            }
            .into()
        })
    }
}

/// Version of this build, for `min_version` checks.
pub fn engine_version() -> RecastResult<Version> {
    Version::parse(crate::VERSION).map_err(|e| RecastError::Internal {
        message: format!("crate version '{}' is not SemVer: {e}", crate::VERSION),
    })
}

// ============================================================================
// Options
// ============================================================================

#[derive(Debug, Clone, Copy, Default)]
pub struct GenerateOptions {
    /// Never prompt; missing answers fall back to defaults.
    pub use_defaults: bool,
    /// Overwrite existing files and an existing provenance record.
    pub force: bool,
    /// Compute and report, write nothing.
    pub pretend: bool,
    /// Reject data keys the template does not declare.
    pub strict: bool,
}

#[derive(Debug, Clone, Default)]
pub struct UpdateOptions {
    /// Template source; defaults to the one recorded in provenance.
    pub source: Option<PathBuf>,
    pub use_defaults: bool,
    pub strict: bool,
    pub conflict: ConflictMode,
    pub pretend: bool,
}

// ============================================================================
// Reports
// ============================================================================

/// What generate did (or would do) to one file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum WriteAction {
    Created,
    Overwritten,
    Identical,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GeneratedFile {
    pub path: String,
    pub action: WriteAction,
}

#[derive(Debug, Clone, Serialize)]
pub struct GenerateReport {
    pub template: String,
    pub version: String,
    pub destination: PathBuf,
    pub pretend: bool,
    pub files: Vec<GeneratedFile>,
    /// Resolved answers, secrets excluded.
    pub answers: DataContext,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UpdatedFile {
    pub path: String,
    pub status: FileStatus,
    pub action: &'static str,
}

/// A user change that update left alone.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PreservedUserChange {
    pub path: String,
    pub reason: PreserveReason,
    /// Sidecar holding the template's version, when one was written.
    pub rej: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct UpdateReport {
    pub template: String,
    pub from_version: String,
    pub to_version: String,
    pub pretend: bool,
    pub files: Vec<UpdatedFile>,
    pub advisories: Vec<PreservedUserChange>,
    pub provenance_changed: bool,
}

impl UpdateReport {
    pub fn count(&self, action: &str) -> usize {
        self.files.iter().filter(|f| f.action == action).count()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FileStatusReport {
    pub path: String,
    pub status: FileStatus,
}

#[derive(Debug, Clone, Serialize)]
pub struct StatusReport {
    pub template: String,
    pub version: String,
    pub files: Vec<FileStatusReport>,
    /// `.rej` sidecars still waiting to be resolved.
    pub pending_rej: Vec<String>,
}

impl StatusReport {
    pub fn is_clean(&self) -> bool {
        self.pending_rej.is_empty()
            && self.files.iter().all(|f| f.status == FileStatus::Unchanged)
    }
}
