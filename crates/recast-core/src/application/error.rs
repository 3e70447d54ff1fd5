//! Application layer errors.
//!
//! These errors represent failures in orchestration and I/O, not template
//! or answer rules. Rule violations are `DomainError` from `crate::domain`.

use std::path::PathBuf;
use thiserror::Error;

use crate::error::ErrorCategory;

/// Errors that occur during application orchestration.
#[derive(Debug, Error, Clone)]
pub enum ApplicationError {
    /// No template at the given source, or its manifest is missing.
    #[error("Template not found at {path}: {reason}")]
    TemplateNotFound { path: PathBuf, reason: String },

    /// A manifest exists but could not be read as a template.
    #[error("Failed to load template from {path}: {reason}")]
    TemplateLoad { path: PathBuf, reason: String },

    /// The engine rejected a template body, path, default or condition.
    #[error("Failed to render '{item}': {reason}")]
    RenderingFailed { item: String, reason: String },

    /// Filesystem operation failed.
    #[error("Filesystem error at {path}: {reason}")]
    FilesystemError { path: PathBuf, reason: String },

    /// Writing would clobber something that isn't ours to clobber.
    #[error("Destination conflict at {path}: {reason}")]
    DestinationConflict { path: PathBuf, reason: String },

    /// No (readable) provenance record in the project.
    #[error("No provenance record in {path}: {reason}")]
    ProvenanceMissing { path: PathBuf, reason: String },

    /// A previous update's `.rej` file has not been dealt with.
    #[error("Unresolved conflict for {path}: {rej} is still present")]
    MergeConflict { path: String, rej: String },

    /// The user aborted an interactive prompt.
    #[error("Cancelled")]
    Cancelled,

    /// Rollback failed (best-effort cleanup failed).
    #[error("Rollback failed for {path}: {reason}")]
    RollbackFailed { path: PathBuf, reason: String },
}

impl ApplicationError {
    /// Get user-actionable suggestions.
    pub fn suggestions(&self) -> Vec<String> {
        match self {
            Self::TemplateNotFound { path, .. } => vec![
                format!("Looked for template.toml in: {}", path.display()),
                "Point SOURCE at a directory containing a template.toml".into(),
            ],
            Self::TemplateLoad { .. } => vec!["Check the template's template.toml".into()],
            Self::RenderingFailed { item, .. } => vec![
                format!("Check the placeholders in '{item}'"),
                "Every variable a template uses must be declared in template.toml".into(),
            ],
            Self::FilesystemError { path, .. } => vec![
                format!("Failed to access: {}", path.display()),
                "Check that you have write permissions".into(),
            ],
            Self::DestinationConflict { path, .. } => vec![
                format!("Destination: {}", path.display()),
                "Use --force to overwrite existing files".into(),
                "Or use `recast update` for a project that was already generated".into(),
            ],
            Self::ProvenanceMissing { .. } => vec![
                "Run `recast update` inside a project created by `recast generate`".into(),
                "Or restore .recast-answers.toml from version control".into(),
            ],
            Self::MergeConflict { path, rej } => vec![
                format!("Merge the changes from {rej} into {path} by hand"),
                format!("Then delete {rej} and run update again"),
            ],
            Self::Cancelled => vec!["Pass --defaults to skip prompts".into()],
            Self::RollbackFailed { path, .. } => vec![format!(
                "Remove {} manually before retrying",
                path.display()
            )],
        }
    }

    /// Get error category.
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::TemplateNotFound { .. } | Self::ProvenanceMissing { .. } => {
                ErrorCategory::NotFound
            }
            Self::TemplateLoad { .. } | Self::RenderingFailed { .. } => ErrorCategory::Validation,
            Self::DestinationConflict { .. } | Self::MergeConflict { .. } => {
                ErrorCategory::Conflict
            }
            Self::Cancelled => ErrorCategory::Cancelled,
            Self::FilesystemError { .. } | Self::RollbackFailed { .. } => ErrorCategory::Internal,
        }
    }
}
