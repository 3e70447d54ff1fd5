// ============================================================================
// domain/error.rs - template, answer and provenance rule violations
// ============================================================================

use thiserror::Error;

/// Root domain error type.
///
/// All errors are:
/// - Cloneable (reports carry them around)
/// - Categorizable (for CLI display)
/// - Actionable (provides suggestions)
#[derive(Debug, Error, Clone, PartialEq)]
pub enum DomainError {
    // ========================================================================
    // Template definition
    // ========================================================================
    #[error("Invalid template: {0}")]
    InvalidTemplate(String),

    #[error("Duplicate path in template: {path}")]
    DuplicatePath { path: String },

    #[error("Absolute paths not allowed: {path}")]
    AbsolutePathNotAllowed { path: String },

    #[error("Path escapes the project root: {path}")]
    PathEscapesRoot { path: String },

    #[error("Required field missing: {field}")]
    MissingRequiredField { field: &'static str },

    // ========================================================================
    // Compatibility
    // ========================================================================
    #[error("Template manifest schema {found} is not supported (this build reads schema {supported})")]
    UnsupportedSchema { found: u32, supported: u32 },

    #[error("Template '{template}' is incompatible: {reason}")]
    VersionIncompatible { template: String, reason: String },

    #[error("Project was generated from '{recorded}', not '{found}'")]
    TemplateMismatch { recorded: String, found: String },

    // ========================================================================
    // Answers
    // ========================================================================
    #[error("Invalid value for '{variable}': {reason}")]
    InvalidDataContext { variable: String, reason: String },

    #[error("No value for required variable '{variable}'")]
    MissingVariable { variable: String },

    // ========================================================================
    // Provenance
    // ========================================================================
    #[error("Invalid provenance record: {0}")]
    InvalidProvenance(String),
}

impl DomainError {
    /// Get user-actionable suggestions for fixing this error.
    pub fn suggestions(&self) -> Vec<String> {
        match self {
            Self::InvalidTemplate(msg) => vec![
                "Check the template's template.toml".into(),
                format!("Details: {msg}"),
            ],
            Self::DuplicatePath { path } => vec![format!(
                "Two template files render to '{path}'; make their names or conditions distinct"
            )],
            Self::UnsupportedSchema { .. } | Self::VersionIncompatible { .. } => vec![
                "Upgrade recast or use an older revision of the template".into(),
            ],
            Self::TemplateMismatch { recorded, .. } => vec![
                format!("Pass --source pointing at a checkout of '{recorded}'"),
            ],
            Self::InvalidDataContext { variable, .. } => vec![format!(
                "Fix the value with --data {variable}=<value>"
            )],
            Self::MissingVariable { variable } => vec![
                format!("Provide it with --data {variable}=<value>"),
                "Or run interactively without --defaults".into(),
            ],
            Self::InvalidProvenance(_) => vec![
                "The answers file was edited by hand or is from another tool".into(),
                "Restore it from version control".into(),
            ],
            _ => vec!["See documentation for more details".into()],
        }
    }

    /// Error category for CLI display styling.
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::InvalidTemplate(_)
            | Self::DuplicatePath { .. }
            | Self::AbsolutePathNotAllowed { .. }
            | Self::PathEscapesRoot { .. }
            | Self::MissingRequiredField { .. }
            | Self::InvalidDataContext { .. }
            | Self::MissingVariable { .. }
            | Self::InvalidProvenance(_) => ErrorCategory::Validation,
            Self::UnsupportedSchema { .. }
            | Self::VersionIncompatible { .. }
            | Self::TemplateMismatch { .. } => ErrorCategory::Compatibility,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Validation,
    Compatibility,
    NotFound,
    Internal,
}
