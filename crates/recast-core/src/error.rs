//! Unified error handling for recast core.
//!
//! This module provides a unified error type that wraps domain and application
//! errors, classifies them into the kinds callers branch on, and carries
//! user-actionable suggestions.

use std::fmt;

use thiserror::Error;

use crate::application::ApplicationError;
use crate::domain::DomainError;

/// Root error type for recast core operations.
#[derive(Debug, Error, Clone)]
pub enum RecastError {
    /// Errors from the domain layer (template/answer rule violations).
    #[error(transparent)]
    Domain(#[from] DomainError),

    /// Errors from the application layer (orchestration and I/O failures).
    #[error(transparent)]
    Application(#[from] ApplicationError),

    /// Configuration or setup errors.
    #[error("Configuration error: {message}")]
    Configuration { message: String },

    /// Unexpected internal errors (bugs).
    #[error("Internal error: {message}. This is a bug, please report it.")]
    Internal { message: String },
}

/// What went wrong, at the granularity callers (and exit codes) care about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    TemplateNotFound,
    InvalidDataContext,
    MissingVariable,
    DestinationConflict,
    RenderError,
    ProvenanceMissing,
    MergeConflict,
    TemplateVersionIncompatible,
    Io,
    Configuration,
    Cancelled,
    Internal,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::TemplateNotFound => "template not found",
            Self::InvalidDataContext => "invalid data",
            Self::MissingVariable => "missing variable",
            Self::DestinationConflict => "destination conflict",
            Self::RenderError => "render error",
            Self::ProvenanceMissing => "provenance missing",
            Self::MergeConflict => "merge conflict",
            Self::TemplateVersionIncompatible => "incompatible template",
            Self::Io => "i/o error",
            Self::Configuration => "configuration error",
            Self::Cancelled => "cancelled",
            Self::Internal => "internal error",
        };
        f.write_str(s)
    }
}

impl RecastError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Domain(e) => match e {
                DomainError::InvalidDataContext { .. } => ErrorKind::InvalidDataContext,
                DomainError::MissingVariable { .. } => ErrorKind::MissingVariable,
                DomainError::UnsupportedSchema { .. }
                | DomainError::VersionIncompatible { .. }
                | DomainError::TemplateMismatch { .. } => ErrorKind::TemplateVersionIncompatible,
                DomainError::InvalidProvenance(_) => ErrorKind::ProvenanceMissing,
                DomainError::DuplicatePath { .. }
                | DomainError::AbsolutePathNotAllowed { .. }
                | DomainError::PathEscapesRoot { .. } => ErrorKind::RenderError,
                DomainError::InvalidTemplate(_) | DomainError::MissingRequiredField { .. } => {
                    ErrorKind::TemplateNotFound
                }
            },
            Self::Application(e) => match e {
                ApplicationError::TemplateNotFound { .. } | ApplicationError::TemplateLoad { .. } => {
                    ErrorKind::TemplateNotFound
                }
                ApplicationError::RenderingFailed { .. } => ErrorKind::RenderError,
                ApplicationError::DestinationConflict { .. } => ErrorKind::DestinationConflict,
                ApplicationError::ProvenanceMissing { .. } => ErrorKind::ProvenanceMissing,
                ApplicationError::MergeConflict { .. } => ErrorKind::MergeConflict,
                ApplicationError::Cancelled => ErrorKind::Cancelled,
                ApplicationError::FilesystemError { .. }
                | ApplicationError::RollbackFailed { .. } => ErrorKind::Io,
            },
            Self::Configuration { .. } => ErrorKind::Configuration,
            Self::Internal { .. } => ErrorKind::Internal,
        }
    }

    /// Get user-actionable suggestions for fixing this error.
    pub fn suggestions(&self) -> Vec<String> {
        match self {
            Self::Domain(e) => e.suggestions(),
            Self::Application(e) => e.suggestions(),
            Self::Configuration { message } => vec![
                format!("Configuration issue: {message}"),
                "Check your config file and RECAST_* environment variables".into(),
            ],
            Self::Internal { .. } => vec![
                "This appears to be a bug in recast".into(),
                "Please report this issue with the output of `recast -vvv`".into(),
            ],
        }
    }

    /// Get error category for display/styling purposes.
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::Domain(e) => match e.category() {
                crate::domain::ErrorCategory::Validation => ErrorCategory::Validation,
                crate::domain::ErrorCategory::Compatibility => ErrorCategory::Compatibility,
                crate::domain::ErrorCategory::NotFound => ErrorCategory::NotFound,
                crate::domain::ErrorCategory::Internal => ErrorCategory::Internal,
            },
            Self::Application(e) => e.category(),
            Self::Configuration { .. } => ErrorCategory::Configuration,
            Self::Internal { .. } => ErrorCategory::Internal,
        }
    }
}

/// Error categories for UI display.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Validation,
    Compatibility,
    NotFound,
    Conflict,
    Configuration,
    Cancelled,
    Internal,
}

/// Convenient result type alias.
pub type RecastResult<T> = Result<T, RecastError>;
