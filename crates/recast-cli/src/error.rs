//! Error handling for the recast CLI.
//!
//! Provides structured errors with:
//! - User-friendly messages
//! - Actionable suggestions
//! - One exit code per error kind

use std::error::Error;

use owo_colors::OwoColorize;
use thiserror::Error;

use recast_core::error::{ErrorCategory as CoreCategory, ErrorKind, RecastError};

/// Result type alias for CLI operations.
pub type CliResult<T> = Result<T, CliError>;

/// CLI error types.
#[derive(Debug, Error)]
pub enum CliError {
    /// Arguments parsed but make no sense (e.g. `-d` without `=`).
    #[error("Invalid input: {message}")]
    InvalidInput { message: String },

    /// A configuration file could not be read or parsed.
    #[error("Configuration error: {message}")]
    ConfigError {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// An error propagated from `recast-core` or an adapter.
    #[error(transparent)]
    Core(#[from] RecastError),

    /// Writing to the terminal failed.
    #[error("I/O error: {message}")]
    IoError {
        message: String,
        #[source]
        source: std::io::Error,
    },
}

impl From<std::io::Error> for CliError {
    fn from(err: std::io::Error) -> Self {
        CliError::IoError {
            message: err.to_string(),
            source: err,
        }
    }
}

impl CliError {
    /// Get user-actionable suggestions for fixing this error.
    pub fn suggestions(&self) -> Vec<String> {
        match self {
            Self::InvalidInput { message } => vec![
                format!("Check your input: {message}"),
                "Use --help for usage information".into(),
            ],
            Self::ConfigError { .. } => vec![
                format!(
                    "Check your config file (default: {})",
                    crate::config::AppConfig::config_path().display()
                ),
                "Check RECAST_* environment variables".into(),
                "Use 'recast config list' to see the values in effect".into(),
            ],
            Self::Core(core_err) => core_err.suggestions(),
            Self::IoError { .. } => vec!["Check that stdout/stderr are writable".into()],
        }
    }

    /// Get the error category for styling and log severity.
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::InvalidInput { .. } => ErrorCategory::UserError,
            Self::ConfigError { .. } => ErrorCategory::Configuration,
            Self::Core(core) => match core.category() {
                CoreCategory::Validation | CoreCategory::Compatibility => ErrorCategory::UserError,
                CoreCategory::NotFound => ErrorCategory::NotFound,
                CoreCategory::Conflict => ErrorCategory::Conflict,
                CoreCategory::Configuration => ErrorCategory::Configuration,
                CoreCategory::Cancelled => ErrorCategory::Cancelled,
                CoreCategory::Internal => ErrorCategory::Internal,
            },
            Self::IoError { .. } => ErrorCategory::Internal,
        }
    }

    /// Exit code to pass to the OS.
    ///
    /// | Kind                               | Code |
    /// |------------------------------------|------|
    /// | Internal / I/O                     |   1  |
    /// | Invalid command-line usage         |   2  |
    /// | Template not found                 |   3  |
    /// | Invalid data / missing variable    |   4  |
    /// | Destination conflict               |   5  |
    /// | Render error                       |   6  |
    /// | Provenance missing                 |   7  |
    /// | Unresolved merge conflict          |   8  |
    /// | Template version incompatible      |   9  |
    /// | Configuration                      |  10  |
    /// | Cancelled at a prompt              | 130  |
    pub fn exit_code(&self) -> u8 {
        match self {
            Self::InvalidInput { .. } => 2,
            Self::ConfigError { .. } => 10,
            Self::IoError { .. } => 1,
            Self::Core(core) => match core.kind() {
                ErrorKind::TemplateNotFound => 3,
                ErrorKind::InvalidDataContext | ErrorKind::MissingVariable => 4,
                ErrorKind::DestinationConflict => 5,
                ErrorKind::RenderError => 6,
                ErrorKind::ProvenanceMissing => 7,
                ErrorKind::MergeConflict => 8,
                ErrorKind::TemplateVersionIncompatible => 9,
                ErrorKind::Configuration => 10,
                ErrorKind::Cancelled => 130,
                ErrorKind::Io | ErrorKind::Internal => 1,
            },
        }
    }

    /// Format the error for display with colors and suggestions.
    pub fn format_colored(&self, verbose: bool) -> String {
        let mut output = String::new();

        output.push_str(&format!(
            "\n{} {}\n\n",
            "✗".red().bold(),
            "Error:".red().bold()
        ));
        output.push_str(&format!("  {}\n", self.to_string().red()));

        if verbose {
            let mut source = self.source();
            while let Some(err) = source {
                output.push_str(&format!(
                    "\n  {} {}\n",
                    "→".dimmed(),
                    err.to_string().dimmed()
                ));
                source = err.source();
            }
        }

        let suggestions = self.suggestions();
        if !suggestions.is_empty() {
            output.push_str(&format!("\n{}\n", "Suggestions:".yellow().bold()));
            for suggestion in suggestions {
                output.push_str(&format!("  {suggestion}\n"));
            }
        }

        if !verbose {
            output.push('\n');
            output.push_str(&format!(
                "{} {}\n",
                "\u{2139}".blue(), // ℹ
                "Use -v / --verbose for more details.".dimmed(),
            ));
        }

        output
    }

    /// Plain-text version of [`Self::format_colored`]; no ANSI codes.
    pub fn format_plain(&self, verbose: bool) -> String {
        let mut out = String::new();
        out.push_str(&format!("\nError: {self}\n"));

        if verbose {
            let mut src = self.source();
            while let Some(err) = src {
                out.push_str(&format!("  Caused by: {err}\n"));
                src = err.source();
            }
        }

        let suggestions = self.suggestions();
        if !suggestions.is_empty() {
            out.push_str("\nSuggestions:\n");
            for s in &suggestions {
                out.push_str(&format!("  {s}\n"));
            }
        }

        if !verbose {
            out.push_str("\nUse -v / --verbose for more details.\n");
        }

        out
    }

    /// Log the error using tracing.
    pub fn log(&self) {
        match self.category() {
            ErrorCategory::UserError => tracing::warn!("User error: {}", self),
            ErrorCategory::NotFound => tracing::warn!("Not found: {}", self),
            ErrorCategory::Conflict => tracing::warn!("Conflict: {}", self),
            ErrorCategory::Cancelled => tracing::info!("Cancelled by user"),
            ErrorCategory::Configuration => tracing::error!("Configuration error: {}", self),
            ErrorCategory::Internal => tracing::error!("Internal error: {}", self),
        }

        if let Some(source) = self.source() {
            tracing::debug!("Caused by: {}", source);
        }
    }
}

/// Error categories for classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// User input error (validation, invalid arguments).
    UserError,
    /// Template or provenance not found.
    NotFound,
    /// Something on disk is in the way.
    Conflict,
    /// Configuration error.
    Configuration,
    /// The user aborted a prompt.
    Cancelled,
    /// Internal/system error.
    Internal,
}
