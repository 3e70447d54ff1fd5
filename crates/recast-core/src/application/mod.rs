//! Application layer for recast.
//!
//! This layer contains:
//! - **Services**: Use case orchestration (`ProjectService`)
//! - **Ports**: Interface definitions (traits) for external dependencies
//! - **Errors**: Application-specific error types
//!
//! The application layer coordinates the domain layer but contains no
//! business rules itself. Those live in `crate::domain`.

pub mod error;
pub mod ports;
pub mod services;

pub use services::{
    FileStatusReport, GenerateOptions, GenerateReport, GeneratedFile, PreservedUserChange,
    ProjectService, StatusReport, UpdateOptions, UpdateReport, UpdatedFile, WriteAction,
};

// Re-export port traits (for adapter implementation)
pub use ports::{Filesystem, Prompter, TemplateLoader, TemplateRenderer};

pub use error::ApplicationError;
