//! Infrastructure adapters for recast.
//!
//! This crate implements the ports defined in `recast-core::application::ports`.
//! It contains all external dependencies and I/O operations.

pub mod filesystem;
pub mod renderer;
pub mod template_loader;

// Re-export commonly used adapters
pub use filesystem::{LocalFilesystem, MemoryFilesystem, ProjectLock};
pub use renderer::HandlebarsRenderer;
pub use template_loader::FilesystemTemplateLoader;
