//! Application ports (traits) for external dependencies.
//!
//! In hexagonal architecture, ports define interfaces that the application
//! needs from the outside world. Adapters in `recast-adapters` implement these.
//!
//! ## Port Types
//!
//! - **Driven (Output) Ports**: Called by application, implemented by infrastructure
//!   - `Filesystem`: File operations
//!   - `TemplateLoader`: Reading a template source
//!   - `TemplateRenderer`: Placeholder and condition evaluation
//!   - `Prompter`: Interactive answers
//!
//! - **Driving (Input) Ports**: Called by external world, implemented by application
//!   - `ProjectService` (generate, update, status)

pub mod output;

pub use output::{Filesystem, Prompter, TemplateLoader, TemplateRenderer};

#[cfg(test)]
pub use output::{MockFilesystem, MockPrompter, MockTemplateLoader, MockTemplateRenderer};
