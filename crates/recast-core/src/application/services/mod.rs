//! Application services - orchestrate use cases.
//!
//! `ProjectService` coordinates the domain layer and ports to generate,
//! update and inspect projects.

mod answers;
mod generate;
mod materialize;
pub mod project_service;
mod status;
mod update;

#[cfg(test)]
mod test_support;

pub use project_service::{
    FileStatusReport, GenerateOptions, GenerateReport, GeneratedFile, PreservedUserChange,
    ProjectService, StatusReport, UpdateOptions, UpdateReport, UpdatedFile, WriteAction,
    engine_version,
};
