//! recast core - hexagonal architecture implementation
//!
//! This crate provides the domain and application layers for recast, a
//! project generator that can later bring generated projects up to date with
//! their template without clobbering local edits.
//!
//! ## Architecture Overview
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │            recast-cli (CLI)             │
//! │       (drives ProjectService)           │
//! └──────────────────┬──────────────────────┘
//!                    │ calls
//!                    ▼
//! ┌─────────────────────────────────────────┐
//! │         Application Services            │
//! │   ProjectService: generate / update /   │
//! │   status                                │
//! └──────────────────┬──────────────────────┘
//!                    │ uses
//!                    ▼
//! ┌─────────────────────────────────────────┐
//! │       Application Ports (Traits)        │
//! │  Filesystem, TemplateLoader,            │
//! │  TemplateRenderer, Prompter             │
//! └──────────────────┬──────────────────────┘
//!                    │ implemented by
//!                    ▼
//! ┌─────────────────────────────────────────┐
//! │     recast-adapters (Infrastructure)    │
//! └─────────────────────────────────────────┘
//!
//! ┌─────────────────────────────────────────┐
//! │        Domain Layer (Pure Logic)        │
//! │  Template, DataContext, RenderedTree,   │
//! │  ProvenanceRecord, reconciliation       │
//! └─────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//!
//! ```rust,ignore
//! use recast_core::prelude::*;
//!
//! let service = ProjectService::new(loader, renderer, filesystem);
//! let data = DataContext::parse_pairs(["project_name=Demo"])?;
//! service.generate(source, destination, &data, &GenerateOptions::default())?;
//! ```

pub mod domain;

pub mod application;

pub mod error;

// Public API - what external crates should use
pub mod prelude {
    pub use crate::application::{
        GenerateOptions, GenerateReport, ProjectService, StatusReport, UpdateOptions,
        UpdateReport,
        ports::{Filesystem, Prompter, TemplateLoader, TemplateRenderer},
    };
    pub use crate::domain::{
        Condition, ConflictMode, DataContext, DataValue, RenderContext, Template, TemplateId,
        VariableSpec, VariableType,
    };
    pub use crate::error::{ErrorKind, RecastError, RecastResult};
}

pub const VERSION: &str = env!("CARGO_PKG_VERSION");
