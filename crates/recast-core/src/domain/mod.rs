//! Core domain layer for recast.
//!
//! Pure logic: templates and their variables, answers, rendered trees,
//! provenance records and the per-file reconciliation table. No filesystem
//! access and no template engine; both are ports in the application layer.

pub mod entities;
pub mod error;
pub mod naming;
pub mod reconcile;
pub mod value_objects;

mod validation;

pub use entities::{
    common::{Permissions, RelativePath},
    data_context::{
        BUILTIN_RECAST_VERSION, BUILTIN_TEMPLATE_ID, BUILTIN_TEMPLATE_VERSION, DataContext,
        RenderContext,
    },
    project_structure::{RenderedFile, RenderedTree},
    provenance::{PROVENANCE_FILE, ProvenanceRecord, TemplateRef},
    template::{
        Condition, DEFAULT_TEMPLATES_SUFFIX, DirectorySpec, FileSpec, MANIFEST_FILE,
        SUPPORTED_SCHEMA, Template, TemplateBuilder, TemplateContent, TemplateId,
        TemplateMetadata, TemplateNode, TemplateTree, VariableSpec,
    },
};

pub use error::{DomainError, ErrorCategory};

pub use reconcile::{FileAction, FileStatus, PlannedFile, PreserveReason, UpdatePlan};

pub use value_objects::{ConflictMode, ContentHash, DataValue, Fingerprint, VariableType};

pub use validation::DomainValidator;
