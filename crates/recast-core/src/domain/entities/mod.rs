pub mod common;
pub mod data_context;
pub mod project_structure;
pub mod provenance;
pub mod template;

pub use crate::domain::DomainError;
pub use data_context::{DataContext, RenderContext};
pub use project_structure::{RenderedFile, RenderedTree};
pub use provenance::ProvenanceRecord;
pub use template::Template;
