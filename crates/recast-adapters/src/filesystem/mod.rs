//! Filesystem adapters.

mod local;
mod lock;
mod memory;

pub use local::LocalFilesystem;
pub use lock::ProjectLock;
pub use memory::MemoryFilesystem;
