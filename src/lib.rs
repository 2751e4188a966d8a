//! Storage core for uploaded documents: resolves stored references to paths
//! under a fixed root and public media URLs, and allocates collision-free,
//! slugified names for new uploads.
pub mod cli;
pub mod config;
pub mod error;
pub mod storage;

pub use storage::allocator::{Allocation, NameAllocator, Reservation};
pub use storage::resolver::PathResolver;
pub use storage::{StorageClient, StorageConfig};
