//! File System Module
//!
//! Filesystem probing for conditional predicates. Two implementations:
//! - MemoryFs: in-memory path table (tests and demos)
//! - OsFs: the real filesystem via std::fs

pub mod memory_fs;
pub mod os_fs;
pub mod types;

pub use memory_fs::MemoryFs;
pub use os_fs::OsFs;
pub use types::*;
