//! Session record persistence backends.

pub mod core;
pub mod file;
pub mod memory;

pub use self::core::*;
pub use file::FilePersistence;
pub use memory::MemoryPersistence;
