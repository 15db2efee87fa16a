//! Storage layer
//!
//! A string-keyed key-value backend (one file per key on disk, in-memory
//! for tests) and the persistence gateway that serializes the stores and
//! stats to it, scoped by the active namespace.

pub mod backend;
pub mod error;
pub mod gateway;

pub use backend::{FileBackend, KeyValueBackend, MemoryBackend};
pub use error::{StorageError, StorageResult};
pub use gateway::{Gateway, Namespace, NamespaceData, ACCOUNTS_KEY, ACTIVE_USER_KEY, THEME_KEY};
