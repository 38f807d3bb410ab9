//! String key/value storage backends
//!
//! Every persisted structure in Taskpad (user and task collections, server
//! sessions, the client's mirrored session) ends up as a string value under a
//! string key. This module defines that contract and its backends:
//!
//! - [`MemoryStorage`]: process-local and ephemeral, used for sessions
//! - [`FileStorage`]: one JSON document per key inside a data directory
//!
//! # Example
//!
//! ```
//! use taskpad_shared::storage::{MemoryStorage, Storage};
//!
//! # fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let storage = MemoryStorage::new();
//! storage.set_item("greeting", "hello")?;
//! assert_eq!(storage.get_item("greeting")?.as_deref(), Some("hello"));
//!
//! storage.remove_item("greeting")?;
//! assert!(storage.get_item("greeting")?.is_none());
//! # Ok(())
//! # }
//! ```

pub mod file;
pub mod memory;

pub use file::FileStorage;
pub use memory::MemoryStorage;

/// Error type for storage backends
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    /// Underlying I/O failed
    #[error("Storage I/O failed for key '{key}': {source}")]
    Io {
        key: String,
        #[source]
        source: std::io::Error,
    },

    /// Key cannot be mapped onto the backend
    #[error("Invalid storage key: {0}")]
    InvalidKey(String),
}

/// String key/value storage
///
/// Mirrors the browser storage API: values are opaque strings and a missing
/// key is `None`, not an error. Implementations lock internally so a single
/// instance can be shared behind an `Arc`.
pub trait Storage: Send + Sync {
    /// Reads the value stored under `key`
    fn get_item(&self, key: &str) -> Result<Option<String>, StorageError>;

    /// Stores `value` under `key`, replacing any previous value
    fn set_item(&self, key: &str, value: &str) -> Result<(), StorageError>;

    /// Removes `key`; removing a missing key is a no-op
    fn remove_item(&self, key: &str) -> Result<(), StorageError>;

    /// Removes every key
    fn clear(&self) -> Result<(), StorageError>;
}
