//! Ephemeral token → user mapping
//!
//! The session store lives in a storage instance that is expected to be
//! ephemeral ([`MemoryStorage`](crate::storage::MemoryStorage)). Entries are
//! written under `session_<sha256(token)>` and hold the user identifier.
//! Nothing here expires on a timer: a session ends on logout or when its
//! storage is dropped.

use super::token::{hash_token, validate_token_format};
use crate::storage::{Storage, StorageError};
use std::sync::Arc;

const SESSION_KEY_PREFIX: &str = "session_";

/// Token → user id mapping
#[derive(Clone)]
pub struct SessionStore {
    storage: Arc<dyn Storage>,
}

impl SessionStore {
    /// Creates a session store over `storage`
    pub fn new(storage: Arc<dyn Storage>) -> Self {
        Self { storage }
    }

    fn key(token: &str) -> String {
        format!("{}{}", SESSION_KEY_PREFIX, hash_token(token))
    }

    /// Records that `token` authenticates `user_id`
    pub fn create(&self, token: &str, user_id: &str) -> Result<(), StorageError> {
        self.storage.set_item(&Self::key(token), user_id)
    }

    /// Looks up the user behind `token`
    ///
    /// Malformed tokens short-circuit to `None` without a storage read.
    pub fn resolve(&self, token: &str) -> Result<Option<String>, StorageError> {
        if !validate_token_format(token) {
            return Ok(None);
        }

        self.storage.get_item(&Self::key(token))
    }

    /// Forgets `token`; unknown tokens are ignored
    pub fn revoke(&self, token: &str) -> Result<(), StorageError> {
        self.storage.remove_item(&Self::key(token))
    }
}
