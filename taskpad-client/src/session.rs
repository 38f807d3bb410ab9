//! Client-side session
//!
//! Holds the bearer token and the logged-in user, and mirrors both into an
//! ephemeral [`Storage`] under [`TOKEN_KEY`] and [`USER_KEY`] on every change
//! so a reloaded shell can pick the session back up with
//! [`ClientSession::restore`].

use crate::error::ClientResult;
use parking_lot::RwLock;
use std::sync::Arc;
use taskpad_shared::{models::user::PublicUser, storage::Storage};
use tracing::warn;

/// Storage key of the bearer token
pub const TOKEN_KEY: &str = "authToken";

/// Storage key of the serialized user
pub const USER_KEY: &str = "currentUser";

#[derive(Debug, Default)]
struct SessionState {
    token: Option<String>,
    user: Option<PublicUser>,
}

/// Shared session handle; clones see the same state
#[derive(Clone)]
pub struct ClientSession {
    storage: Arc<dyn Storage>,
    state: Arc<RwLock<SessionState>>,
}

impl ClientSession {
    /// Empty session backed by `storage`; nothing is read from it
    pub fn new(storage: Arc<dyn Storage>) -> Self {
        Self {
            storage,
            state: Arc::new(RwLock::new(SessionState::default())),
        }
    }

    /// Rehydrates a session from `storage`
    ///
    /// A stored user that is not valid JSON means the mirror is corrupt: both
    /// keys are cleared and the session starts empty. Read failures are logged
    /// and also yield an empty session.
    pub fn restore(storage: Arc<dyn Storage>) -> Self {
        let session = Self::new(storage);

        let token = match session.storage.get_item(TOKEN_KEY) {
            Ok(token) => token,
            Err(e) => {
                warn!("Failed to read stored token: {}", e);
                None
            }
        };
        let raw_user = match session.storage.get_item(USER_KEY) {
            Ok(user) => user,
            Err(e) => {
                warn!("Failed to read stored user: {}", e);
                None
            }
        };

        let user = match raw_user.map(|raw| serde_json::from_str::<PublicUser>(&raw)) {
            Some(Ok(user)) => Some(user),
            Some(Err(e)) => {
                warn!("Discarding malformed stored session: {}", e);
                if let Err(e) = session.clear() {
                    warn!("Failed to clear malformed session: {}", e);
                }
                return session;
            }
            None => None,
        };

        *session.state.write() = SessionState { token, user };
        session
    }

    /// Current token, if any
    pub fn token(&self) -> Option<String> {
        self.state.read().token.clone()
    }

    /// Current user, if any
    pub fn user(&self) -> Option<PublicUser> {
        self.state.read().user.clone()
    }

    /// True iff a non-blank token is held
    pub fn is_logged_in(&self) -> bool {
        self.state
            .read()
            .token
            .as_deref()
            .is_some_and(|token| !token.trim().is_empty())
    }

    /// Replaces the session and mirrors it to storage
    ///
    /// In-memory state is updated even when mirroring fails.
    pub fn set(&self, token: impl Into<String>, user: PublicUser) -> ClientResult<()> {
        let token = token.into();
        let user_json = serde_json::to_string(&user)?;

        *self.state.write() = SessionState {
            token: Some(token.clone()),
            user: Some(user),
        };

        self.storage.set_item(TOKEN_KEY, &token)?;
        self.storage.set_item(USER_KEY, &user_json)?;
        Ok(())
    }

    /// Forgets the session and removes its mirror
    pub fn clear(&self) -> ClientResult<()> {
        *self.state.write() = SessionState::default();

        self.storage.remove_item(TOKEN_KEY)?;
        self.storage.remove_item(USER_KEY)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use taskpad_shared::storage::MemoryStorage;

    fn ada() -> PublicUser {
        PublicUser {
            id: "u1".to_string(),
            name: "Ada".to_string(),
            email: "ada@example.com".to_string(),
        }
    }

    #[test]
    fn test_set_mirrors_to_storage() {
        let storage = Arc::new(MemoryStorage::new());
        let session = ClientSession::new(storage.clone());

        session.set("tp_abc", ada()).unwrap();

        assert!(session.is_logged_in());
        assert_eq!(storage.get_item(TOKEN_KEY).unwrap().as_deref(), Some("tp_abc"));
        let stored: PublicUser =
            serde_json::from_str(&storage.get_item(USER_KEY).unwrap().unwrap()).unwrap();
        assert_eq!(stored, ada());
    }

    #[test]
    fn test_restore_round_trip() {
        let storage = Arc::new(MemoryStorage::new());
        ClientSession::new(storage.clone()).set("tp_abc", ada()).unwrap();

        let restored = ClientSession::restore(storage);
        assert_eq!(restored.token().as_deref(), Some("tp_abc"));
        assert_eq!(restored.user(), Some(ada()));
    }

    #[test]
    fn test_restore_malformed_user_clears_everything() {
        let storage = Arc::new(MemoryStorage::new());
        storage.set_item(TOKEN_KEY, "tp_abc").unwrap();
        storage.set_item(USER_KEY, "{not json").unwrap();

        let restored = ClientSession::restore(storage.clone());

        assert!(!restored.is_logged_in());
        assert!(restored.user().is_none());
        assert!(storage.get_item(TOKEN_KEY).unwrap().is_none());
        assert!(storage.get_item(USER_KEY).unwrap().is_none());
    }

    #[test]
    fn test_blank_token_is_not_logged_in() {
        let storage = Arc::new(MemoryStorage::new());
        storage.set_item(TOKEN_KEY, "   ").unwrap();

        assert!(!ClientSession::restore(storage).is_logged_in());
    }

    #[test]
    fn test_clear() {
        let storage = Arc::new(MemoryStorage::new());
        let session = ClientSession::new(storage.clone());
        session.set("tp_abc", ada()).unwrap();

        let other_handle = session.clone();
        session.clear().unwrap();

        assert!(!other_handle.is_logged_in());
        assert!(storage.is_empty());
    }
}
