//! Registration, login and token verification
//!
//! [`AuthService`] is the only authentication gate in Taskpad. It owns the
//! `users` record store and the ephemeral [`SessionStore`]; it is constructed
//! once and handed to whoever needs it.
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use taskpad_shared::auth::service::{AuthService, LoginRequest, RegisterRequest};
//! use taskpad_shared::storage::MemoryStorage;
//!
//! # fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let auth = AuthService::new(Arc::new(MemoryStorage::new()), Arc::new(MemoryStorage::new()));
//!
//! auth.register(RegisterRequest {
//!     name: "Ada".to_string(),
//!     email: "ada@example.com".to_string(),
//!     password: "correct horse".to_string(),
//! })?;
//!
//! let session = auth.login(LoginRequest {
//!     email: "ada@example.com".to_string(),
//!     password: "correct horse".to_string(),
//! })?;
//!
//! assert_eq!(auth.verify_auth(&session.token)?, Some(session.user.id.clone()));
//!
//! auth.logout(&session.token)?;
//! assert_eq!(auth.verify_auth(&session.token)?, None);
//! # Ok(())
//! # }
//! ```

use super::{password, session::SessionStore, token::generate_session_token};
use crate::{
    models::user::{normalize_email, NewUser, PublicUser, User},
    storage::{Storage, StorageError},
    store::{RecordStore, StoreError},
};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{info, warn};
use validator::{Validate, ValidationErrors};

/// Message shared by every credential failure, so callers cannot tell an
/// unknown email from a wrong password
pub const INVALID_CREDENTIALS: &str = "Invalid email or password";

/// Error type for authentication operations
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    /// Missing or malformed input (400)
    #[error("{0}")]
    Validation(String),

    /// Unknown email or wrong password (401)
    #[error("Invalid email or password")]
    InvalidCredentials,

    /// Email already registered (409)
    #[error("Email already registered")]
    EmailTaken,

    /// User store failed
    #[error(transparent)]
    Store(#[from] StoreError),

    /// Session storage failed
    #[error(transparent)]
    Storage(#[from] StorageError),

    /// Password hashing failed
    #[error(transparent)]
    Password(#[from] password::PasswordError),
}

/// Registration input
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct RegisterRequest {
    /// Display name
    #[serde(default)]
    #[validate(length(max = 100, message = "Name must be at most 100 characters"))]
    pub name: String,

    /// Email address, unique across users
    #[serde(default)]
    #[validate(email(message = "Invalid email format"))]
    pub email: String,

    /// Plaintext password; hashed before storage
    #[serde(default)]
    #[validate(length(max = 1024, message = "Password must be at most 1024 characters"))]
    pub password: String,
}

/// Login input
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LoginRequest {
    #[serde(default)]
    pub email: String,

    #[serde(default)]
    pub password: String,
}

/// Successful login
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    /// Opaque bearer token
    pub token: String,

    /// Public projection of the logged-in user
    pub user: PublicUser,
}

/// Flattens validator output into one deterministic message
pub fn validation_message(errors: &ValidationErrors) -> String {
    let mut messages: Vec<String> = errors
        .field_errors()
        .iter()
        .flat_map(|(field, errors)| {
            errors.iter().map(move |error| {
                error
                    .message
                    .as_ref()
                    .map(|m| m.to_string())
                    .unwrap_or_else(|| format!("Invalid {}", field))
            })
        })
        .collect();
    messages.sort();
    messages.join("; ")
}

/// User registration and session management
#[derive(Clone)]
pub struct AuthService {
    users: RecordStore<User>,
    sessions: SessionStore,
    register_lock: Arc<Mutex<()>>,
}

impl AuthService {
    /// Creates the service
    ///
    /// `user_storage` holds the durable `users` collection; `session_storage`
    /// should be ephemeral.
    pub fn new(user_storage: Arc<dyn Storage>, session_storage: Arc<dyn Storage>) -> Self {
        Self {
            users: RecordStore::new(user_storage),
            sessions: SessionStore::new(session_storage),
            register_lock: Arc::new(Mutex::new(())),
        }
    }

    /// Direct access to the user store for administrative updates
    pub fn users(&self) -> &RecordStore<User> {
        &self.users
    }

    /// Registers a new user
    ///
    /// # Errors
    ///
    /// - `AuthError::Validation` if name, email or password is blank, or the
    ///   email is malformed
    /// - `AuthError::EmailTaken` if the (normalized) email is already stored
    pub fn register(&self, req: RegisterRequest) -> Result<PublicUser, AuthError> {
        if req.name.trim().is_empty() || req.email.trim().is_empty() || req.password.is_empty() {
            return Err(AuthError::Validation(
                "Name, email and password are required".to_string(),
            ));
        }

        let req = RegisterRequest {
            email: normalize_email(&req.email),
            ..req
        };
        req.validate()
            .map_err(|e| AuthError::Validation(validation_message(&e)))?;

        // Check-then-insert must not interleave with another registration
        let _guard = self.register_lock.lock();

        if self
            .users
            .find_by("email", &serde_json::Value::String(req.email.clone()))?
            .is_some()
        {
            warn!(email = %req.email, "Registration rejected: email already registered");
            return Err(AuthError::EmailTaken);
        }

        let password_hash = password::hash_password(&req.password)?;
        let user = self.users.insert(User::from_new(NewUser {
            name: req.name,
            email: req.email,
            password_hash,
        }))?;

        info!(user_id = %user.id, "User registered");
        Ok(user.to_public())
    }

    /// Validates credentials and opens a session
    ///
    /// # Errors
    ///
    /// - `AuthError::Validation` if email or password is missing
    /// - `AuthError::InvalidCredentials` for an unknown email or a wrong
    ///   password (indistinguishable)
    pub fn login(&self, req: LoginRequest) -> Result<Session, AuthError> {
        if req.email.trim().is_empty() || req.password.is_empty() {
            return Err(AuthError::Validation(
                "Email and password are required".to_string(),
            ));
        }

        let email = normalize_email(&req.email);
        let Some(user) = self
            .users
            .find_by("email", &serde_json::Value::String(email))?
        else {
            warn!("Login failed: unknown email");
            return Err(AuthError::InvalidCredentials);
        };

        if !password::verify_password(&req.password, &user.password_hash)? {
            warn!(user_id = %user.id, "Login failed: wrong password");
            return Err(AuthError::InvalidCredentials);
        }

        let token = generate_session_token();
        self.sessions.create(&token, &user.id)?;

        info!(user_id = %user.id, "User logged in");
        Ok(Session {
            token,
            user: user.to_public(),
        })
    }

    /// Returns the user id behind `token`, or `None` if the token is unknown
    pub fn verify_auth(&self, token: &str) -> Result<Option<String>, AuthError> {
        Ok(self.sessions.resolve(token)?)
    }

    /// Returns the public user behind `token`
    ///
    /// A session whose user no longer exists resolves to `None`.
    pub fn current_user(&self, token: &str) -> Result<Option<PublicUser>, AuthError> {
        let Some(user_id) = self.verify_auth(token)? else {
            return Ok(None);
        };

        Ok(self.users.get_by_id(&user_id)?.map(|u| u.to_public()))
    }

    /// Ends the session for `token`; unknown tokens are fine
    pub fn logout(&self, token: &str) -> Result<(), AuthError> {
        self.sessions.revoke(token)?;
        info!("Session closed");
        Ok(())
    }
}
