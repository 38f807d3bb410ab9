//! User model
//!
//! Users are created by registration and never deleted by any exposed
//! operation. The stored password is an Argon2id PHC string; it never leaves
//! the server. Anything sent back to a client goes through [`PublicUser`].
//!
//! # Example
//!
//! ```
//! use taskpad_shared::models::user::{NewUser, User};
//!
//! let user = User::from_new(NewUser {
//!     name: "Ada".to_string(),
//!     email: "Ada@Example.com ".to_string(),
//!     password_hash: "$argon2id$...".to_string(),
//! });
//!
//! assert_eq!(user.email, "ada@example.com");
//! let public = user.to_public();
//! assert_eq!(public.name, "Ada");
//! ```

use crate::store::Record;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Stored user account
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    /// Identifier assigned by the store
    #[serde(default)]
    pub id: String,

    /// Display name
    pub name: String,

    /// Normalized (trimmed, lowercase) email, unique across users
    pub email: String,

    /// Argon2id hash of the password
    pub password_hash: String,

    /// When the account was created
    pub created_at: DateTime<Utc>,
}

/// Input for creating a user
#[derive(Debug, Clone)]
pub struct NewUser {
    pub name: String,
    pub email: String,
    pub password_hash: String,
}

/// Client-facing projection of a user
///
/// The password hash is deliberately absent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PublicUser {
    pub id: String,
    pub name: String,
    pub email: String,
}

/// Normalizes an email for storage and lookup
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

impl User {
    /// Builds an unsaved user; the store assigns the identifier on insert
    pub fn from_new(data: NewUser) -> Self {
        Self {
            id: String::new(),
            name: data.name.trim().to_string(),
            email: normalize_email(&data.email),
            password_hash: data.password_hash,
            created_at: Utc::now(),
        }
    }

    /// Public projection of this user
    pub fn to_public(&self) -> PublicUser {
        PublicUser {
            id: self.id.clone(),
            name: self.name.clone(),
            email: self.email.clone(),
        }
    }
}

impl Record for User {
    const COLLECTION: &'static str = "users";

    fn id(&self) -> &str {
        &self.id
    }

    fn set_id(&mut self, id: String) {
        self.id = id;
    }
}
