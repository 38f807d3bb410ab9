//! Authentication for Taskpad
//!
//! # Modules
//!
//! - [`password`]: Argon2id password hashing and verification
//! - [`token`]: opaque session token generation and hashing
//! - [`session`]: ephemeral token → user id mapping
//! - [`service`]: registration, login, verification and logout
//!
//! Every protected operation goes through
//! [`AuthService::verify_auth`](service::AuthService::verify_auth); there is
//! no other gate.

pub mod password;
pub mod service;
pub mod session;
pub mod token;

pub use service::{AuthError, AuthService, LoginRequest, RegisterRequest, Session};
