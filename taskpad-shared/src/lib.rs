//! # Taskpad Shared Library
//!
//! Types and services shared by the Taskpad server (`taskpad-api`) and the
//! client shell (`taskpad-client`).
//!
//! ## Module Organization
//!
//! - `storage`: string key/value backends (memory, file)
//! - `store`: generic JSON record store over a storage key
//! - `models`: persisted records (users, tasks)
//! - `auth`: password hashing, session tokens, the auth service
//! - `transport`: request/response contract between client and server

pub mod auth;
pub mod models;
pub mod storage;
pub mod store;
pub mod transport;

/// Current version of the Taskpad shared library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
