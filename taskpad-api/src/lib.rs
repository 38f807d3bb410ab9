//! # Taskpad API
//!
//! The in-process task server and its bindings.
//!
//! ## Modules
//!
//! - `server`: request dispatcher (`TaskpadServer::dispatch`)
//! - `routes`: auth and task handlers, plus the HTTP health check
//! - `envelope`: the uniform `{status, success, message, data}` response
//! - `error`: error handling and status mapping
//! - `transport`: callback-style request shim and the in-process `Transport`
//! - `app`: axum router exposing the dispatcher over real HTTP
//! - `config`: environment-driven configuration

pub mod app;
pub mod config;
pub mod envelope;
pub mod error;
pub mod routes;
pub mod server;
pub mod transport;
