//! In-process transport
//!
//! - [`XhrShim`]: a callback-driven request object (open / set header / send /
//!   on_load / on_error) that hands requests to a [`TaskpadServer`]
//! - [`InProcessTransport`]: a [`Transport`] built on the shim, so the client
//!   shell can talk to an in-process server exactly as it would to a remote one
//!
//! [`TaskpadServer`]: crate::server::TaskpadServer
//! [`Transport`]: taskpad_shared::transport::Transport

pub mod in_process;
pub mod xhr;

pub use in_process::InProcessTransport;
pub use xhr::{ReadyState, XhrShim};
