//! # Taskpad Client
//!
//! The client shell: session handling, the API wrapper and fragment routing.
//!
//! ## Modules
//!
//! - `session`: token and user, mirrored to an ephemeral storage
//! - `api`: `ApiClient` over any `Transport`, normalizing every outcome
//! - `router`: fragment → template views, with protected routes
//! - `templates`: template registry and the built-in views
//! - `error`: client-local error types
//!
//! ## Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use taskpad_client::{api::ApiClient, router::TaskpadRouter, session::ClientSession};
//! use taskpad_shared::{storage::MemoryStorage, transport::Transport};
//!
//! # async fn example<T: Transport>(transport: T) {
//! let session = ClientSession::restore(Arc::new(MemoryStorage::new()));
//! let mut router = TaskpadRouter::standard(session.clone());
//! let client = ApiClient::new(transport, session);
//!
//! if client.login("ada@example.com", "hunter22").await.ok {
//!     router.handle_location("#/tasks");
//! }
//! # }
//! ```

pub mod api;
pub mod error;
pub mod router;
pub mod session;
pub mod templates;

pub use api::{ApiClient, ApiResponse};
pub use error::{ClientError, ClientResult};
pub use session::ClientSession;
