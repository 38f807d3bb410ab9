//! Client error types
//!
//! Request outcomes never surface as errors; they are folded into
//! [`ApiResponse`](crate::api::ApiResponse). These cover the local concerns
//! of the shell: loading view templates and persisting the session.

use std::path::PathBuf;
use taskpad_shared::storage::StorageError;

/// Client error type
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    /// Template directory or file could not be read
    #[error("Failed to read template {path}: {source}")]
    Template {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Session could not be mirrored to storage
    #[error("Failed to persist session: {0}")]
    Session(#[from] StorageError),

    /// Session user could not be serialized
    #[error("Failed to serialize session user: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Client result type alias
pub type ClientResult<T> = Result<T, ClientError>;
