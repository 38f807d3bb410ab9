//! Route handlers
//!
//! - `auth`: register, login, logout, current user
//! - `tasks`: task CRUD scoped to the authenticated user
//! - `health`: liveness endpoint of the HTTP binding

pub mod auth;
pub mod health;
pub mod tasks;

use crate::error::{ApiError, ApiResult};
use serde::de::DeserializeOwned;
use serde_json::Value as JsonValue;

/// Decodes a request body into `T`; a missing body decodes as `{}`
pub(crate) fn decode_body<T: DeserializeOwned>(body: Option<JsonValue>) -> ApiResult<T> {
    let body = body.unwrap_or_else(|| JsonValue::Object(Default::default()));
    if !body.is_object() {
        return Err(ApiError::BadRequest(
            "Request body must be a JSON object".to_string(),
        ));
    }

    serde_json::from_value(body)
        .map_err(|e| ApiError::BadRequest(format!("Invalid request body: {}", e)))
}
