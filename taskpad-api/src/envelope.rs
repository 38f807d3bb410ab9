//! Uniform response envelope
//!
//! Every dispatched request, successful or not, produces the same JSON shape:
//!
//! ```json
//! { "status": 201, "success": true, "message": "Task created successfully", "data": { ... } }
//! ```
//!
//! `data` is omitted when there is nothing to return. `success` is true
//! exactly when `status` is 2xx.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

/// Response envelope
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Envelope {
    /// HTTP status code
    pub status: u16,

    /// Whether `status` is 2xx
    pub success: bool,

    /// Human-readable message
    pub message: String,

    /// Optional payload
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<JsonValue>,
}

impl Envelope {
    /// Builds an envelope for `status`
    pub fn new(status: StatusCode, message: impl Into<String>, data: Option<JsonValue>) -> Self {
        Self {
            status: status.as_u16(),
            success: status.is_success(),
            message: message.into(),
            data,
        }
    }

    /// 200 with a payload
    pub fn ok(message: impl Into<String>, data: JsonValue) -> Self {
        Self::new(StatusCode::OK, message, Some(data))
    }

    /// 201 with a payload
    pub fn created(message: impl Into<String>, data: JsonValue) -> Self {
        Self::new(StatusCode::CREATED, message, Some(data))
    }

    /// Status as an `http` status code (500 if out of range)
    pub fn status_code(&self) -> StatusCode {
        StatusCode::from_u16(self.status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
    }

    /// Serializes to the wire text
    ///
    /// Falls back to a fixed 500 body if `data` cannot be serialized, so this
    /// never fails.
    pub fn to_json_text(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|e| {
            tracing::error!("Failed to serialize envelope: {}", e);
            r#"{"status":500,"success":false,"message":"An internal error occurred"}"#.to_string()
        })
    }
}

impl IntoResponse for Envelope {
    fn into_response(self) -> Response {
        (self.status_code(), Json(self)).into_response()
    }
}
