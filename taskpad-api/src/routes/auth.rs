//! Authentication endpoints
//!
//! # Endpoints
//!
//! - `POST /auth/register` - Register new user (public)
//! - `POST /auth/login` - Login and get a session token (public)
//! - `POST /auth/logout` - End the current session (public, idempotent)
//! - `GET /auth/me` - Current user (protected)

use super::decode_body;
use crate::{
    envelope::Envelope,
    error::{ApiError, ApiResult},
    server::TaskpadServer,
};
use axum::http::StatusCode;
use serde_json::Value as JsonValue;
use taskpad_shared::auth::{LoginRequest, RegisterRequest};

/// Register a new user
///
/// # Request
///
/// ```json
/// { "name": "Ada", "email": "ada@example.com", "password": "hunter22" }
/// ```
///
/// # Response
///
/// `201` with the public user (`id`, `name`, `email`).
///
/// # Errors
///
/// - `400 Bad Request`: missing field or malformed email
/// - `409 Conflict`: email already registered
pub fn register(server: &TaskpadServer, body: Option<JsonValue>) -> ApiResult<Envelope> {
    let req: RegisterRequest = decode_body(body)?;
    let user = server.auth().register(req)?;

    Ok(Envelope::created(
        "User registered successfully",
        serde_json::to_value(user)?,
    ))
}

/// Login endpoint
///
/// # Response
///
/// ```json
/// {
///   "status": 200,
///   "success": true,
///   "message": "Login successful",
///   "data": { "token": "tp_...", "user": { "id": "...", "name": "Ada", "email": "ada@example.com" } }
/// }
/// ```
///
/// # Errors
///
/// - `400 Bad Request`: missing email or password
/// - `401 Unauthorized`: unknown email or wrong password (same message)
pub fn login(server: &TaskpadServer, body: Option<JsonValue>) -> ApiResult<Envelope> {
    let req: LoginRequest = decode_body(body)?;
    let session = server.auth().login(req)?;

    Ok(Envelope::ok("Login successful", serde_json::to_value(session)?))
}

/// Logout endpoint
///
/// Always succeeds, with or without a (valid) token.
pub fn logout(server: &TaskpadServer, token: Option<&str>) -> ApiResult<Envelope> {
    if let Some(token) = token {
        server.auth().logout(token)?;
    }

    Ok(Envelope::new(StatusCode::OK, "Logged out successfully", None))
}

/// Current user endpoint
///
/// # Errors
///
/// - `404 Not Found`: the session outlived its user record
pub fn me(server: &TaskpadServer, user_id: &str) -> ApiResult<Envelope> {
    let user = server
        .auth()
        .users()
        .get_by_id(user_id)?
        .ok_or_else(|| ApiError::NotFound("User not found".to_string()))?;

    Ok(Envelope::ok(
        "User retrieved successfully",
        serde_json::to_value(user.to_public())?,
    ))
}
