//! The request dispatcher
//!
//! [`TaskpadServer`] is the in-process "server": it owns the auth service and
//! the task store and turns an [`ApiRequest`] into an [`Envelope`]. Dispatch
//! is synchronous and stateless per call.
//!
//! # Routing
//!
//! ```text
//! POST   /auth/register   public
//! POST   /auth/login      public
//! POST   /auth/logout     public (token optional)
//! GET    /auth/me         protected
//! GET    /tasks           protected
//! POST   /tasks           protected
//! GET    /tasks/{id}      protected, owner only
//! PUT    /tasks/{id}      protected, owner only
//! DELETE /tasks/{id}      protected, owner only
//! ```
//!
//! Anything that is not a public route is authenticated *before* it is
//! matched, so an unknown path without a valid token is a 401, not a 404.
//! Paths may carry an `/api` prefix, a trailing slash or a query string.
//!
//! # Example
//!
//! ```
//! use axum::http::Method;
//! use serde_json::json;
//! use taskpad_api::server::{ApiRequest, TaskpadServer};
//!
//! let server = TaskpadServer::in_memory();
//!
//! let envelope = server.dispatch(ApiRequest::new(Method::GET, "/api/tasks"));
//! assert_eq!(envelope.status, 401);
//!
//! let envelope = server.dispatch(
//!     ApiRequest::new(Method::POST, "/api/auth/register").with_body(json!({
//!         "name": "Ada",
//!         "email": "ada@example.com",
//!         "password": "hunter22"
//!     })),
//! );
//! assert_eq!(envelope.status, 201);
//! ```

use crate::{
    config::Config,
    envelope::Envelope,
    error::{ApiError, ApiResult},
    routes,
};
use axum::http::Method;
use serde_json::Value as JsonValue;
use std::sync::Arc;
use taskpad_shared::{
    auth::AuthService,
    models::task::Task,
    storage::{FileStorage, MemoryStorage, Storage},
    store::RecordStore,
};
use tracing::{debug, warn};

/// Prefix under which the endpoints are published to clients
pub const API_PREFIX: &str = "/api";

/// A request as seen by the dispatcher
#[derive(Debug, Clone)]
pub struct ApiRequest {
    pub method: Method,
    pub path: String,
    pub body: Option<JsonValue>,
    pub token: Option<String>,
}

impl ApiRequest {
    /// Request with no body and no token
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            body: None,
            token: None,
        }
    }

    /// Attaches a JSON body
    pub fn with_body(mut self, body: JsonValue) -> Self {
        self.body = Some(body);
        self
    }

    /// Attaches a bearer token
    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    /// Parses request body text
    ///
    /// Empty or whitespace-only text is no body.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::BadRequest` for malformed JSON
    pub fn parse_body(text: &str) -> ApiResult<Option<JsonValue>> {
        if text.trim().is_empty() {
            return Ok(None);
        }

        serde_json::from_str(text)
            .map(Some)
            .map_err(|e| ApiError::BadRequest(format!("Invalid JSON body: {}", e)))
    }
}

/// Strips the query string, the `/api` prefix and trailing slashes
pub fn normalize_path(path: &str) -> String {
    let path = path.split(['?', '#']).next().unwrap_or_default();
    let path = path.strip_prefix(API_PREFIX).unwrap_or(path);
    let trimmed = path.trim_end_matches('/');

    if trimmed.is_empty() {
        "/".to_string()
    } else if trimmed.starts_with('/') {
        trimmed.to_string()
    } else {
        format!("/{}", trimmed)
    }
}

/// In-process server: auth service plus task store
///
/// Cheap to clone; clones share the same storage.
#[derive(Clone)]
pub struct TaskpadServer {
    auth: AuthService,
    tasks: RecordStore<Task>,
}

impl TaskpadServer {
    /// Creates a server over explicit storages
    ///
    /// `data` holds the durable `users`/`tasks` collections and `sessions`
    /// holds token mappings; pass an ephemeral storage for the latter.
    pub fn new(data: Arc<dyn Storage>, sessions: Arc<dyn Storage>) -> Self {
        Self {
            auth: AuthService::new(Arc::clone(&data), sessions),
            tasks: RecordStore::new(data),
        }
    }

    /// Server whose data and sessions both live in memory
    pub fn in_memory() -> Self {
        Self::new(Arc::new(MemoryStorage::new()), Arc::new(MemoryStorage::new()))
    }

    /// Builds the server described by `config`
    ///
    /// Data persists under `config.storage.data_dir` when set; sessions are
    /// always in memory.
    pub fn from_config(config: &Config) -> anyhow::Result<Self> {
        let data: Arc<dyn Storage> = match &config.storage.data_dir {
            Some(dir) => Arc::new(FileStorage::open(dir)?),
            None => Arc::new(MemoryStorage::new()),
        };

        Ok(Self::new(data, Arc::new(MemoryStorage::new())))
    }

    /// Auth service
    pub fn auth(&self) -> &AuthService {
        &self.auth
    }

    /// Task store
    pub fn tasks(&self) -> &RecordStore<Task> {
        &self.tasks
    }

    /// Dispatches one request; never fails, every outcome is an envelope
    pub fn dispatch(&self, request: ApiRequest) -> Envelope {
        let method = request.method.clone();
        let path = normalize_path(&request.path);

        let envelope = self
            .route(request, &path)
            .unwrap_or_else(ApiError::into_envelope);

        debug!(%method, %path, status = envelope.status, "Dispatched request");
        envelope
    }

    /// Resolves the caller or rejects with 401
    fn authenticate(&self, token: Option<&str>) -> ApiResult<String> {
        let Some(token) = token.map(str::trim).filter(|t| !t.is_empty()) else {
            warn!("Rejected request without token");
            return Err(ApiError::Unauthorized("Authentication required".to_string()));
        };

        self.auth.verify_auth(token)?.ok_or_else(|| {
            warn!("Rejected request with unknown token");
            ApiError::Unauthorized("Invalid or expired token".to_string())
        })
    }

    fn route(&self, request: ApiRequest, path: &str) -> ApiResult<Envelope> {
        let segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();

        match (&request.method, segments.as_slice()) {
            (&Method::POST, ["auth", "register"]) => {
                return routes::auth::register(self, request.body)
            }
            (&Method::POST, ["auth", "login"]) => return routes::auth::login(self, request.body),
            (&Method::POST, ["auth", "logout"]) => {
                return routes::auth::logout(self, request.token.as_deref())
            }
            _ => {}
        }

        let user_id = self.authenticate(request.token.as_deref())?;

        match (&request.method, segments.as_slice()) {
            (&Method::GET, ["auth", "me"]) => routes::auth::me(self, &user_id),
            (&Method::GET, ["tasks"]) => routes::tasks::list_tasks(self, &user_id),
            (&Method::POST, ["tasks"]) => routes::tasks::create_task(self, &user_id, request.body),
            (&Method::GET, ["tasks", task_id]) => routes::tasks::get_task(self, &user_id, task_id),
            (&Method::PUT, ["tasks", task_id]) => {
                routes::tasks::update_task(self, &user_id, task_id, request.body)
            }
            (&Method::DELETE, ["tasks", task_id]) => {
                routes::tasks::delete_task(self, &user_id, task_id)
            }
            _ => Err(ApiError::NotFound("Route not found".to_string())),
        }
    }
}
