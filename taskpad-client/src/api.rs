//! API wrapper over a [`Transport`]
//!
//! [`ApiClient::api_request`] never fails: transport errors, unparseable
//! bodies and server rejections are all folded into an [`ApiResponse`].
//! The typed helpers build on it and keep the [`ClientSession`] in step with
//! login and logout.
//!
//! # Example
//!
//! ```no_run
//! use taskpad_client::{api::ApiClient, session::ClientSession};
//! use taskpad_shared::transport::Transport;
//!
//! # async fn example<T: Transport>(client: ApiClient<T>) {
//! let response = client.login("ada@example.com", "hunter22").await;
//! if response.ok {
//!     let tasks = client.list_tasks().await;
//!     println!("{:?}", tasks.data);
//! } else {
//!     println!("login failed: {:?}", response.error);
//! }
//! # }
//! ```

use crate::session::ClientSession;
use axum::http::{header, Method};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use serde_json::{json, Value as JsonValue};
use taskpad_shared::{
    auth::Session,
    models::task::{NewTask, Task},
    transport::{HttpRequest, Transport},
};
use tracing::{debug, warn};

/// Error text when a protected call is attempted without a session
pub const NOT_AUTHENTICATED: &str = "Not authenticated";

/// Error text when the transport could not deliver the request
pub const NETWORK_ERROR: &str = "Network error";

/// Error text when the response body is not an envelope
pub const INVALID_RESPONSE: &str = "Invalid response format";

/// Error text for a rejection that carried no message
pub const REQUEST_FAILED: &str = "Request failed";

/// Normalized outcome of one API call
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiResponse {
    /// True iff the server answered 2xx with a readable envelope
    pub ok: bool,

    /// HTTP status; 0 when the request never completed
    pub status: u16,

    /// Envelope `data` on success, `null` otherwise
    pub data: JsonValue,

    /// Human-readable failure reason
    pub error: Option<String>,
}

impl ApiResponse {
    fn failure(status: u16, error: impl Into<String>) -> Self {
        Self {
            ok: false,
            status,
            data: JsonValue::Null,
            error: Some(error.into()),
        }
    }

    /// Decodes `data` into `T`, or `None` if it does not fit
    pub fn data_as<T: DeserializeOwned>(&self) -> Option<T> {
        serde_json::from_value(self.data.clone()).ok()
    }
}

#[derive(Default, Deserialize)]
struct EnvelopeBody {
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    data: JsonValue,
}

/// API client bound to a transport and a session
pub struct ApiClient<T: Transport> {
    transport: T,
    session: ClientSession,
}

impl<T: Transport> ApiClient<T> {
    pub fn new(transport: T, session: ClientSession) -> Self {
        Self { transport, session }
    }

    /// The session this client reads tokens from and writes logins to
    pub fn session(&self) -> &ClientSession {
        &self.session
    }

    /// The underlying transport
    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Performs one request
    ///
    /// With `auth` set and no session held, resolves immediately to a 401
    /// without touching the transport.
    pub async fn api_request(
        &self,
        method: Method,
        url: &str,
        body: Option<&JsonValue>,
        auth: bool,
    ) -> ApiResponse {
        let token = if auth {
            match self.session.token().filter(|_| self.session.is_logged_in()) {
                Some(token) => Some(token),
                None => return ApiResponse::failure(401, NOT_AUTHENTICATED),
            }
        } else {
            None
        };

        let request = match build_request(method.clone(), url, body, token.as_deref()) {
            Ok(request) => request,
            Err(e) => {
                warn!(%method, url, "Could not build request: {}", e);
                return ApiResponse::failure(0, NETWORK_ERROR);
            }
        };

        let response = match self.transport.send(request).await {
            Ok(response) => response,
            Err(e) => {
                warn!(%method, url, "Transport failed: {}", e);
                return ApiResponse::failure(0, NETWORK_ERROR);
            }
        };
        debug!(%method, url, status = response.status, "API response");

        // A bodiless response carries no message and no data
        let envelope = if response.response_text.trim().is_empty() {
            EnvelopeBody::default()
        } else {
            match serde_json::from_str::<EnvelopeBody>(&response.response_text) {
                Ok(envelope) => envelope,
                Err(_) => return ApiResponse::failure(response.status, INVALID_RESPONSE),
            }
        };

        if response.is_success() {
            ApiResponse {
                ok: true,
                status: response.status,
                data: envelope.data,
                error: None,
            }
        } else {
            let message = envelope
                .message
                .filter(|m| !m.trim().is_empty())
                .unwrap_or_else(|| REQUEST_FAILED.to_string());
            ApiResponse::failure(response.status, message)
        }
    }

    /// `POST /api/auth/register`
    pub async fn register(&self, name: &str, email: &str, password: &str) -> ApiResponse {
        let body = json!({ "name": name, "email": email, "password": password });
        self.api_request(Method::POST, "/api/auth/register", Some(&body), false)
            .await
    }

    /// `POST /api/auth/login`; a successful login replaces the session
    pub async fn login(&self, email: &str, password: &str) -> ApiResponse {
        let body = json!({ "email": email, "password": password });
        let response = self
            .api_request(Method::POST, "/api/auth/login", Some(&body), false)
            .await;

        if response.ok {
            match response.data_as::<Session>() {
                Some(session) => {
                    if let Err(e) = self.session.set(session.token, session.user) {
                        warn!("Session not persisted: {}", e);
                    }
                }
                None => return ApiResponse::failure(response.status, INVALID_RESPONSE),
            }
        }

        response
    }

    /// `POST /api/auth/logout`; the local session is cleared whatever the
    /// server says
    pub async fn logout(&self) -> ApiResponse {
        let response = self
            .api_request(
                Method::POST,
                "/api/auth/logout",
                None,
                self.session.is_logged_in(),
            )
            .await;

        if let Err(e) = self.session.clear() {
            warn!("Session mirror not cleared: {}", e);
        }
        response
    }

    /// `GET /api/auth/me`
    pub async fn current_user(&self) -> ApiResponse {
        self.api_request(Method::GET, "/api/auth/me", None, true).await
    }

    /// `GET /api/tasks`
    pub async fn list_tasks(&self) -> ApiResponse {
        self.api_request(Method::GET, "/api/tasks", None, true).await
    }

    /// `POST /api/tasks`
    pub async fn create_task(&self, task: &NewTask) -> ApiResponse {
        let body = match serde_json::to_value(task) {
            Ok(body) => body,
            Err(e) => return ApiResponse::failure(0, format!("Invalid task: {}", e)),
        };
        self.api_request(Method::POST, "/api/tasks", Some(&body), true)
            .await
    }

    /// `PUT /api/tasks/{id}` with a partial body
    pub async fn update_task(&self, id: &str, changes: &JsonValue) -> ApiResponse {
        self.api_request(Method::PUT, &task_url(id), Some(changes), true)
            .await
    }

    /// Flips `completed` on a task
    ///
    /// Reads the task first, so a missing or foreign task yields the read's
    /// 404/403.
    pub async fn toggle_task(&self, id: &str) -> ApiResponse {
        let current = self
            .api_request(Method::GET, &task_url(id), None, true)
            .await;
        if !current.ok {
            return current;
        }

        let Some(task) = current.data_as::<Task>() else {
            return ApiResponse::failure(current.status, INVALID_RESPONSE);
        };

        self.update_task(id, &json!({ "completed": !task.completed }))
            .await
    }

    /// `DELETE /api/tasks/{id}`
    pub async fn delete_task(&self, id: &str) -> ApiResponse {
        self.api_request(Method::DELETE, &task_url(id), None, true)
            .await
    }
}

fn task_url(id: &str) -> String {
    format!("/api/tasks/{}", id)
}

fn build_request(
    method: Method,
    url: &str,
    body: Option<&JsonValue>,
    token: Option<&str>,
) -> Result<HttpRequest, taskpad_shared::transport::TransportError> {
    let mut request = HttpRequest::new(method, url);

    if let Some(token) = token {
        request = request.header(header::AUTHORIZATION.as_str(), &format!("Bearer {}", token))?;
    }
    if let Some(body) = body {
        request = request
            .header(header::CONTENT_TYPE.as_str(), "application/json")?
            .body(body.to_string());
    }

    Ok(request)
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use parking_lot::Mutex;
    use std::sync::Arc;
    use taskpad_shared::{
        storage::MemoryStorage,
        transport::{HttpResponse, TransportError},
    };

    /// Transport double that records requests and replays a canned outcome
    struct Canned {
        outcome: Result<HttpResponse, TransportError>,
        seen: Arc<Mutex<Vec<HttpRequest>>>,
    }

    #[async_trait]
    impl Transport for Canned {
        async fn send(&self, request: HttpRequest) -> Result<HttpResponse, TransportError> {
            self.seen.lock().push(request);
            self.outcome.clone()
        }
    }

    fn client(
        outcome: Result<HttpResponse, TransportError>,
    ) -> (ApiClient<Canned>, Arc<Mutex<Vec<HttpRequest>>>) {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let transport = Canned {
            outcome,
            seen: Arc::clone(&seen),
        };
        let session = ClientSession::new(Arc::new(MemoryStorage::new()));
        (ApiClient::new(transport, session), seen)
    }

    #[tokio::test]
    async fn test_auth_without_session_short_circuits() {
        let (client, seen) = client(Ok(HttpResponse::new(200, "{}")));

        let response = client.list_tasks().await;

        assert_eq!(
            response,
            ApiResponse {
                ok: false,
                status: 401,
                data: JsonValue::Null,
                error: Some(NOT_AUTHENTICATED.to_string()),
            }
        );
        assert!(seen.lock().is_empty());
    }

    #[tokio::test]
    async fn test_transport_failure_is_status_zero() {
        let (client, _) = client(Err(TransportError::Network("down".to_string())));

        let response = client.register("Ada", "ada@example.com", "pw").await;

        assert!(!response.ok);
        assert_eq!(response.status, 0);
        assert_eq!(response.error.as_deref(), Some(NETWORK_ERROR));
    }

    #[tokio::test]
    async fn test_unparseable_body() {
        let (client, _) = client(Ok(HttpResponse::new(200, "<html>")));

        let response = client.register("Ada", "ada@example.com", "pw").await;

        assert!(!response.ok);
        assert_eq!(response.status, 200);
        assert_eq!(response.error.as_deref(), Some(INVALID_RESPONSE));
    }

    #[tokio::test]
    async fn test_blank_body_follows_status() {
        let (client, _) = client(Ok(HttpResponse::new(204, "")));
        let response = client.register("Ada", "ada@example.com", "pw").await;
        assert!(response.ok);
        assert_eq!(response.status, 204);
        assert_eq!(response.data, JsonValue::Null);
        assert!(response.error.is_none());

        let (client, _) = self::client(Ok(HttpResponse::new(502, "  ")));
        let response = client.register("Ada", "ada@example.com", "pw").await;
        assert!(!response.ok);
        assert_eq!(response.error.as_deref(), Some(REQUEST_FAILED));
    }

    #[tokio::test]
    async fn test_rejection_uses_envelope_message() {
        let (client, _) = client(Ok(HttpResponse::new(
            409,
            r#"{"status":409,"success":false,"message":"Email already registered"}"#,
        )));
        let response = client.register("Ada", "ada@example.com", "pw").await;
        assert_eq!(response.status, 409);
        assert_eq!(response.error.as_deref(), Some("Email already registered"));

        let (client, _) = self::client(Ok(HttpResponse::new(500, "{}")));
        let response = client.register("Ada", "ada@example.com", "pw").await;
        assert_eq!(response.error.as_deref(), Some(REQUEST_FAILED));
    }

    #[tokio::test]
    async fn test_headers_and_body() {
        let (client, seen) = client(Ok(HttpResponse::new(
            200,
            r#"{"status":200,"success":true,"message":"ok","data":[]}"#,
        )));
        client
            .session()
            .set(
                "tp_abc",
                taskpad_shared::models::user::PublicUser {
                    id: "u1".to_string(),
                    name: "Ada".to_string(),
                    email: "ada@example.com".to_string(),
                },
            )
            .unwrap();

        let response = client
            .update_task("t1", &json!({ "completed": true }))
            .await;
        assert!(response.ok);
        assert_eq!(response.data, json!([]));

        let seen = seen.lock();
        let request = &seen[0];
        assert_eq!(request.method, Method::PUT);
        assert_eq!(request.url, "/api/tasks/t1");
        assert_eq!(request.bearer_token(), Some("tp_abc"));
        assert_eq!(
            request.headers.get(header::CONTENT_TYPE).unwrap(),
            "application/json"
        );
        assert_eq!(request.body.as_deref(), Some(r#"{"completed":true}"#));
    }

    #[tokio::test]
    async fn test_logout_clears_session_even_on_failure() {
        let (client, _) = client(Err(TransportError::Network("down".to_string())));
        client
            .session()
            .set(
                "tp_abc",
                taskpad_shared::models::user::PublicUser {
                    id: "u1".to_string(),
                    name: "Ada".to_string(),
                    email: "ada@example.com".to_string(),
                },
            )
            .unwrap();

        let response = client.logout().await;

        assert_eq!(response.status, 0);
        assert!(!client.session().is_logged_in());
    }
}
