/// Application state and router builder
///
/// The HTTP binding is a thin adapter: every request under `/api` is handed
/// to [`TaskpadServer::dispatch`] and the resulting envelope is returned with
/// its status code. Only `/health` is an axum-native route.
///
/// # Example
///
/// ```no_run
/// use taskpad_api::{app::{build_router, AppState}, config::Config, server::TaskpadServer};
///
/// # async fn example() -> anyhow::Result<()> {
/// let config = Config::from_env()?;
/// let server = TaskpadServer::from_config(&config)?;
/// let app = build_router(AppState::new(server, config));
///
/// let listener = tokio::net::TcpListener::bind("127.0.0.1:8080").await?;
/// axum::serve(listener, app).await?;
/// # Ok(())
/// # }
/// ```

use crate::{
    config::Config,
    envelope::Envelope,
    error::ApiError,
    server::{ApiRequest, TaskpadServer},
};
use axum::{
    body::Bytes,
    extract::State,
    http::{header, HeaderMap, HeaderValue, Method, Uri},
    routing::{any, get},
    Router,
};
use std::sync::Arc;
use taskpad_shared::transport::bearer_token;
use tower_http::{
    cors::CorsLayer,
    trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer},
};
use tracing::{error, Level};

/// Shared application state
///
/// Cloned for each request handler via Axum's `State` extractor.
#[derive(Clone)]
pub struct AppState {
    /// The request dispatcher
    pub server: TaskpadServer,

    /// Application configuration
    pub config: Arc<Config>,
}

impl AppState {
    /// Creates new application state
    pub fn new(server: TaskpadServer, config: Config) -> Self {
        Self {
            server,
            config: Arc::new(config),
        }
    }
}

/// Builds the Axum router
///
/// ```text
/// /
/// ├── GET /health        # liveness (public)
/// └── ANY /api/*path     # forwarded to the dispatcher
/// ```
///
/// # Middleware Stack
///
/// 1. Logging (tower-http TraceLayer)
/// 2. CORS (tower-http CorsLayer)
pub fn build_router(state: AppState) -> Router {
    use crate::routes;

    let cors = if state.config.cors_permissive() {
        CorsLayer::permissive()
    } else {
        let origins: Vec<HeaderValue> = state
            .config
            .api
            .cors_origins
            .iter()
            .filter_map(|origin| origin.parse().ok())
            .collect();

        CorsLayer::new()
            .allow_origin(origins)
            .allow_methods([
                Method::GET,
                Method::POST,
                Method::PUT,
                Method::DELETE,
                Method::OPTIONS,
            ])
            .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE])
            .max_age(std::time::Duration::from_secs(3600))
    };

    Router::new()
        .route("/health", get(routes::health::health_check))
        .route("/api", any(dispatch_http))
        .route("/api/*path", any(dispatch_http))
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .layer(cors)
        .with_state(state)
}

/// Forwards an HTTP request to the dispatcher
///
/// Dispatch touches storage and hashes passwords, so it runs on the blocking
/// pool.
async fn dispatch_http(
    State(state): State<AppState>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    body: Bytes,
) -> Envelope {
    let body = match std::str::from_utf8(&body) {
        Ok(text) => match ApiRequest::parse_body(text) {
            Ok(body) => body,
            Err(e) => return e.into_envelope(),
        },
        Err(_) => {
            return ApiError::BadRequest("Request body must be UTF-8".to_string()).into_envelope()
        }
    };

    let request = ApiRequest {
        method,
        path: uri.path().to_string(),
        body,
        token: bearer_token(&headers).map(str::to_string),
    };

    let server = state.server.clone();
    match tokio::task::spawn_blocking(move || server.dispatch(request)).await {
        Ok(envelope) => envelope,
        Err(e) => {
            error!("Dispatch task failed: {}", e);
            ApiError::InternalError(format!("Dispatch task failed: {}", e)).into_envelope()
        }
    }
}
