//! # Taskpad API Server
//!
//! Serves the task dispatcher over HTTP, or runs a scripted in-process demo.
//!
//! ## Usage
//!
//! ```bash
//! cargo run -p taskpad-api              # same as `serve`
//! cargo run -p taskpad-api -- serve
//! cargo run -p taskpad-api -- demo
//! ```

use axum::http::Method;
use clap::{Parser, Subcommand};
use serde_json::{json, Value as JsonValue};
use taskpad_api::{
    app::{build_router, AppState},
    config::Config,
    server::TaskpadServer,
    transport::InProcessTransport,
};
use taskpad_shared::transport::{HttpRequest, Transport};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "taskpad-api", version, about = "Taskpad task server")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Serve the API over HTTP (default)
    Serve,

    /// Run a register / login / create / list flow against an in-memory server
    Demo,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "taskpad_api=debug,taskpad_shared=info,tower_http=debug".into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();

    match cli.command.unwrap_or(Commands::Serve) {
        Commands::Serve => serve().await,
        Commands::Demo => demo().await,
    }
}

async fn serve() -> anyhow::Result<()> {
    tracing::info!(
        "Taskpad API Server v{} starting...",
        env!("CARGO_PKG_VERSION")
    );

    let config = Config::from_env()?;
    let server = TaskpadServer::from_config(&config)?;
    match &config.storage.data_dir {
        Some(dir) => tracing::info!("Persisting data under {}", dir.display()),
        None => tracing::warn!("TASKPAD_DATA_DIR not set; data will not survive a restart"),
    }

    let address = config.bind_address();
    let app = build_router(AppState::new(server, config));

    let listener = tokio::net::TcpListener::bind(&address).await?;
    tracing::info!("Server listening on http://{}", address);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        return;
    }
    tracing::info!("Shutdown signal received, exiting...");
}

async fn demo() -> anyhow::Result<()> {
    let transport = InProcessTransport::new(TaskpadServer::in_memory());

    let registered = call(
        &transport,
        Method::POST,
        "/api/auth/register",
        None,
        Some(json!({ "name": "Demo User", "email": "demo@example.com", "password": "demo-password" })),
    )
    .await?;
    tracing::info!("register -> {}", registered);

    let login = call(
        &transport,
        Method::POST,
        "/api/auth/login",
        None,
        Some(json!({ "email": "demo@example.com", "password": "demo-password" })),
    )
    .await?;
    let token = login["data"]["token"]
        .as_str()
        .ok_or_else(|| anyhow::anyhow!("login returned no token: {}", login))?
        .to_string();
    tracing::info!("login -> token {}", token);

    for (title, category) in [("Write report", "work"), ("Buy groceries", "shopping")] {
        let created = call(
            &transport,
            Method::POST,
            "/api/tasks",
            Some(&token),
            Some(json!({ "title": title, "category": category })),
        )
        .await?;
        tracing::info!("create -> {}", created["data"]);
    }

    let tasks = call(&transport, Method::GET, "/api/tasks", Some(&token), None).await?;
    tracing::info!("list -> {}", serde_json::to_string_pretty(&tasks["data"])?);

    let logout = call(&transport, Method::POST, "/api/auth/logout", Some(&token), None).await?;
    tracing::info!("logout -> {}", logout["message"]);

    let after = call(&transport, Method::GET, "/api/tasks", Some(&token), None).await?;
    tracing::info!("list after logout -> {} {}", after["status"], after["message"]);

    Ok(())
}

async fn call(
    transport: &InProcessTransport,
    method: Method,
    url: &str,
    token: Option<&str>,
    body: Option<JsonValue>,
) -> anyhow::Result<JsonValue> {
    let mut request = HttpRequest::new(method, url).header("Content-Type", "application/json")?;
    if let Some(token) = token {
        request = request.header("Authorization", &format!("Bearer {}", token))?;
    }
    if let Some(body) = body {
        request = request.body(body.to_string());
    }

    let response = transport.send(request).await?;
    Ok(serde_json::from_str(&response.response_text)?)
}
