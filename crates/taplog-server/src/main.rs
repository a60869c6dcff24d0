//! taplog server binary — TCP log ingestion plus the live viewer UI.
//!
//! Starts the TCP ingestion listener and an axum HTTP server (WebSocket
//! fan-out + static viewer assets) wired through one shared hub, with
//! structured logging and graceful shutdown on SIGTERM/SIGINT.

use std::net::SocketAddr;
use std::sync::Arc;
use taplog_hub::Hub;
use taplog_server::{app, config, AppState};
use tokio::net::TcpListener;
use tracing_subscriber::EnvFilter;

fn resolve_config_path() -> (Option<String>, &'static str) {
    if let Some(path) = std::env::args()
        .nth(1)
        .filter(|value| !value.trim().is_empty())
    {
        return (Some(path), "cli-arg");
    }

    if let Ok(path) = std::env::var("TAPLOG_CONFIG_PATH") {
        if !path.trim().is_empty() {
            return (Some(path), "env-var");
        }
    }

    (None, "default")
}

#[tokio::main]
async fn main() {
    let (resolved_config_path, config_source) = resolve_config_path();
    let selected_config_path = resolved_config_path.as_deref().or(Some("config.toml"));

    // Load configuration
    let config = config::load_config(selected_config_path)
        .expect("failed to load configuration — the server cannot start without valid config");

    // Initialize tracing
    let filter =
        EnvFilter::try_new(&config.logging.level).unwrap_or_else(|_| EnvFilter::new("info"));

    if config.logging.json {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .json()
            .init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }

    tracing::info!(
        source = config_source,
        path = selected_config_path.unwrap_or("<none>"),
        "resolved startup configuration path"
    );

    let log_dir = std::path::PathBuf::from(&config.storage.log_dir);
    tokio::fs::create_dir_all(&log_dir)
        .await
        .expect("failed to create log directory — check storage.log_dir in config");

    let hub = Arc::new(Hub::new());

    // Bind both listeners before serving anything: a bad port is a startup
    // failure, not something discovered once senders are already talking.
    let ingest_addr = SocketAddr::new(config.ingest.host, config.ingest.port);
    let ingest_listener = TcpListener::bind(ingest_addr)
        .await
        .expect("failed to bind ingest port — is another process using it?");
    tracing::info!(addr = %ingest_addr, "TCP ingest listening");

    let web_addr = SocketAddr::new(config.web.host, config.web.port);
    let web_listener = TcpListener::bind(web_addr)
        .await
        .expect("failed to bind web port — is another process using it?");
    tracing::info!(addr = %web_addr, "web UI listening");

    tokio::spawn(taplog_ingest::run(ingest_listener, hub.clone(), log_dir));

    let app = app(AppState { hub }, &config.storage.static_dir);

    axum::serve(
        web_listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await
    .expect("server error");

    tracing::info!("taplog server shut down");
}

/// Waits for a SIGINT (Ctrl+C) or SIGTERM signal for graceful shutdown.
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => { tracing::info!("received SIGINT, initiating graceful shutdown"); }
        () = terminate => { tracing::info!("received SIGTERM, initiating graceful shutdown"); }
    }
}
