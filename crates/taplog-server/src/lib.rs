//! taplog server library logic.

pub mod config;
pub mod ws;

use axum::{routing::get, Extension, Json, Router};
use serde_json::{json, Value};
use std::path::Path;
use std::sync::Arc;
use taplog_hub::Hub;
use tower_http::cors::{Any, CorsLayer};
use tower_http::services::{ServeDir, ServeFile};

/// Application state shared across all request handlers.
#[derive(Clone)]
pub struct AppState {
    /// The broadcast hub viewers subscribe to.
    pub hub: Arc<Hub>,
}

/// Health check handler.
async fn health() -> Json<Value> {
    Json(json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION")
    }))
}

/// Builds the application router with all routes.
pub fn app(state: AppState, static_dir: &str) -> Router {
    let router = Router::new()
        .route("/health", get(health))
        .route("/ws", get(ws::ws_handler));

    // Serve the viewer page and script if the directory exists.
    let router = if Path::new(static_dir).join("index.html").exists() {
        tracing::info!(path = %static_dir, "serving viewer static files");
        let index = ServeFile::new(Path::new(static_dir).join("index.html"));
        router.fallback_service(ServeDir::new(static_dir).fallback(index))
    } else {
        tracing::info!(path = %static_dir, "viewer directory not found, skipping static file serving");
        router
    };

    router
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(Extension(Arc::new(state)))
}
