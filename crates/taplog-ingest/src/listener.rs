//! The ingestion accept loop.

use crate::connection;
use std::path::PathBuf;
use std::sync::Arc;
use taplog_hub::Hub;
use tokio::net::TcpListener;

/// Runs the ingestion accept loop on an already-bound listener.
///
/// Binding is the caller's problem so that a bad port is a startup failure,
/// not something discovered mid-run. Each accepted connection is handled by
/// its own spawned task; accept errors are logged and the loop keeps going.
pub async fn run(listener: TcpListener, hub: Arc<Hub>, log_dir: PathBuf) {
    loop {
        match listener.accept().await {
            Ok((stream, peer)) => {
                let hub = hub.clone();
                let log_dir = log_dir.clone();
                tokio::spawn(async move {
                    connection::handle(stream, peer, hub, log_dir).await;
                });
            }
            Err(e) => {
                tracing::warn!("failed to accept ingest connection: {}", e);
            }
        }
    }
}
