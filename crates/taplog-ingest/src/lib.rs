//! TCP ingestion: accepting sender connections and turning their byte
//! streams into classified, persisted, broadcast log events.
//!
//! Each accepted connection gets its own task that runs the line framer,
//! classifies every complete line, appends it to a per-connection log file
//! and publishes the resulting event to the hub. Connections are fully
//! independent: the hub's publish path is the only shared state, and a
//! failure on one connection never affects the listener or its peers.

mod connection;
mod listener;

pub use listener::run;

/// Errors from the ingestion listener.
#[derive(Debug, thiserror::Error)]
pub enum IngestError {
    /// The listener socket failed.
    #[error("ingest listener error: {0}")]
    Io(#[from] std::io::Error),
}
