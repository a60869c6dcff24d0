//! Per-connection handling: framing, classification, persistence, publish.

use chrono::{SecondsFormat, Utc};
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use taplog_classify::{classify, LineFramer};
use taplog_hub::Hub;
use taplog_types::{LogEvent, SourceAddr, SYSTEM_CATEGORY};
use tokio::fs::{File, OpenOptions};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;

/// Builds a [`LogEvent`] from one raw line by running the shared grammar.
fn make_event(raw: String, source: Option<SourceAddr>) -> LogEvent {
    let parsed = classify(&raw);
    LogEvent {
        category: parsed.category,
        secondary_tag: parsed.secondary_tag,
        tertiary_tag: parsed.tertiary_tag,
        message: parsed.message,
        raw,
        source,
        timestamp: Utc::now(),
    }
}

/// Synthesizes a `SYSTEM` lifecycle line for this connection and publishes
/// it. Lifecycle lines go through the same classifier as real traffic but
/// carry no source address and are not written to the connection's file.
fn publish_system(hub: &Hub, source: &SourceAddr, text: &str) {
    let line = format!("[{}] [{}:{}:0] {}", SYSTEM_CATEGORY, source.ip, source.port, text);
    hub.publish(&make_event(line, None));
}

fn now_iso() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Opens this connection's append-only log file.
///
/// Failure is reported but not fatal: persistence and broadcast are two
/// independent best-effort sinks, and the connection keeps publishing even
/// when its file could not be opened.
async fn open_log(log_dir: &Path, source: &SourceAddr) -> Option<File> {
    let path = log_dir.join(format!("{}.log", source.log_file_stem()));
    match OpenOptions::new().create(true).append(true).open(&path).await {
        Ok(file) => Some(file),
        Err(e) => {
            tracing::error!(path = %path.display(), "failed to open connection log: {}", e);
            None
        }
    }
}

/// Appends `line` plus a terminator to the log, flushing immediately so a
/// crash loses at most the line in flight. Write failures are logged and
/// swallowed; the caller publishes regardless.
async fn persist_line(writer: &mut Option<File>, source: &SourceAddr, line: &str) {
    if let Some(file) = writer {
        let result = async {
            file.write_all(line.as_bytes()).await?;
            file.write_all(b"\n").await?;
            file.flush().await
        }
        .await;
        if let Err(e) = result {
            tracing::warn!(source = %source, "failed to append to connection log: {}", e);
        }
    }
}

/// Owns one accepted TCP connection from connect to close.
///
/// Lines are processed strictly sequentially in arrival order; the file is
/// released when this task returns, on every exit path.
pub(crate) async fn handle(
    mut stream: TcpStream,
    peer: SocketAddr,
    hub: Arc<Hub>,
    log_dir: PathBuf,
) {
    let source = SourceAddr::from_socket_addr(peer);
    tracing::info!(source = %source, "sender connected");

    let mut writer = open_log(&log_dir, &source).await;
    publish_system(
        &hub,
        &source,
        &format!("---- Connection from {} at {} ----", source.ip, now_iso()),
    );

    let mut framer = LineFramer::new();
    let mut buf = [0u8; 4096];
    loop {
        match stream.read(&mut buf).await {
            Ok(0) => break,
            Ok(n) => {
                for line in framer.push(&buf[..n]) {
                    tracing::trace!(source = %source, "{}", line);
                    persist_line(&mut writer, &source, &line).await;
                    hub.publish(&make_event(line, Some(source.clone())));
                }
            }
            Err(e) => {
                tracing::warn!(source = %source, "socket error: {}", e);
                publish_system(
                    &hub,
                    &source,
                    &format!("Socket error from {}:{} -> {}", source.ip, source.port, e),
                );
                break;
            }
        }
    }

    if framer.has_pending() {
        // A line must be newline-terminated to be processed; whatever was
        // buffered when the connection closed is discarded.
        tracing::debug!(source = %source, "discarding unterminated trailing bytes");
    }

    publish_system(
        &hub,
        &source,
        &format!(
            "---- Console {} disconnected from log server at {}! ----",
            source.ip,
            now_iso()
        ),
    );
    tracing::info!(source = %source, "sender disconnected");
}
