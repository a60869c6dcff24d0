//! Shared data model for the taplog pipeline.
//!
//! [`LogEvent`] is the immutable record produced by the ingestion side for
//! every accepted log line and consumed by the hub, the viewer sessions and
//! the render pipeline. [`SourceAddr`] identifies the originating TCP
//! connection; it doubles as the key for the per-connection log file.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::net::{IpAddr, SocketAddr};

/// The category attached to a line when the bracket grammar does not match.
pub const UNCATEGORIZED: &str = "uncategorized";

/// Category used for locally-synthesized connection lifecycle lines.
pub const SYSTEM_CATEGORY: &str = "SYSTEM";

/// Origin of a TCP connection: normalised IP text plus remote port.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SourceAddr {
    pub ip: String,
    pub port: u16,
}

impl SourceAddr {
    /// Builds a `SourceAddr` from an accepted socket's peer address.
    ///
    /// IPv4-mapped IPv6 addresses (`::ffff:a.b.c.d`) are normalised to their
    /// dotted-quad form so that the same client always maps to the same
    /// identity and log file name regardless of listener socket family.
    pub fn from_socket_addr(addr: SocketAddr) -> Self {
        let ip = match addr.ip() {
            IpAddr::V6(v6) => match v6.to_ipv4_mapped() {
                Some(v4) => v4.to_string(),
                None => v6.to_string(),
            },
            IpAddr::V4(v4) => v4.to_string(),
        };
        Self {
            ip,
            port: addr.port(),
        }
    }

    /// File stem used for this connection's durable log: `{ip}_{port}`.
    pub fn log_file_stem(&self) -> String {
        format!("{}_{}", self.ip, self.port)
    }
}

impl std::fmt::Display for SourceAddr {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.ip, self.port)
    }
}

/// One classified, timestamped log line plus its origin metadata.
///
/// `category` is never absent: it is either the content of the line's first
/// bracket tag (which may be the literal empty string for a `[] message`
/// line) or [`UNCATEGORIZED`] when the grammar did not match at all.
/// `source` is `None` for synthesized `SYSTEM` lifecycle events.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogEvent {
    /// Original line text, unmodified. Viewers re-parse and highlight this.
    pub raw: String,
    pub category: String,
    pub secondary_tag: Option<String>,
    pub tertiary_tag: Option<String>,
    /// Trailing free text after all recognised bracket tags, trimmed.
    pub message: String,
    pub source: Option<SourceAddr>,
    pub timestamp: DateTime<Utc>,
}
