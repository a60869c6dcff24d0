//! Line framing and classification for the taplog pipeline.
//!
//! Two pure pieces live here:
//!
//! - [`LineFramer`] reassembles discrete text lines from arbitrary byte
//!   chunks arriving on a TCP connection.
//! - [`classify`] parses a line into `{category, secondary_tag,
//!   tertiary_tag, message}` using the fixed bracket-prefix grammar.
//!
//! The classifier is deliberately the *only* implementation of the grammar
//! in the workspace: the ingestion side and the viewer render pipeline both
//! call it, so server-side and client-side classification can never drift.

mod framer;
mod grammar;

pub use framer::LineFramer;
pub use grammar::{classify, try_classify, Classified};
