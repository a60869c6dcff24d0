//! Byte-stream to line reassembly.

/// Splits arbitrary byte chunks into complete text lines.
///
/// A line boundary is `\n` or `\r\n`. Bytes after the last terminator in a
/// chunk are retained as a pending prefix and completed by later chunks, so
/// a line (or a multi-byte UTF-8 sequence) split across reads is handled
/// transparently — decoding only ever happens on complete lines. Lines that
/// are empty or whitespace-only after trimming are dropped.
#[derive(Debug, Default)]
pub struct LineFramer {
    pending: Vec<u8>,
}

impl LineFramer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feeds one chunk and returns the complete lines it finished, in order.
    ///
    /// Returned lines carry neither terminator; invalid UTF-8 is replaced
    /// lossily.
    pub fn push(&mut self, chunk: &[u8]) -> Vec<String> {
        self.pending.extend_from_slice(chunk);

        let mut lines = Vec::new();
        let mut start = 0;
        while let Some(offset) = self.pending[start..].iter().position(|&b| b == b'\n') {
            let end = start + offset;
            let mut bytes = &self.pending[start..end];
            if bytes.last() == Some(&b'\r') {
                bytes = &bytes[..bytes.len() - 1];
            }
            let line = String::from_utf8_lossy(bytes);
            if !line.trim().is_empty() {
                lines.push(line.into_owned());
            }
            start = end + 1;
        }
        self.pending.drain(..start);

        lines
    }

    /// True if a partial line is buffered.
    ///
    /// The pending prefix is never flushed as a line: a line must be
    /// newline-terminated to be processed, so whatever is buffered when the
    /// connection closes is simply discarded with the framer.
    pub fn has_pending(&self) -> bool {
        !self.pending.is_empty()
    }
}
