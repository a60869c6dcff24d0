//! The bracket-tag line grammar.

use regex::Regex;
use std::sync::LazyLock;
use taplog_types::UNCATEGORIZED;

/// A line is optionally prefixed by up to three `[content]` tags separated
/// by optional whitespace, followed by free text. The second tag is commonly
/// an ISO-8601 timestamp and the third a `file:function:line` locator, but
/// the grammar does not special-case their content.
static LINE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^\s*\[(?P<cat>[^\]]*)\]\s*(?:\[(?P<g2>[^\]]*)\]\s*)?(?:\[(?P<g3>[^\]]*)\]\s*)?(?P<msg>.*)$",
    )
    .expect("line grammar regex is valid")
});

/// The parsed parts of one log line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Classified {
    pub category: String,
    pub secondary_tag: Option<String>,
    pub tertiary_tag: Option<String>,
    pub message: String,
}

/// Parses `line` against the bracket grammar, or `None` when the line has
/// no leading bracket tag at all. Render layers use this directly: a
/// non-matching line is displayed as one plain message span, which is a
/// different thing from a line whose first tag happens to read
/// `[uncategorized]`.
pub fn try_classify(line: &str) -> Option<Classified> {
    LINE_RE.captures(line).map(|caps| Classified {
        category: caps["cat"].to_string(),
        secondary_tag: caps.name("g2").map(|m| m.as_str().to_string()),
        tertiary_tag: caps.name("g3").map(|m| m.as_str().to_string()),
        message: caps
            .name("msg")
            .map(|m| m.as_str().trim().to_string())
            .unwrap_or_default(),
    })
}

/// Parses `line` against the bracket grammar.
///
/// When the grammar matches, `category` is the first tag's content — kept
/// as-is even when it is the empty string (`"[] message"` lines keep their
/// literal empty category rather than falling back to the sentinel). When
/// the grammar does not match at all, `category` is `"uncategorized"` and
/// `message` is the trimmed raw line.
pub fn classify(line: &str) -> Classified {
    try_classify(line).unwrap_or_else(|| Classified {
        category: UNCATEGORIZED.to_string(),
        secondary_tag: None,
        tertiary_tag: None,
        message: line.trim().to_string(),
    })
}
