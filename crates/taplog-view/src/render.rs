//! Token highlighting for display.

use regex::Regex;
use std::sync::LazyLock;
use taplog_classify::try_classify;

/// Timestamp-shaped second tags get their own styling class. Detection is
/// cosmetic only; classification never special-cases tag content.
static ISO_SHAPE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\d{4}-\d{2}-\d{2}T\d{2}:\d{2}").expect("iso shape regex is valid"));

/// Escapes text for safe interpolation into HTML. Log content is attacker
/// controlled, so everything rendered goes through here.
pub fn escape_html(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

/// Renders one raw line as HTML token spans.
///
/// Grammar-matching lines get a category span, bracketed second/third tag
/// spans (`token-ts` for timestamp-shaped second tags, `token-meta`
/// otherwise) and a message span. Non-matching lines render as a single
/// message span over the escaped raw text.
pub fn highlight_line(raw: &str) -> String {
    let Some(parts) = try_classify(raw) else {
        return format!(r#"<span class="token-msg">{}</span>"#, escape_html(raw));
    };

    let cat_span = if parts.category.is_empty() {
        String::new()
    } else {
        format!(
            r#"<span class="token-cat">{}</span>"#,
            escape_html(&parts.category)
        )
    };

    let g2_span = match parts.secondary_tag.as_deref() {
        Some(tag) if !tag.is_empty() => {
            let class = if ISO_SHAPE_RE.is_match(tag) {
                "token-ts"
            } else {
                "token-meta"
            };
            format!(r#"<span class="{}">[{}]</span>"#, class, escape_html(tag))
        }
        _ => String::new(),
    };

    let g3_span = match parts.tertiary_tag.as_deref() {
        Some(tag) if !tag.is_empty() => {
            format!(r#"<span class="token-meta">[{}]</span>"#, escape_html(tag))
        }
        _ => String::new(),
    };

    let msg_span = if parts.message.is_empty() {
        String::new()
    } else {
        format!(
            r#"<span class="token-msg">{}</span>"#,
            escape_html(&parts.message)
        )
    };

    format!("{}{}{} {}", cat_span, g2_span, g3_span, msg_span)
        .trim()
        .to_string()
}
