//! Unit tests for the viewer state reducer and render pipeline.

use crate::{highlight_line, MasterToggle, ViewerState, MAX_LINES};
use chrono::Utc;
use taplog_classify::classify;
use taplog_types::LogEvent;

fn event(raw: &str) -> LogEvent {
    let parsed = classify(raw);
    LogEvent {
        raw: raw.to_string(),
        category: parsed.category,
        secondary_tag: parsed.secondary_tag,
        tertiary_tag: parsed.tertiary_tag,
        message: parsed.message,
        source: None,
        timestamp: Utc::now(),
    }
}

// ── reducer tests ────────────────────────────────────────────────────

#[test]
fn buffer_evicts_oldest_beyond_cap() {
    let mut state = ViewerState::new();
    for i in 0..=MAX_LINES {
        state.apply(&event(&format!("[Load] line {}", i)));
    }

    assert_eq!(state.len(), MAX_LINES);
    let visible = state.visible_lines();
    assert_eq!(visible.first().copied(), Some("[Load] line 1"));
    assert_eq!(
        visible.last().copied(),
        Some(format!("[Load] line {}", MAX_LINES).as_str())
    );
}

#[test]
fn category_toggle_off_then_on_restores_visible_set() {
    let mut state = ViewerState::new();
    state.apply(&event("[A] one"));
    state.apply(&event("[B] two"));
    state.apply(&event("[A] three"));

    let before: Vec<String> = state.visible_lines().iter().map(|s| s.to_string()).collect();

    state.set_category_visible("A", false);
    assert_eq!(state.visible_lines(), ["[B] two"]);

    state.set_category_visible("A", true);
    let after: Vec<String> = state.visible_lines().iter().map(|s| s.to_string()).collect();
    assert_eq!(before, after);
}

#[test]
fn master_toggle_is_tri_state() {
    let mut state = ViewerState::new();
    assert_eq!(state.master_toggle(), MasterToggle::On);

    state.apply(&event("[A] a"));
    state.apply(&event("[B] b"));
    assert_eq!(state.master_toggle(), MasterToggle::On);

    state.set_category_visible("B", false);
    assert_eq!(state.master_toggle(), MasterToggle::Indeterminate);

    state.set_category_visible("A", false);
    assert_eq!(state.master_toggle(), MasterToggle::Off);

    state.set_master(true);
    assert_eq!(state.master_toggle(), MasterToggle::On);
    assert_eq!(state.visible_lines().len(), 2);
}

#[test]
fn new_category_follows_master_state() {
    let mut state = ViewerState::new();
    state.apply(&event("[A] a"));
    state.set_master(false);

    // Master is fully off: a previously-unseen category arrives hidden.
    state.apply(&event("[New] hidden"));
    assert!(state.visible_lines().is_empty());

    state.set_master(true);
    // Indeterminate (not all on) also means unchecked master: still hidden.
    state.set_category_visible("A", false);
    state.apply(&event("[Later] also hidden"));
    assert_eq!(state.visible_lines(), ["[New] hidden"]);
}

#[test]
fn filter_matches_raw_case_insensitively() {
    let mut state = ViewerState::new();
    state.apply(&event("[Auth] User LOGIN ok"));
    state.apply(&event("[Auth] heartbeat"));

    state.set_filter("login");
    assert_eq!(state.visible_lines(), ["[Auth] User LOGIN ok"]);
}

#[test]
fn invalid_filter_regex_is_treated_as_no_filter() {
    let mut state = ViewerState::new();
    state.apply(&event("[A] one"));
    state.apply(&event("[B] two"));

    state.set_filter("[unclosed");
    assert_eq!(state.visible_lines().len(), 2);
}

#[test]
fn sidebar_search_hides_rows_without_touching_toggles() {
    let mut state = ViewerState::new();
    state.apply(&event("[AuthService] a"));
    state.apply(&event("[Renderer] b"));
    state.set_category_visible("Renderer", false);

    let rows = state.category_rows("auth");
    let auth = rows.iter().find(|r| r.name == "AuthService").unwrap();
    let renderer = rows.iter().find(|r| r.name == "Renderer").unwrap();

    assert!(auth.row_visible);
    assert!(!renderer.row_visible);
    // Checked state is exactly what it was before the search.
    assert!(auth.visible);
    assert!(!renderer.visible);
}

#[test]
fn clear_empties_buffer_but_keeps_categories() {
    let mut state = ViewerState::new();
    state.apply(&event("[A] a"));
    state.set_category_visible("A", false);

    state.clear();
    assert!(state.is_empty());

    let rows = state.category_rows("");
    assert_eq!(rows.len(), 1);
    assert!(!rows[0].visible, "toggle state survives a clear");
}

#[test]
fn paused_state_drops_events() {
    let mut state = ViewerState::new();
    state.set_paused(true);
    assert!(!state.apply(&event("[A] dropped")));
    assert!(state.is_empty());

    state.set_paused(false);
    assert!(state.apply(&event("[A] kept")));
    assert_eq!(state.len(), 1);
}

#[test]
fn empty_string_category_is_its_own_row() {
    let mut state = ViewerState::new();
    state.apply(&event("[] bare"));

    let rows = state.category_rows("");
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].name, "");
    assert_eq!(state.visible_lines(), ["[] bare"]);
}

// ── render tests ─────────────────────────────────────────────────────

#[test]
fn script_tags_in_log_content_are_escaped() {
    let mut state = ViewerState::new();
    state.apply(&event("[XSS] <script>alert(1)</script>"));

    let rendered = state.render();
    assert_eq!(rendered.len(), 1);
    assert!(rendered[0].contains("&lt;script&gt;"));
    assert!(!rendered[0].contains("<script>"));
}

#[test]
fn highlight_emits_token_spans_for_each_part() {
    let html = highlight_line("[Auth] [2024-01-01T00:00:00Z] [auth.go:Login:42] user logged in");
    assert!(html.contains(r#"<span class="token-cat">Auth</span>"#));
    assert!(html.contains(r#"<span class="token-ts">[2024-01-01T00:00:00Z]</span>"#));
    assert!(html.contains(r#"<span class="token-meta">[auth.go:Login:42]</span>"#));
    assert!(html.contains(r#"<span class="token-msg">user logged in</span>"#));
}

#[test]
fn non_timestamp_second_tag_uses_meta_class() {
    let html = highlight_line("[Auth] [session-9] detail");
    assert!(html.contains(r#"<span class="token-meta">[session-9]</span>"#));
    assert!(!html.contains("token-ts"));
}

#[test]
fn unmatched_line_renders_as_single_message_span() {
    let html = highlight_line("plain & <unbracketed>");
    assert_eq!(
        html,
        r#"<span class="token-msg">plain &amp; &lt;unbracketed&gt;</span>"#
    );
}
