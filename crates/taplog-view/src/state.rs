//! Viewer state and the event reducer.

use crate::render::highlight_line;
use regex::{Regex, RegexBuilder};
use std::collections::VecDeque;
use taplog_classify::classify;
use taplog_types::LogEvent;

/// Maximum number of retained lines; oldest are evicted first beyond this.
pub const MAX_LINES: usize = 3000;

/// The three states of the "show all" master checkbox.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MasterToggle {
    On,
    Off,
    Indeterminate,
}

/// One row of the category sidebar, as the render layer should display it.
///
/// `row_visible` reflects the sidebar search box only; it never implies
/// anything about `visible`, which is the category's filtering toggle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategoryRow {
    pub name: String,
    pub visible: bool,
    pub row_visible: bool,
}

#[derive(Debug)]
struct BufferedLine {
    raw: String,
    category: String,
}

#[derive(Debug)]
struct CategoryEntry {
    name: String,
    visible: bool,
}

/// Client-side viewer state: bounded line buffer, category toggles, text
/// filter, pause and autoscroll flags.
///
/// Categories keep their insertion order (the order the stream introduced
/// them), matching how the sidebar grows.
#[derive(Debug, Default)]
pub struct ViewerState {
    lines: VecDeque<BufferedLine>,
    categories: Vec<CategoryEntry>,
    filter: String,
    paused: bool,
    autoscroll: bool,
}

impl ViewerState {
    pub fn new() -> Self {
        Self {
            autoscroll: true,
            ..Self::default()
        }
    }

    /// Folds one incoming event into the state.
    ///
    /// Returns `true` when the state changed (a re-render is due). Events
    /// arriving while paused are dropped entirely. The category is
    /// recomputed from `raw` with the shared grammar; the event's own
    /// category field is not trusted for display decisions.
    pub fn apply(&mut self, event: &LogEvent) -> bool {
        if self.paused {
            return false;
        }

        let category = classify(&event.raw).category;
        self.ensure_category(&category);

        self.lines.push_back(BufferedLine {
            raw: event.raw.clone(),
            category,
        });
        while self.lines.len() > MAX_LINES {
            self.lines.pop_front();
        }
        true
    }

    /// Registers a category if unseen. New categories default to the
    /// current master-checkbox state, so a stream that introduces a new
    /// category stays consistent with what the user asked for globally.
    fn ensure_category(&mut self, name: &str) {
        if self.categories.iter().any(|c| c.name == name) {
            return;
        }
        let visible = self.master_checked();
        self.categories.push(CategoryEntry {
            name: name.to_string(),
            visible,
        });
    }

    /// The master checkbox's `checked` property: true iff every category is
    /// visible (vacuously true with no categories yet).
    fn master_checked(&self) -> bool {
        self.categories.iter().all(|c| c.visible)
    }

    /// Tri-state of the master toggle: fully on iff all categories are
    /// visible, fully off iff none are, indeterminate otherwise.
    pub fn master_toggle(&self) -> MasterToggle {
        if self.categories.is_empty() {
            return MasterToggle::On;
        }
        let on = self.categories.iter().filter(|c| c.visible).count();
        if on == self.categories.len() {
            MasterToggle::On
        } else if on == 0 {
            MasterToggle::Off
        } else {
            MasterToggle::Indeterminate
        }
    }

    /// Forces every category to match the master toggle.
    pub fn set_master(&mut self, visible: bool) {
        for category in &mut self.categories {
            category.visible = visible;
        }
    }

    /// Sets one category's visibility. Unknown names are ignored.
    pub fn set_category_visible(&mut self, name: &str, visible: bool) {
        if let Some(category) = self.categories.iter_mut().find(|c| c.name == name) {
            category.visible = visible;
        }
    }

    /// Sidebar rows under the given search query. The query only controls
    /// row display in the list; checked state is untouched.
    pub fn category_rows(&self, query: &str) -> Vec<CategoryRow> {
        let query = query.trim().to_lowercase();
        self.categories
            .iter()
            .map(|c| CategoryRow {
                name: c.name.clone(),
                visible: c.visible,
                row_visible: query.is_empty() || c.name.to_lowercase().contains(&query),
            })
            .collect()
    }

    /// Sets the free-text filter. Interpreted as a case-insensitive regex
    /// at render time; invalid patterns behave as no filter at all.
    pub fn set_filter(&mut self, filter: impl Into<String>) {
        self.filter = filter.into();
    }

    pub fn set_paused(&mut self, paused: bool) {
        self.paused = paused;
    }

    pub fn paused(&self) -> bool {
        self.paused
    }

    pub fn set_autoscroll(&mut self, autoscroll: bool) {
        self.autoscroll = autoscroll;
    }

    /// Whether the DOM layer should scroll to the bottom after a render.
    /// The scroll must run only after layout has settled.
    pub fn should_autoscroll(&self) -> bool {
        self.autoscroll
    }

    /// Empties the line buffer. Categories and their toggles persist.
    pub fn clear(&mut self) {
        self.lines.clear();
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    fn filter_regex(&self) -> Option<Regex> {
        let pattern = self.filter.trim();
        if pattern.is_empty() {
            return None;
        }
        RegexBuilder::new(pattern)
            .case_insensitive(true)
            .build()
            .ok()
    }

    /// The raw lines currently visible: category toggled on, and matching
    /// the filter regex when one is in effect.
    pub fn visible_lines(&self) -> Vec<&str> {
        let regex = self.filter_regex();
        self.lines
            .iter()
            .filter(|line| {
                self.categories
                    .iter()
                    .any(|c| c.name == line.category && c.visible)
            })
            .filter(|line| match &regex {
                Some(re) => re.is_match(&line.raw),
                None => true,
            })
            .map(|line| line.raw.as_str())
            .collect()
    }

    /// Pure render: the visible lines in buffer order, highlighted as
    /// HTML-escaped token spans.
    pub fn render(&self) -> Vec<String> {
        self.visible_lines()
            .into_iter()
            .map(highlight_line)
            .collect()
    }
}
