//! The viewer render pipeline as a pure, synchronous core.
//!
//! [`ViewerState`] is the reducer: it owns the bounded line buffer, the
//! per-category visibility toggles, the free-text filter and the
//! pause/autoscroll flags, and folds incoming events into that state.
//! [`ViewerState::render`] is the matching pure function from state to the
//! highlighted visible lines. DOM concerns (checkbox wiring, scroll calls)
//! stay outside; the browser script shipped with the server reproduces this
//! exact algorithm over the WebSocket frames.

mod render;
mod state;

pub use render::{escape_html, highlight_line};
pub use state::{CategoryRow, MasterToggle, ViewerState, MAX_LINES};

#[cfg(test)]
mod tests;
