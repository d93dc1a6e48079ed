//! Engine configuration.
//!
//! Everything here is policy, not semantics: hosts construct a `GridConfig`
//! (or take the defaults) and hand it to the engine at construction time.

use serde::{Deserialize, Serialize};

/// What to do when a pasted block extends past the last existing row.
///
/// This is an explicit choice rather than something inferred from which
/// host hooks happen to be supplied. `AutoGrow` and `Confirm` degrade to
/// `Truncate` when the host cannot append rows.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PasteOverflowPolicy {
    /// Fill what fits, drop the rest silently.
    #[default]
    Truncate,
    /// Grow the data source to fit, then paste.
    AutoGrow,
    /// Surface a confirmation dialog holding the pending paste.
    Confirm,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GridConfig {
    /// Maximum undo/redo entries kept; oldest evicted first.
    pub max_history: usize,

    /// Rapid-fire edits to the same cell within this window merge into one
    /// undo entry.
    pub coalesce_window_ms: u64,

    /// Paste-overflow behavior.
    pub paste_overflow: PasteOverflowPolicy,

    /// Bounded poll waiting for the row model to reflect appended rows.
    pub grow_poll_attempts: u32,
    pub grow_poll_delay_ms: u64,

    /// Page step when the virtualizer cannot report its visible row count.
    pub page_fallback_rows: usize,

    /// Right-to-left layout: physical left/right arrows swap relative to
    /// the logical column order.
    pub right_to_left: bool,
}

impl Default for GridConfig {
    fn default() -> Self {
        Self {
            max_history: 100,
            coalesce_window_ms: 300,
            paste_overflow: PasteOverflowPolicy::default(),
            grow_poll_attempts: 10,
            grow_poll_delay_ms: 50,
            page_fallback_rows: 10,
            right_to_left: false,
        }
    }
}
