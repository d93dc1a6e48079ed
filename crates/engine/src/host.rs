//! Collaborator contracts: the tabular data engine, the virtualized row
//! renderer, and the system clipboard.
//!
//! These are explicit trait objects registered at engine construction —
//! never ambient globals. The engine is the only writer of interaction
//! state; the row collection stays externally owned and is only ever
//! replaced wholesale through `RowSource::on_data_change`.

use std::time::Duration;

use gridkit_core::position::RowId;
use gridkit_core::row::RowRef;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ClipboardError {
    #[error("clipboard unavailable")]
    Unavailable,
    #[error("clipboard access denied")]
    Denied,
    #[error("clipboard is empty")]
    Empty,
}

/// Asynchronous-in-spirit plain-text clipboard. Either side may fail
/// (permission denied, empty, unavailable); failures are recovered locally
/// by the engine and surfaced as a transient status notice.
pub trait Clipboard {
    fn read_text(&mut self) -> Result<String, ClipboardError>;
    fn write_text(&mut self, text: &str) -> Result<(), ClipboardError>;
}

/// The external tabular data engine plus its mutation/lifecycle hooks.
pub trait RowSource {
    /// Current row list in display order.
    fn rows(&self) -> Vec<RowRef>;

    /// Full-replacement mutation callback: invoked with a new collection
    /// after any edit, paste, delete-to-empty, or undo/redo. Rows untouched
    /// by the update keep their prior `Arc` identity.
    fn on_data_change(&mut self, rows: Vec<RowRef>);

    /// Whether the data source can grow. Gates paste auto-grow.
    fn can_append_rows(&self) -> bool {
        false
    }

    /// Append `count` blank rows at the end of the data source. The row
    /// model may reflect the growth asynchronously; the engine polls
    /// `rows()` with bounded retries afterwards.
    fn append_rows(&mut self, _count: usize) {}

    /// Whether row deletion is offered at all.
    fn can_delete_rows(&self) -> bool {
        false
    }

    /// Delete the given rows (ids with their current display indices).
    fn delete_rows(&mut self, _ids: &[RowId], _indices: &[usize]) {}

    /// True while a native text input/content-editable/popover has focus;
    /// undo/redo chords defer to it.
    fn is_text_input_context(&self) -> bool {
        false
    }

    /// Delay hook for the bounded grow poll. Tests override with a no-op.
    fn wait(&mut self, delay: Duration) {
        std::thread::sleep(delay);
    }
}

/// Scroll alignment hint for multi-row jumps.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Align {
    Start,
    Center,
    End,
}

/// Viewport geometry, all in the same pixel coordinate space as row bounds.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Viewport {
    /// Content offset of the top of the scroll window.
    pub scroll_top: f64,
    /// Total window height, including header and footer bands.
    pub height: f64,
    pub header_height: f64,
    pub footer_height: f64,
    /// Height of one row unit, used when stepping onto unrendered rows.
    pub row_height: f64,
}

/// Vertical extent of a rendered row, in content coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RowBounds {
    pub top: f64,
    pub bottom: f64,
}

/// The virtualization engine's public contract. Only rows near the viewport
/// have rendered elements; everything else exists as math inside the
/// virtualizer.
pub trait Virtualizer {
    fn viewport(&self) -> Viewport;

    /// Geometry for a row that currently has a rendered element; `None`
    /// when the row is virtualized out.
    fn row_bounds(&self, index: usize) -> Option<RowBounds>;

    /// Number of rows currently visible, when known.
    fn visible_row_count(&self) -> Option<usize>;

    fn scroll_by(&mut self, delta: f64);

    fn scroll_to_index(&mut self, index: usize, align: Align);

    /// Recompute measurements after layout-affecting state changes
    /// (row height, sort, filter, column visibility).
    fn measure(&mut self);
}

/// No-op virtualizer for headless hosts and tests that do not exercise
/// scrolling.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullVirtualizer;

impl Virtualizer for NullVirtualizer {
    fn viewport(&self) -> Viewport {
        Viewport::default()
    }

    fn row_bounds(&self, _index: usize) -> Option<RowBounds> {
        None
    }

    fn visible_row_count(&self) -> Option<usize> {
        None
    }

    fn scroll_by(&mut self, _delta: f64) {}

    fn scroll_to_index(&mut self, _index: usize, _align: Align) {}

    fn measure(&mut self) {}
}
