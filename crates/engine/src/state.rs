//! All grid-interaction state, in one owned object.
//!
//! Mutated exclusively through the engine's action handlers via the store;
//! renderers read it through snapshots and the selector methods.

use gridkit_core::position::{CellKey, CellPosition, RowId};
use gridkit_core::selection::SelectionState;
use rustc_hash::FxHashSet;

/// Context-menu flag plus anchor coordinates. Coordinates persist across
/// close so a reopen lands at the same spot without recomputation.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ContextMenuState {
    pub open: bool,
    pub x: f64,
    pub y: f64,
}

/// A paste that would overflow the current row count, parked until the
/// user confirms. `clipboard_text` caches the already-read payload so a
/// confirmed paste does not re-read the clipboard.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PasteDialogState {
    pub open: bool,
    pub rows_needed: usize,
    pub clipboard_text: String,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct SearchState {
    pub open: bool,
    pub query: String,
    /// Matches in row-major discovery order.
    pub matches: Vec<CellPosition>,
    /// Index into `matches`; `None` when there are no matches.
    pub match_index: Option<usize>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct GridState {
    pub focused: Option<CellPosition>,
    /// Invariant: `editing.is_some()` implies `focused == editing`.
    pub editing: Option<CellPosition>,
    pub selection: SelectionState,
    /// Whole-row selection. Mutually exclusive with cell selection; the two
    /// are cleared together.
    pub selected_rows: FxHashSet<RowId>,
    /// Cells marked by a cut, pending the paste that completes it.
    pub cut_cells: FxHashSet<CellKey>,
    pub context_menu: ContextMenuState,
    pub paste_dialog: PasteDialogState,
    pub search: SearchState,
    /// Transient user-visible notice (clipboard failures, undo results).
    pub status_message: Option<String>,
}

impl GridState {
    pub fn is_editing(&self) -> bool {
        self.editing.is_some()
    }

    pub fn is_cell_selected(&self, pos: &CellPosition) -> bool {
        self.selection.is_cell_selected(pos)
    }

    pub fn is_row_selected(&self, id: &RowId) -> bool {
        self.selected_rows.contains(id)
    }

    pub fn is_cell_cut(&self, pos: &CellPosition) -> bool {
        self.cut_cells.contains(&pos.key())
    }

    pub fn is_search_match(&self, pos: &CellPosition) -> bool {
        self.search.matches.contains(pos)
    }

    pub fn is_active_search_match(&self, pos: &CellPosition) -> bool {
        self.search
            .match_index
            .and_then(|i| self.search.matches.get(i))
            .is_some_and(|m| m == pos)
    }
}
