//! Pointer-driven selection: click, drag, row and column header selection.

use gridkit_core::position::{CellPosition, ColumnId, RowId};
use gridkit_core::selection::{select_all, select_column, select_range, SelectionState};
use rustc_hash::FxHashSet;

use crate::engine::GridEngine;

impl GridEngine {
    /// Plain click: focus the cell and collapse selection to it.
    pub fn on_cell_click(&mut self, pos: CellPosition) {
        if self.columns.navigable_index_of(&pos.column_id).is_none() {
            return;
        }
        self.store.begin_batch();
        self.store.set_editing(None);
        self.store.set_focused(Some(pos.clone()));
        self.store
            .set_selection(select_range(&self.columns, pos.clone(), pos, false));
        self.store.set_selected_rows(FxHashSet::default());
        self.store.end_batch();
    }

    /// Mouse down starts a drag selection; with shift it extends from the
    /// original anchor instead.
    pub fn on_cell_mouse_down(&mut self, pos: CellPosition, shift: bool) {
        if self.columns.navigable_index_of(&pos.column_id).is_none() {
            return;
        }
        self.store.begin_batch();
        self.store.set_editing(None);

        if shift {
            // Anchor from the original selection start, falling back to focus
            let anchor = self
                .store
                .state()
                .selection
                .range
                .as_ref()
                .map(|r| r.start.clone())
                .or_else(|| self.store.state().focused.clone());
            if let Some(anchor) = anchor {
                self.store
                    .set_selection(select_range(&self.columns, anchor, pos, false));
                self.store.set_selected_rows(FxHashSet::default());
                self.store.end_batch();
                return;
            }
        }

        self.store.set_focused(Some(pos.clone()));
        self.store
            .set_selection(select_range(&self.columns, pos.clone(), pos, true));
        self.store.set_selected_rows(FxHashSet::default());
        self.store.end_batch();
    }

    /// Mouse move over a cell while dragging extends the selection from the
    /// original anchor.
    pub fn on_cell_mouse_enter(&mut self, pos: CellPosition) {
        let state = self.store.state();
        if !state.selection.is_selecting {
            return;
        }
        let Some(anchor) = state.selection.range.as_ref().map(|r| r.start.clone()) else {
            return;
        };
        if self.columns.navigable_index_of(&pos.column_id).is_none() {
            return;
        }
        self.store
            .set_selection(select_range(&self.columns, anchor, pos, true));
    }

    /// Mouse up ends the drag; the selection itself stays.
    pub fn on_cell_mouse_up(&mut self) {
        let state = self.store.state();
        if state.selection.is_selecting {
            let mut selection = state.selection.clone();
            selection.is_selecting = false;
            self.store.set_selection(selection);
        }
    }

    pub fn select_all(&mut self) {
        self.store.begin_batch();
        self.store
            .set_selection(select_all(&self.columns, self.row_count()));
        self.store.set_selected_rows(FxHashSet::default());
        self.store.end_batch();
    }

    /// Empty cell selection and row selection together — they are mutually
    /// exclusive views and stale highlighting must not survive in either.
    pub fn clear_selection(&mut self) {
        self.store.begin_batch();
        self.store.set_selection(SelectionState::default());
        self.store.set_selected_rows(FxHashSet::default());
        self.store.end_batch();
    }

    /// Row-gutter selection. Additive toggles membership; otherwise the row
    /// becomes the sole selected row. Cell selection clears either way.
    pub fn on_row_select(&mut self, id: RowId, additive: bool) {
        self.store.begin_batch();
        let mut rows = if additive {
            self.store.state().selected_rows.clone()
        } else {
            FxHashSet::default()
        };
        if additive && rows.contains(&id) {
            rows.remove(&id);
        } else {
            rows.insert(id);
        }
        self.store.set_selected_rows(rows);
        self.store.set_selection(SelectionState::default());
        self.store.end_batch();
    }

    /// Column-header click: all rows × one column, focus on its top cell.
    pub fn on_column_click(&mut self, column_id: ColumnId) {
        let count = self.row_count();
        let selection = select_column(&self.columns, count, &column_id);
        if selection.is_empty() {
            return;
        }
        self.store.begin_batch();
        self.store.set_editing(None);
        self.store
            .set_focused(Some(CellPosition::new(0, column_id)));
        self.store.set_selection(selection);
        self.store.set_selected_rows(FxHashSet::default());
        self.store.end_batch();
    }
}
