//! Context-menu state.
//!
//! The paste-overflow dialog lives in `clipboard` next to the paste flow;
//! this module owns the context menu, whose anchor coordinates persist
//! across close so a reopen lands at the same spot.

use gridkit_core::position::CellPosition;
use gridkit_core::selection::select_range;
use rustc_hash::FxHashSet;

use crate::engine::GridEngine;
use crate::state::ContextMenuState;

impl GridEngine {
    /// Right-click on a cell: if the cell is outside the current selection,
    /// selection collapses to it first (menu actions apply to what the user
    /// sees highlighted), then the menu opens at the pointer.
    pub fn on_cell_context_menu(&mut self, pos: CellPosition, x: f64, y: f64) {
        self.store.begin_batch();
        if !self.store.state().is_cell_selected(&pos)
            && self.columns.navigable_index_of(&pos.column_id).is_some()
        {
            self.store.set_editing(None);
            self.store.set_focused(Some(pos.clone()));
            self.store
                .set_selection(select_range(&self.columns, pos.clone(), pos, false));
            self.store.set_selected_rows(FxHashSet::default());
        }
        self.store.set_context_menu(ContextMenuState { open: true, x, y });
        self.store.end_batch();
    }

    /// Close the menu. Anchor coordinates are kept.
    pub fn close_context_menu(&mut self) {
        let mut menu = self.store.state().context_menu.clone();
        if menu.open {
            menu.open = false;
            self.store.set_context_menu(menu);
        }
    }
}
