//! Observable state container with transactional notification batching.
//!
//! Setters no-op when the new value equals the current one, so redundant
//! writes never reach subscribers. Between `begin_batch`/`end_batch` (or
//! inside `batch`), any number of mutations coalesce into at most one
//! notification — multi-field transitions like "clear selection AND clear
//! row selection" are a single observable update, and renderers never see
//! an inconsistent intermediate state.

use gridkit_core::position::{CellKey, CellPosition, RowId};
use gridkit_core::selection::SelectionState;
use rustc_hash::FxHashSet;

use crate::state::{ContextMenuState, GridState, PasteDialogState, SearchState};

/// Handle returned by `subscribe`; pass back to `unsubscribe`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Subscription(u64);

type Listener = Box<dyn FnMut(&GridState)>;

#[derive(Default)]
pub struct Store {
    state: GridState,
    listeners: Vec<(u64, Listener)>,
    next_id: u64,
    batch_depth: u32,
    dirty: bool,
}

impl Store {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> &GridState {
        &self.state
    }

    /// Cloned snapshot for hosts that hold state across calls.
    pub fn snapshot(&self) -> GridState {
        self.state.clone()
    }

    pub fn subscribe(&mut self, listener: impl FnMut(&GridState) + 'static) -> Subscription {
        let id = self.next_id;
        self.next_id += 1;
        self.listeners.push((id, Box::new(listener)));
        Subscription(id)
    }

    pub fn unsubscribe(&mut self, subscription: Subscription) {
        self.listeners.retain(|(id, _)| *id != subscription.0);
    }

    /// Run `f` with notifications deferred; nested batches coalesce into
    /// the outermost one.
    pub fn batch<R>(&mut self, f: impl FnOnce(&mut Store) -> R) -> R {
        self.begin_batch();
        let out = f(self);
        self.end_batch();
        out
    }

    pub fn begin_batch(&mut self) {
        self.batch_depth += 1;
    }

    pub fn end_batch(&mut self) {
        debug_assert!(self.batch_depth > 0, "end_batch without begin_batch");
        self.batch_depth = self.batch_depth.saturating_sub(1);
        if self.batch_depth == 0 && self.dirty {
            self.dirty = false;
            self.notify();
        }
    }

    /// Force one notification even without a state change. Used by the
    /// deferred-refocus drain, where the renderer must re-read focus after
    /// a target row mounts.
    pub fn touch(&mut self) {
        self.mark();
    }

    fn mark(&mut self) {
        if self.batch_depth > 0 {
            self.dirty = true;
        } else {
            self.notify();
        }
    }

    fn notify(&mut self) {
        for (_, listener) in self.listeners.iter_mut() {
            listener(&self.state);
        }
    }

    // Field setters, equality-gated.

    pub fn set_focused(&mut self, value: Option<CellPosition>) {
        if self.state.focused != value {
            self.state.focused = value;
            self.mark();
        }
    }

    pub fn set_editing(&mut self, value: Option<CellPosition>) {
        if self.state.editing != value {
            self.state.editing = value;
            self.mark();
        }
    }

    pub fn set_selection(&mut self, value: SelectionState) {
        if self.state.selection != value {
            self.state.selection = value;
            self.mark();
        }
    }

    pub fn set_selected_rows(&mut self, value: FxHashSet<RowId>) {
        if self.state.selected_rows != value {
            self.state.selected_rows = value;
            self.mark();
        }
    }

    pub fn set_cut_cells(&mut self, value: FxHashSet<CellKey>) {
        if self.state.cut_cells != value {
            self.state.cut_cells = value;
            self.mark();
        }
    }

    pub fn set_context_menu(&mut self, value: ContextMenuState) {
        if self.state.context_menu != value {
            self.state.context_menu = value;
            self.mark();
        }
    }

    pub fn set_paste_dialog(&mut self, value: PasteDialogState) {
        if self.state.paste_dialog != value {
            self.state.paste_dialog = value;
            self.mark();
        }
    }

    pub fn set_search(&mut self, value: SearchState) {
        if self.state.search != value {
            self.state.search = value;
            self.mark();
        }
    }

    pub fn set_status_message(&mut self, value: Option<String>) {
        if self.state.status_message != value {
            self.state.status_message = value;
            self.mark();
        }
    }
}
