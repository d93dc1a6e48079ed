//! The interaction engine: one instance per grid.
//!
//! `GridEngine` owns the store, history, and configuration, and talks to
//! the externally-owned row model, virtualizer, and clipboard through the
//! collaborator traits in `host`. Concern-specific action handlers live in
//! sibling modules as `impl GridEngine` blocks.

use gridkit_core::column::{Columns, ColumnSpec};
use gridkit_core::position::{CellPosition, ColumnId};
use gridkit_core::row::RowRef;
use gridkit_core::selection::select_range;

use crate::config::GridConfig;
use crate::history::{EntryKind, History};
use crate::host::{Clipboard, RowSource, Virtualizer};
use crate::state::GridState;
use crate::store::{Store, Subscription};

pub struct GridEngine {
    pub(crate) config: GridConfig,
    pub(crate) columns: Columns,
    pub(crate) store: Store,
    pub(crate) history: History,
    pub(crate) source: Box<dyn RowSource>,
    pub(crate) virtualizer: Box<dyn Virtualizer>,
    pub(crate) clipboard: Box<dyn Clipboard>,
    /// Serialized text of the last cut, compared against paste payloads to
    /// detect the paste that completes the cut.
    pub(crate) cut_text: Option<String>,
    /// Focus to re-apply once a multi-row jump target has had a chance to
    /// mount; drained by `on_frame`.
    pub(crate) pending_refocus: Option<CellPosition>,
}

impl GridEngine {
    pub fn new(
        columns: Vec<ColumnSpec>,
        config: GridConfig,
        source: Box<dyn RowSource>,
        virtualizer: Box<dyn Virtualizer>,
        clipboard: Box<dyn Clipboard>,
    ) -> Self {
        let history = History::new(
            config.max_history,
            std::time::Duration::from_millis(config.coalesce_window_ms),
        );
        Self {
            config,
            columns: Columns::new(columns),
            store: Store::new(),
            history,
            source,
            virtualizer,
            clipboard,
            cut_text: None,
            pending_refocus: None,
        }
    }

    // =========================================================================
    // Read surface
    // =========================================================================

    pub fn state(&self) -> &GridState {
        self.store.state()
    }

    pub fn columns(&self) -> &Columns {
        &self.columns
    }

    pub fn config(&self) -> &GridConfig {
        &self.config
    }

    /// Current row list in display order, as the data collaborator reports it.
    pub fn rows(&self) -> Vec<RowRef> {
        self.source.rows()
    }

    pub(crate) fn row_count(&self) -> usize {
        self.source.rows().len()
    }

    pub fn subscribe(&mut self, listener: impl FnMut(&GridState) + 'static) -> Subscription {
        self.store.subscribe(listener)
    }

    pub fn unsubscribe(&mut self, subscription: Subscription) {
        self.store.unsubscribe(subscription);
    }

    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    // =========================================================================
    // Undo / redo
    // =========================================================================

    pub fn undo(&mut self) {
        self.store.begin_batch();
        let rows = self.source.rows();
        match self.history.undo(&rows) {
            Some(outcome) => {
                let notice = Self::history_notice("Undid", outcome.kind, outcome.count);
                self.source.on_data_change(outcome.rows);
                self.after_data_mutation();
                self.set_status(notice);
            }
            None => self.set_status("Nothing to undo"),
        }
        self.store.end_batch();
    }

    pub fn redo(&mut self) {
        self.store.begin_batch();
        let rows = self.source.rows();
        match self.history.redo(&rows) {
            Some(outcome) => {
                let notice = Self::history_notice("Redid", outcome.kind, outcome.count);
                self.source.on_data_change(outcome.rows);
                self.after_data_mutation();
                self.set_status(notice);
            }
            None => self.set_status("Nothing to redo"),
        }
        self.store.end_batch();
    }

    fn history_notice(verb: &str, kind: EntryKind, count: usize) -> String {
        match kind {
            EntryKind::CellsUpdate => format!("{} {} cell edit(s)", verb, count),
            EntryKind::RowsAdd => format!("{} adding {} row(s)", verb, count),
            EntryKind::RowsDelete => format!("{} deleting {} row(s)", verb, count),
        }
    }

    // =========================================================================
    // Lifecycle hooks
    // =========================================================================

    /// Host calls this once per animation frame. Re-applies focus deferred
    /// by a multi-row jump, forcing one notification so the renderer can
    /// move the focus ring onto the freshly-mounted row.
    pub fn on_frame(&mut self) {
        if let Some(pos) = self.pending_refocus.take() {
            self.store.begin_batch();
            self.store.set_focused(Some(pos));
            self.store.touch();
            self.store.end_batch();
        }
    }

    /// Host calls this after the row model changed underneath the engine
    /// (external sort, filter, append). Clamps positional state to the new
    /// row count, refreshes search matches, and lets the virtualizer
    /// remeasure.
    pub fn data_changed(&mut self) {
        self.store.begin_batch();
        self.clamp_to_rows();
        self.refresh_search_matches();
        self.store.end_batch();
        self.virtualizer.measure();
    }

    /// Shared tail of every engine-initiated mutation.
    pub(crate) fn after_data_mutation(&mut self) {
        self.clamp_to_rows();
        self.refresh_search_matches();
        self.virtualizer.measure();
    }

    /// Clamp focus, editing, and selection to valid row indices after
    /// operations that might invalidate them. Preserves column where
    /// possible, clamps row to the valid range.
    pub(crate) fn clamp_to_rows(&mut self) {
        let count = self.row_count();
        if count == 0 {
            self.store.set_focused(None);
            self.store.set_editing(None);
            let mut selection = self.store.state().selection.clone();
            selection.clear();
            self.store.set_selection(selection);
            return;
        }

        let clamp = |pos: &CellPosition| -> CellPosition {
            CellPosition::new(pos.row_index.min(count - 1), pos.column_id.clone())
        };

        if let Some(focused) = self.store.state().focused.clone() {
            self.store.set_focused(Some(clamp(&focused)));
        }
        if let Some(editing) = self.store.state().editing.clone() {
            self.store.set_editing(Some(clamp(&editing)));
        }
        if let Some(range) = self.store.state().selection.range.clone() {
            let start = clamp(&range.start);
            let end = clamp(&range.end);
            if start != range.start || end != range.end {
                let is_selecting = self.store.state().selection.is_selecting;
                self.store
                    .set_selection(select_range(&self.columns, start, end, is_selecting));
            }
        }
    }

    pub(crate) fn set_status(&mut self, message: impl Into<String>) {
        self.store.set_status_message(Some(message.into()));
    }

    // =========================================================================
    // Selection geometry helpers
    // =========================================================================

    /// Rows and columns spanned by the current selection: row indices
    /// ascending, column ids in navigable order. Falls back to the focused
    /// cell when nothing is selected.
    pub(crate) fn selection_grid(&self) -> Option<(Vec<usize>, Vec<ColumnId>)> {
        let state = self.store.state();
        if state.selection.is_empty() {
            let focused = state.focused.clone()?;
            return Some((vec![focused.row_index], vec![focused.column_id]));
        }

        let mut rows: Vec<usize> = Vec::new();
        for key in &state.selection.selected_cells {
            if let Some(pos) = key.decode() {
                if !rows.contains(&pos.row_index) {
                    rows.push(pos.row_index);
                }
            }
        }
        rows.sort_unstable();

        let columns: Vec<ColumnId> = self
            .columns
            .navigable()
            .filter(|spec| {
                rows.first().is_some_and(|&r| {
                    state
                        .selection
                        .selected_cells
                        .contains(&CellPosition::new(r, spec.id.clone()).key())
                })
            })
            .map(|spec| spec.id.clone())
            .collect();

        if rows.is_empty() || columns.is_empty() {
            return None;
        }
        Some((rows, columns))
    }

    /// All selected positions in row-major navigable order.
    pub(crate) fn selection_positions(&self) -> Vec<CellPosition> {
        match self.selection_grid() {
            Some((rows, columns)) => rows
                .iter()
                .flat_map(|&r| {
                    columns
                        .iter()
                        .map(move |c| CellPosition::new(r, c.clone()))
                })
                .collect(),
            None => Vec::new(),
        }
    }
}
