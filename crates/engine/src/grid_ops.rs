//! Row lifecycle operations: deletion of selected rows and data-source
//! growth for paste overflow.

use std::time::Duration;

use rustc_hash::FxHashSet;

use crate::engine::GridEngine;
use crate::history::RowSnapshot;

impl GridEngine {
    /// Delete the rows in the row selection through the data collaborator.
    /// Offered only when the host supports deletion. The external call runs
    /// first; if it panics/propagates, nothing was recorded and engine
    /// state stays aligned with the real data source.
    pub fn delete_selected_rows(&mut self) {
        if !self.source.can_delete_rows() {
            return;
        }
        let selected = self.store.state().selected_rows.clone();
        if selected.is_empty() {
            return;
        }

        let rows = self.source.rows();
        let snapshots: Vec<RowSnapshot> = rows
            .iter()
            .enumerate()
            .filter(|(_, row)| selected.contains(&row.id))
            .map(|(index, row)| RowSnapshot {
                index,
                row: row.clone(),
            })
            .collect();
        let ids: Vec<_> = snapshots.iter().map(|s| s.row.id.clone()).collect();
        let indices: Vec<_> = snapshots.iter().map(|s| s.index).collect();

        self.source.delete_rows(&ids, &indices);

        let count = snapshots.len();
        self.history.record_rows_deleted(snapshots);

        self.store.begin_batch();
        self.store.set_selected_rows(FxHashSet::default());
        self.set_status(format!("Deleted {} row(s)", count));
        self.after_data_mutation();
        self.store.end_batch();
    }

    /// Grow the data source until it holds at least `needed` rows, polling
    /// with bounded retries since the row model may reflect growth
    /// asynchronously. Gives up silently after the attempt cap; the caller
    /// pastes best-effort against whatever count is available. Returns the
    /// resulting row count.
    pub(crate) fn grow_rows(&mut self, needed: usize) -> usize {
        let before = self.source.rows().len();
        if needed <= before || !self.source.can_append_rows() {
            return before;
        }

        self.source.append_rows(needed - before);

        let delay = Duration::from_millis(self.config.grow_poll_delay_ms);
        let mut attempts = 0;
        while self.source.rows().len() < needed && attempts < self.config.grow_poll_attempts {
            self.source.wait(delay);
            attempts += 1;
        }

        let rows = self.source.rows();
        if rows.len() < needed {
            log::debug!(
                "row growth incomplete: wanted {}, have {} after {} attempts",
                needed,
                rows.len(),
                attempts
            );
        }

        // Track what actually appeared so the growth is undoable
        let snapshots: Vec<RowSnapshot> = rows
            .iter()
            .enumerate()
            .skip(before)
            .map(|(index, row)| RowSnapshot {
                index,
                row: row.clone(),
            })
            .collect();
        self.history.record_rows_added(snapshots);

        rows.len()
    }
}
