//! Editing state machine and cell mutation.
//!
//! The engine tracks *which* cell is editing and applies committed values;
//! the text buffer and caret belong to the renderer's editor widget.
//! Editing a cell implies focusing it.

use std::sync::Arc;

use gridkit_core::position::{CellPosition, ColumnId};
use gridkit_core::selection::select_range;
use gridkit_core::value::CellValue;

use crate::engine::GridEngine;
use crate::history::CellPatch;

impl GridEngine {
    pub fn start_editing(&mut self, pos: CellPosition) {
        if self.columns.navigable_index_of(&pos.column_id).is_none() {
            return;
        }
        if pos.row_index >= self.row_count() {
            return;
        }
        self.store.begin_batch();
        self.store.set_focused(Some(pos.clone()));
        self.store
            .set_selection(select_range(&self.columns, pos.clone(), pos.clone(), false));
        self.store.set_editing(Some(pos));
        self.store.end_batch();
    }

    /// Leave edit mode without applying anything. Focus stays on the cell.
    pub fn stop_editing(&mut self) {
        self.store.set_editing(None);
    }

    /// Commit the typed value for the editing cell, record it (coalesced),
    /// and hand the replacement collection to the data collaborator.
    pub fn commit_value(&mut self, value: CellValue) {
        let Some(pos) = self.store.state().editing.clone() else {
            return;
        };
        self.store.begin_batch();
        let patches = self.write_cells(&[(pos.row_index, pos.column_id, value)]);
        for patch in patches {
            self.history.record_cell(patch);
        }
        self.store.set_editing(None);
        self.store.end_batch();
        self.after_data_mutation();
    }

    /// Clear every selected cell to its variant-appropriate empty, as one
    /// undoable batch.
    pub fn delete_selection(&mut self) {
        let writes: Vec<(usize, ColumnId, CellValue)> = self
            .selection_positions()
            .into_iter()
            .map(|pos| {
                let empty = self.columns.variant_of(&pos.column_id).empty_value();
                (pos.row_index, pos.column_id, empty)
            })
            .collect();
        if writes.is_empty() {
            return;
        }
        self.store.begin_batch();
        let patches = self.write_cells(&writes);
        self.history.record_cells(patches);
        self.store.end_batch();
        self.after_data_mutation();
    }

    /// Apply cell writes against the current collection, returning the
    /// patches for rows that actually changed. Untouched rows keep their
    /// `Arc` identity in the replacement collection handed to the data
    /// collaborator.
    pub(crate) fn write_cells(
        &mut self,
        writes: &[(usize, ColumnId, CellValue)],
    ) -> Vec<CellPatch> {
        let rows = self.source.rows();
        let mut out = rows.clone();
        let mut patches = Vec::new();

        for (row_index, column_id, value) in writes {
            let Some(row) = out.get(*row_index) else {
                continue;
            };
            let old = row.value(column_id);
            if &old == value {
                continue;
            }
            patches.push(CellPatch {
                row_id: row.id.clone(),
                column_id: column_id.clone(),
                old,
                new: value.clone(),
            });
            out[*row_index] = Arc::new(out[*row_index].updated(column_id.clone(), value.clone()));
        }

        if !patches.is_empty() {
            self.source.on_data_change(out);
        }
        patches
    }
}
