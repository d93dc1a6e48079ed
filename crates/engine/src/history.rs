//! Undo/redo command history.
//!
//! Entries are stored as deltas: cell entries carry per-cell
//! `(row_id, column_id, old, new)` patches, row entries carry deep row
//! snapshots with their original display indices. Application is
//! identity-based — rows are located by `RowId`, never by index — so an
//! entry replays correctly against a collection that was re-sorted or
//! filtered since it was recorded. Applying an entry returns a fresh
//! collection; rows it does not touch keep their `Arc` identity.
//!
//! Rapid-fire edits to the same cell coalesce: within the window, a second
//! edit overwrites the pending "new" value rather than creating a second
//! entry, so undo reverts to the value before the whole burst.

use std::sync::Arc;
use std::time::{Duration, Instant};

use gridkit_core::position::{ColumnId, RowId};
use gridkit_core::row::{index_of, RowRef};
use gridkit_core::value::CellValue;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryKind {
    CellsUpdate,
    RowsAdd,
    RowsDelete,
}

/// One cell's before/after pair, keyed by row identity.
#[derive(Debug, Clone, PartialEq)]
pub struct CellPatch {
    pub row_id: RowId,
    pub column_id: ColumnId,
    pub old: CellValue,
    pub new: CellValue,
}

/// A row snapshot with the display index it occupied when recorded.
#[derive(Debug, Clone)]
pub struct RowSnapshot {
    pub index: usize,
    pub row: RowRef,
}

#[derive(Debug, Clone)]
enum Patch {
    Cells(Vec<CellPatch>),
    RowsAdd(Vec<RowSnapshot>),
    RowsDelete(Vec<RowSnapshot>),
}

#[derive(Debug)]
pub struct HistoryEntry {
    kind: EntryKind,
    count: usize,
    patch: Patch,
}

impl HistoryEntry {
    pub fn kind(&self) -> EntryKind {
        self.kind
    }

    pub fn count(&self) -> usize {
        self.count
    }

    /// Pure application against the caller-supplied current collection.
    fn undo(&self, rows: &[RowRef]) -> Vec<RowRef> {
        match &self.patch {
            Patch::Cells(patches) => apply_cells(rows, patches, true),
            Patch::RowsAdd(snapshots) => remove_rows(rows, snapshots),
            Patch::RowsDelete(snapshots) => insert_rows(rows, snapshots),
        }
    }

    fn redo(&self, rows: &[RowRef]) -> Vec<RowRef> {
        match &self.patch {
            Patch::Cells(patches) => apply_cells(rows, patches, false),
            Patch::RowsAdd(snapshots) => insert_rows(rows, snapshots),
            Patch::RowsDelete(snapshots) => remove_rows(rows, snapshots),
        }
    }
}

fn apply_cells(rows: &[RowRef], patches: &[CellPatch], use_old: bool) -> Vec<RowRef> {
    let mut out: Vec<RowRef> = rows.to_vec();
    for patch in patches {
        // Rows deleted since the entry was recorded are skipped
        if let Some(i) = index_of(&out, &patch.row_id) {
            let value = if use_old { patch.old.clone() } else { patch.new.clone() };
            out[i] = Arc::new(out[i].updated(patch.column_id.clone(), value));
        }
    }
    out
}

fn remove_rows(rows: &[RowRef], snapshots: &[RowSnapshot]) -> Vec<RowRef> {
    rows.iter()
        .filter(|r| !snapshots.iter().any(|s| s.row.id == r.id))
        .cloned()
        .collect()
}

/// Reinsert snapshots at their original indices, clamped to the current
/// length if the collection has shrunk. Ascending order keeps earlier
/// insertions from shifting later ones.
fn insert_rows(rows: &[RowRef], snapshots: &[RowSnapshot]) -> Vec<RowRef> {
    let mut out: Vec<RowRef> = rows.to_vec();
    let mut ordered: Vec<&RowSnapshot> = snapshots.iter().collect();
    ordered.sort_by_key(|s| s.index);
    for snapshot in ordered {
        if index_of(&out, &snapshot.row.id).is_some() {
            continue; // already present, nothing to restore
        }
        let at = snapshot.index.min(out.len());
        out.insert(at, snapshot.row.clone());
    }
    out
}

struct PendingBatch {
    patches: Vec<CellPatch>,
    last: Instant,
}

/// Result of an undo or redo: the replacement collection plus what kind of
/// entry was applied (for the user-visible notice).
pub struct HistoryOutcome {
    pub rows: Vec<RowRef>,
    pub kind: EntryKind,
    pub count: usize,
}

pub struct History {
    undo_stack: Vec<HistoryEntry>,
    redo_stack: Vec<HistoryEntry>,
    max_entries: usize,
    window: Duration,
    pending: Option<PendingBatch>,
}

impl History {
    pub fn new(max_entries: usize, window: Duration) -> Self {
        Self {
            undo_stack: Vec::new(),
            redo_stack: Vec::new(),
            max_entries,
            window,
            pending: None,
        }
    }

    /// Record a single cell change, coalescing with the pending batch when
    /// the previous edit landed inside the window.
    pub fn record_cell(&mut self, patch: CellPatch) {
        if patch.old == patch.new {
            return;
        }

        let now = Instant::now();
        let stale = self
            .pending
            .as_ref()
            .is_some_and(|p| now.duration_since(p.last) > self.window);
        if stale {
            self.flush_pending();
        }

        // A new change discards the redo branch even before the batch commits
        self.redo_stack.clear();

        let pending = self.pending.get_or_insert_with(|| PendingBatch {
            patches: Vec::new(),
            last: now,
        });
        if let Some(existing) = pending
            .patches
            .iter_mut()
            .find(|p| p.row_id == patch.row_id && p.column_id == patch.column_id)
        {
            existing.new = patch.new;
        } else {
            pending.patches.push(patch);
        }
        pending.last = now;
    }

    /// Record multiple cell changes as one atomic entry (paste, delete
    /// selection). Flushes any pending batch first to preserve ordering.
    pub fn record_cells(&mut self, patches: Vec<CellPatch>) {
        self.flush_pending();
        let patches: Vec<CellPatch> = patches.into_iter().filter(|p| p.old != p.new).collect();
        if patches.is_empty() {
            return;
        }
        let count = patches.len();
        self.push_entry(HistoryEntry {
            kind: EntryKind::CellsUpdate,
            count,
            patch: Patch::Cells(patches),
        });
    }

    pub fn record_rows_added(&mut self, snapshots: Vec<RowSnapshot>) {
        self.flush_pending();
        if snapshots.is_empty() {
            return;
        }
        let count = snapshots.len();
        self.push_entry(HistoryEntry {
            kind: EntryKind::RowsAdd,
            count,
            patch: Patch::RowsAdd(snapshots),
        });
    }

    pub fn record_rows_deleted(&mut self, snapshots: Vec<RowSnapshot>) {
        self.flush_pending();
        if snapshots.is_empty() {
            return;
        }
        let count = snapshots.len();
        self.push_entry(HistoryEntry {
            kind: EntryKind::RowsDelete,
            count,
            patch: Patch::RowsDelete(snapshots),
        });
    }

    /// Commit the pending batch onto the undo stack.
    pub fn flush_pending(&mut self) {
        if let Some(pending) = self.pending.take() {
            if pending.patches.is_empty() {
                return;
            }
            let count = pending.patches.len();
            self.push_entry(HistoryEntry {
                kind: EntryKind::CellsUpdate,
                count,
                patch: Patch::Cells(pending.patches),
            });
        }
    }

    fn push_entry(&mut self, entry: HistoryEntry) {
        self.undo_stack.push(entry);
        self.redo_stack.clear();

        // Limit history size
        if self.undo_stack.len() > self.max_entries {
            self.undo_stack.remove(0);
        }
    }

    pub fn undo(&mut self, rows: &[RowRef]) -> Option<HistoryOutcome> {
        self.flush_pending();
        let entry = self.undo_stack.pop()?;
        let new_rows = entry.undo(rows);
        let outcome = HistoryOutcome {
            rows: new_rows,
            kind: entry.kind,
            count: entry.count,
        };
        self.redo_stack.push(entry);
        Some(outcome)
    }

    pub fn redo(&mut self, rows: &[RowRef]) -> Option<HistoryOutcome> {
        self.flush_pending();
        let entry = self.redo_stack.pop()?;
        let new_rows = entry.redo(rows);
        let outcome = HistoryOutcome {
            rows: new_rows,
            kind: entry.kind,
            count: entry.count,
        };
        self.undo_stack.push(entry);
        Some(outcome)
    }

    /// False only when both the stack and the pending batch are empty.
    pub fn can_undo(&self) -> bool {
        self.pending.is_some() || !self.undo_stack.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.redo_stack.is_empty()
    }

    pub fn clear(&mut self) {
        self.flush_pending();
        self.undo_stack.clear();
        self.redo_stack.clear();
    }
}
