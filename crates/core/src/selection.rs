//! Selection model: rectangular ranges over the navigable-column order.

use rustc_hash::FxHashSet;
use serde::{Deserialize, Serialize};

use crate::column::Columns;
use crate::position::{CellKey, CellPosition};

/// A rectangular block, inclusive on both ends. Rows are view indices,
/// columns are indices into the navigable-column order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Range {
    pub start_row: usize,
    pub start_col: usize,
    pub end_row: usize,
    pub end_col: usize,
}

impl Range {
    /// Create a new range, automatically normalizing so start <= end.
    pub fn new(r1: usize, c1: usize, r2: usize, c2: usize) -> Self {
        Self {
            start_row: r1.min(r2),
            start_col: c1.min(c2),
            end_row: r1.max(r2),
            end_col: c1.max(c2),
        }
    }

    pub fn contains(&self, row: usize, col: usize) -> bool {
        row >= self.start_row && row <= self.end_row && col >= self.start_col && col <= self.end_col
    }

    pub fn cell_count(&self) -> usize {
        (self.end_row - self.start_row + 1) * (self.end_col - self.start_col + 1)
    }

    /// Iterate over all cells in this range (row-major order).
    pub fn cells(&self) -> impl Iterator<Item = (usize, usize)> {
        let (start_row, end_row) = (self.start_row, self.end_row);
        let (start_col, end_col) = (self.start_col, self.end_col);
        (start_row..=end_row).flat_map(move |r| (start_col..=end_col).map(move |c| (r, c)))
    }
}

/// The literal anchor pair of a selection. Unlike `Range` this is NOT
/// normalized: `start` stays where the selection began, so a later
/// extension (shift+click, shift+arrow) anchors from the original corner
/// rather than the current end.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectionRange {
    pub start: CellPosition,
    pub end: CellPosition,
}

/// Current cell selection: the membership set plus the anchor pair.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SelectionState {
    pub selected_cells: FxHashSet<CellKey>,
    pub range: Option<SelectionRange>,
    /// True while a pointer drag is extending the selection.
    pub is_selecting: bool,
}

impl SelectionState {
    pub fn is_cell_selected(&self, pos: &CellPosition) -> bool {
        self.selected_cells.contains(&pos.key())
    }

    pub fn is_empty(&self) -> bool {
        self.selected_cells.is_empty()
    }

    pub fn clear(&mut self) {
        self.selected_cells.clear();
        self.range = None;
        self.is_selecting = false;
    }
}

/// Compute the rectangular cell set spanned by `start` and `end` over the
/// navigable columns. `start`/`end` may be given in any corner order; the
/// literal anchor pair is stored as given. Positions in non-navigable
/// columns produce an empty selection.
pub fn select_range(
    columns: &Columns,
    start: CellPosition,
    end: CellPosition,
    is_selecting: bool,
) -> SelectionState {
    let (Some(start_col), Some(end_col)) = (
        columns.navigable_index_of(&start.column_id),
        columns.navigable_index_of(&end.column_id),
    ) else {
        return SelectionState::default();
    };

    let nav: Vec<_> = columns.navigable().collect();
    let rect = Range::new(start.row_index, start_col, end.row_index, end_col);
    let mut selected_cells =
        FxHashSet::with_capacity_and_hasher(rect.cell_count(), Default::default());
    for (row, col) in rect.cells() {
        selected_cells.insert(CellKey::new(row, &nav[col].id));
    }

    SelectionState {
        selected_cells,
        range: Some(SelectionRange { start, end }),
        is_selecting,
    }
}

/// All rows × one column. No-op (empty selection) when the column is not
/// navigable or the grid has no rows.
pub fn select_column(
    columns: &Columns,
    row_count: usize,
    column_id: &crate::position::ColumnId,
) -> SelectionState {
    if row_count == 0 || columns.navigable_index_of(column_id).is_none() {
        return SelectionState::default();
    }
    select_range(
        columns,
        CellPosition::new(0, column_id.clone()),
        CellPosition::new(row_count - 1, column_id.clone()),
        false,
    )
}

/// All rows × all navigable columns. An empty grid yields an empty selection.
pub fn select_all(columns: &Columns, row_count: usize) -> SelectionState {
    let (Some(first), Some(last)) = (columns.first_navigable(), columns.last_navigable()) else {
        return SelectionState::default();
    };
    if row_count == 0 {
        return SelectionState::default();
    }
    select_range(
        columns,
        CellPosition::new(0, first.id.clone()),
        CellPosition::new(row_count - 1, last.id.clone()),
        false,
    )
}
