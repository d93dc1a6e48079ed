//! Rows: identity-bearing cell maps, shared behind `Arc`.
//!
//! The row collection is externally owned and only ever replaced wholesale.
//! Rows untouched by an update keep their prior `Arc` identity — cheap
//! replacement collections, and renderers can skip unchanged rows by
//! pointer comparison.

use std::sync::Arc;

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

use crate::position::{ColumnId, RowId};
use crate::value::CellValue;

/// Shared handle to a row. Clones are identity-preserving.
pub type RowRef = Arc<Row>;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Row {
    pub id: RowId,
    cells: FxHashMap<ColumnId, CellValue>,
}

impl Row {
    pub fn new(id: impl Into<RowId>) -> Self {
        Self {
            id: id.into(),
            cells: FxHashMap::default(),
        }
    }

    /// Builder-style cell assignment, for construction and tests.
    pub fn with_cell(mut self, column: impl Into<ColumnId>, value: CellValue) -> Self {
        self.cells.insert(column.into(), value);
        self
    }

    pub fn get(&self, column: &ColumnId) -> Option<&CellValue> {
        self.cells.get(column)
    }

    /// Value of a cell; absent cells read as `Null`.
    pub fn value(&self, column: &ColumnId) -> CellValue {
        self.cells.get(column).cloned().unwrap_or_default()
    }

    pub fn set(&mut self, column: ColumnId, value: CellValue) {
        self.cells.insert(column, value);
    }

    /// Functional update: a new row with one cell replaced. Used when
    /// building a replacement collection so siblings keep their `Arc`s.
    pub fn updated(&self, column: ColumnId, value: CellValue) -> Row {
        let mut row = self.clone();
        row.set(column, value);
        row
    }
}

/// Index of a row by identity within a display-ordered collection.
pub fn index_of(rows: &[RowRef], id: &RowId) -> Option<usize> {
    rows.iter().position(|r| &r.id == id)
}
