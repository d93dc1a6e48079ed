//! Cell addressing: column/row identifiers and the canonical cell key.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Identifier of a column.
///
/// Column ids may not contain `:` — the cell-key encoding reserves it as the
/// separator, which is what makes `CellKey::new` a bijection.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ColumnId(String);

impl ColumnId {
    pub fn new(id: impl Into<String>) -> Self {
        let id = id.into();
        debug_assert!(!id.contains(':'), "column id may not contain ':'");
        Self(id)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ColumnId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ColumnId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

/// Stable identity of a row, independent of display order.
///
/// Sorting and filtering permute row indices; `RowId` is what survives, and
/// is what undo history uses to locate rows.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RowId(String);

impl RowId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RowId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for RowId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl From<String> for RowId {
    fn from(id: String) -> Self {
        Self::new(id)
    }
}

/// Logical address of a cell in the currently visible/sorted row order.
///
/// `row_index` is an index into the live row model, not a stable row
/// identity — a resort moves the cell this position refers to.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CellPosition {
    pub row_index: usize,
    pub column_id: ColumnId,
}

impl CellPosition {
    pub fn new(row_index: usize, column_id: impl Into<ColumnId>) -> Self {
        Self {
            row_index,
            column_id: column_id.into(),
        }
    }

    /// Canonical key for set membership.
    pub fn key(&self) -> CellKey {
        CellKey::new(self.row_index, &self.column_id)
    }
}

/// Canonical string encoding of a `(row_index, column_id)` pair.
///
/// The encoding is `"{row_index}:{column_id}"`; since column ids cannot
/// contain `:`, encode and decode are inverses over the valid domain.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CellKey(String);

impl CellKey {
    pub fn new(row_index: usize, column_id: &ColumnId) -> Self {
        Self(format!("{}:{}", row_index, column_id.as_str()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Decode back into a position. `None` only for keys not produced by
    /// `CellKey::new`.
    pub fn decode(&self) -> Option<CellPosition> {
        let (row, column) = self.0.split_once(':')?;
        let row_index = row.parse().ok()?;
        Some(CellPosition::new(row_index, column))
    }
}

impl fmt::Display for CellKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
