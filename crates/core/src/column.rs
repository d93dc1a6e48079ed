//! Column metadata: semantic variants and the navigable-column order.

use serde::{Deserialize, Serialize};

use crate::position::ColumnId;
use crate::value::CellValue;

/// Semantic editor type of a column. Drives paste coercion and the value a
/// cell is cleared to.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ColumnVariant {
    None,
    #[default]
    Text,
    Number,
    Checkbox,
    Date,
    Select,
    MultiSelect,
    File,
}

impl ColumnVariant {
    /// Value a cell of this variant is cleared to on delete or cut.
    pub fn empty_value(&self) -> CellValue {
        match self {
            ColumnVariant::None | ColumnVariant::Text => CellValue::Text(String::new()),
            ColumnVariant::Number | ColumnVariant::Date | ColumnVariant::Select => CellValue::Null,
            ColumnVariant::Checkbox => CellValue::Bool(false),
            ColumnVariant::MultiSelect | ColumnVariant::File => CellValue::List(Vec::new()),
        }
    }
}

/// One column of the grid.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnSpec {
    pub id: ColumnId,
    pub name: String,
    #[serde(default)]
    pub variant: ColumnVariant,
    /// Columns excluded from navigation (checkbox/action gutters) never
    /// take keyboard focus and never participate in ranges.
    #[serde(default = "default_navigable")]
    pub navigable: bool,
}

fn default_navigable() -> bool {
    true
}

impl ColumnSpec {
    pub fn new(id: impl Into<ColumnId>, name: impl Into<String>, variant: ColumnVariant) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            variant,
            navigable: true,
        }
    }

    pub fn non_navigable(mut self) -> Self {
        self.navigable = false;
        self
    }
}

/// The ordered column set. Navigation and selection see only the navigable
/// subset, in declaration order.
#[derive(Debug, Clone, Default)]
pub struct Columns {
    specs: Vec<ColumnSpec>,
}

impl Columns {
    pub fn new(specs: Vec<ColumnSpec>) -> Self {
        Self { specs }
    }

    pub fn specs(&self) -> &[ColumnSpec] {
        &self.specs
    }

    pub fn get(&self, id: &ColumnId) -> Option<&ColumnSpec> {
        self.specs.iter().find(|s| &s.id == id)
    }

    pub fn variant_of(&self, id: &ColumnId) -> ColumnVariant {
        self.get(id).map(|s| s.variant).unwrap_or_default()
    }

    /// Navigable columns in order.
    pub fn navigable(&self) -> impl Iterator<Item = &ColumnSpec> {
        self.specs.iter().filter(|s| s.navigable)
    }

    pub fn navigable_count(&self) -> usize {
        self.navigable().count()
    }

    /// Position of a column within the navigable order. `None` for unknown
    /// or non-navigable columns.
    pub fn navigable_index_of(&self, id: &ColumnId) -> Option<usize> {
        self.navigable().position(|s| &s.id == id)
    }

    pub fn navigable_at(&self, index: usize) -> Option<&ColumnSpec> {
        self.navigable().nth(index)
    }

    pub fn first_navigable(&self) -> Option<&ColumnSpec> {
        self.navigable().next()
    }

    pub fn last_navigable(&self) -> Option<&ColumnSpec> {
        self.navigable().last()
    }
}
