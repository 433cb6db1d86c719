//! Column Blocks
//!
//! The payload of one chunk fetch: per-column arrays of cell values for a
//! contiguous slice of retrieval positions.

use serde::Deserialize;

use crate::domain::CellValue;

/// Per-column data for one contiguous range of rows
///
/// Decoded straight from the chunk call's JSON body. Columns are in request
/// order; each inner vector holds one cell per requested row.
#[derive(Clone, Debug, Deserialize)]
pub struct ColumnBlock {
    #[serde(rename = "data")]
    columns: Vec<Vec<CellValue>>,
}

impl ColumnBlock {
    /// Build a block from per-column cell arrays
    pub fn new(columns: Vec<Vec<CellValue>>) -> Self {
        Self { columns }
    }

    /// Number of columns in the block
    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    /// Number of rows in the block
    pub fn row_count(&self) -> usize {
        self.columns.first().map(Vec::len).unwrap_or(0)
    }

    /// Extract one logical row by its in-block offset
    ///
    /// Short columns yield `Null` cells rather than truncating the row.
    pub fn row(&self, offset: usize) -> Option<Row> {
        if offset >= self.row_count() {
            return None;
        }
        let values = self
            .columns
            .iter()
            .map(|column| column.get(offset).cloned().unwrap_or(CellValue::Null))
            .collect();
        Some(Row { values })
    }
}

/// One logical row's column values, in column order
#[derive(Clone, Debug, PartialEq)]
pub struct Row {
    values: Vec<CellValue>,
}

impl Row {
    /// All cell values in column order
    pub fn values(&self) -> &[CellValue] {
        &self.values
    }

    /// Cell value for one column
    pub fn value(&self, column: usize) -> Option<&CellValue> {
        self.values.get(column)
    }

    /// Consume the row, yielding its cells
    pub fn into_values(self) -> Vec<CellValue> {
        self.values
    }
}
