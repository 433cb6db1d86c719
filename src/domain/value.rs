//! Cell Values
//!
//! Explicit nullable value type per table cell. How a `Null` renders (blank,
//! dash, etc.) is the widget's concern, not the provider's.

use serde::{Deserialize, Serialize};

/// A single table cell: a number, a string, or explicitly empty
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CellValue {
    /// Numeric cell
    Number(f64),
    /// Textual cell
    Text(String),
    /// Missing value (JSON `null` on the wire)
    Null,
}

impl CellValue {
    /// Check whether this cell is empty
    pub fn is_null(&self) -> bool {
        matches!(self, CellValue::Null)
    }

    /// Numeric view of the cell, if it holds a number
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            CellValue::Number(n) => Some(*n),
            _ => None,
        }
    }

    /// Textual view of the cell, if it holds a string
    pub fn as_str(&self) -> Option<&str> {
        match self {
            CellValue::Text(s) => Some(s),
            _ => None,
        }
    }
}

impl From<f64> for CellValue {
    fn from(n: f64) -> Self {
        CellValue::Number(n)
    }
}

impl From<String> for CellValue {
    fn from(s: String) -> Self {
        CellValue::Text(s)
    }
}

impl From<&str> for CellValue {
    fn from(s: &str) -> Self {
        CellValue::Text(s.to_string())
    }
}
