//! Sort Keys
//!
//! The sort criterion applied to the remote table. `None` at the call sites
//! means natural (filtered) order.

use serde::{Deserialize, Serialize};

/// Sort direction for a column
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    Ascending,
    Descending,
}

impl SortDirection {
    /// Wire representation used in query strings
    pub fn as_str(&self) -> &'static str {
        match self {
            SortDirection::Ascending => "ascending",
            SortDirection::Descending => "descending",
        }
    }
}

impl std::fmt::Display for SortDirection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A fully specified sort criterion: column plus direction
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SortKey {
    /// Zero-based column index in the remote table
    pub column: usize,
    /// Sort direction
    pub direction: SortDirection,
}

impl SortKey {
    /// Create a new sort key
    pub fn new(column: usize, direction: SortDirection) -> Self {
        Self { column, direction }
    }

    /// Wire representation, e.g. `2:descending`
    pub fn wire_value(&self) -> String {
        format!("{}:{}", self.column, self.direction)
    }
}

impl std::fmt::Display for SortKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.column, self.direction)
    }
}
