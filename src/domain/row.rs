//! Row Identity
//!
//! Opaque identifiers naming underlying rows. Assigned by the data source,
//! stable across sorts and filters.

use serde::{Deserialize, Serialize};

/// Unique identifier for one underlying row
///
/// Decoded from the wire as a signed 32-bit integer and widened, so callers
/// with larger local id spaces still fit.
#[derive(Clone, Copy, Debug, Hash, Eq, PartialEq, Ord, PartialOrd, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RowId(pub i64);

impl RowId {
    /// Get the underlying integer value
    pub fn value(&self) -> i64 {
        self.0
    }
}

impl From<i64> for RowId {
    fn from(id: i64) -> Self {
        Self(id)
    }
}

impl From<i32> for RowId {
    fn from(id: i32) -> Self {
        Self(i64::from(id))
    }
}

impl std::fmt::Display for RowId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Render a list of row ids as the comma-separated wire form
pub fn join_row_ids(ids: &[RowId]) -> String {
    let mut out = String::with_capacity(ids.len() * 4);
    for (i, id) in ids.iter().enumerate() {
        if i > 0 {
            out.push(',');
        }
        out.push_str(&id.0.to_string());
    }
    out
}
