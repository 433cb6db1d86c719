//! Index Translator
//!
//! Side-effect-free arithmetic over the provider's three index spaces.
//!
//! - *filtered*: positions into the fixed candidate row set, caller-assigned.
//! - *sorted*: per filtered position, the row's position in the server-side
//!   sorted view, as returned by the sort-permutation call.
//! - *retrieval*: the sorted values re-sorted ascending. Page fetches slice
//!   this space so contiguous requests stay contiguous on the remote store.
//!
//! With no sort applied, all three spaces coincide with the filtered set.

use ahash::AHashMap;

use crate::domain::RowId;
use crate::error::{Error, Result};

/// Translator between filtered, sorted, and retrieval index spaces
#[derive(Clone, Debug)]
pub struct IndexTranslator {
    /// The fixed candidate rows, in caller order
    filtered: Vec<RowId>,
    /// Sorted-view position per filtered position; equals `filtered` when natural
    sorted: Vec<RowId>,
    /// Ascending copy of `sorted`; the fetch order
    retrieval: Vec<RowId>,
    /// Row id -> filtered position, built once per filter set
    positions: AHashMap<RowId, usize>,
    /// Whether the natural (unpermuted) order is in effect
    natural: bool,
}

impl IndexTranslator {
    /// Create a translator over a fixed filtered set, in natural order
    pub fn new(filtered: Vec<RowId>) -> Self {
        let positions = filtered
            .iter()
            .enumerate()
            .map(|(position, id)| (*id, position))
            .collect();
        let sorted = filtered.clone();
        let retrieval = filtered.clone();
        Self {
            filtered,
            sorted,
            retrieval,
            positions,
            natural: true,
        }
    }

    /// Number of rows in the filtered set
    pub fn row_count(&self) -> usize {
        self.filtered.len()
    }

    /// Whether the natural order is in effect (no permutation installed)
    pub fn is_natural(&self) -> bool {
        self.natural
    }

    /// The filtered row ids, in caller order
    pub fn filtered_ids(&self) -> &[RowId] {
        &self.filtered
    }

    /// Install a sort permutation from the remote sort-index call
    ///
    /// The response carries, per filtered position, the row's position in the
    /// sorted view. A response with fewer than two elements is taken verbatim
    /// as an already-sorted sequence, never mistaken for an empty result.
    pub fn install_permutation(&mut self, sorted: Vec<RowId>) -> Result<()> {
        if sorted.len() != self.filtered.len() {
            return Err(Error::Decode {
                message: format!(
                    "sort permutation has {} entries for {} filtered rows",
                    sorted.len(),
                    self.filtered.len()
                ),
            });
        }
        let mut retrieval = sorted.clone();
        retrieval.sort_unstable();
        self.sorted = sorted;
        self.retrieval = retrieval;
        self.natural = false;
        Ok(())
    }

    /// Drop any installed permutation, restoring the natural order
    pub fn reset_natural(&mut self) {
        self.sorted = self.filtered.clone();
        self.retrieval = self.filtered.clone();
        self.natural = true;
    }

    /// Translate a filtered position into its current retrieval position
    ///
    /// Returns `None` only when `filtered_position` falls outside
    /// `[0, row_count)`.
    pub fn to_retrieval_position(&self, filtered_position: usize) -> Option<usize> {
        if filtered_position >= self.filtered.len() {
            return None;
        }
        if self.natural {
            return Some(filtered_position);
        }
        let sorted_value = self.sorted[filtered_position];
        // Retrieval order is ascending by construction, so rank = search index.
        self.retrieval.binary_search(&sorted_value).ok()
    }

    /// Translate row ids into current retrieval positions
    ///
    /// Ids absent from the filtered set are silently omitted; they are no
    /// longer visible under the active filter.
    pub fn positions_for_ids(&self, ids: &[RowId]) -> Vec<usize> {
        ids.iter()
            .filter_map(|id| self.positions.get(id))
            .filter_map(|&filtered_position| self.to_retrieval_position(filtered_position))
            .collect()
    }

    /// The retrieval-order ids for one contiguous range, clamped to row count
    pub fn retrieval_slice(&self, start: usize, end: usize) -> &[RowId] {
        let end = end.min(self.retrieval.len());
        let start = start.min(end);
        &self.retrieval[start..end]
    }
}
