//! Fetch Completion Events
//!
//! Results of remote calls, queued on the coordinator's channel and applied
//! by the provider on its own thread. Page completions may arrive in any
//! order; each carries the keys needed to tell fresh results from stale ones.

use crate::domain::{ColumnBlock, RowId, SortKey};
use crate::error::Result;

/// A completed remote fetch
#[derive(Debug)]
pub enum ProviderEvent {
    /// A sort-permutation fetch finished
    SortIndices {
        /// The sort key the fetch was issued for
        sort: SortKey,
        /// Decoded permutation, or the failure
        result: Result<Vec<RowId>>,
    },
    /// A page-chunk fetch finished
    PageChunk {
        /// Page number the fetch was issued for
        page: usize,
        /// Cache generation the fetch was issued against
        generation: u64,
        /// Decoded block, or the failure
        result: Result<ColumnBlock>,
    },
}
