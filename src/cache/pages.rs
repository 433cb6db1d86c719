//! Page-Granular Block Cache
//!
//! Maps page numbers to fetched column blocks. The whole cache is flushed on
//! every sort or filter change; a generation counter stamps each outstanding
//! fetch so stale completions are discarded instead of resurrecting old data.

use ahash::{AHashMap, AHashSet};

use crate::constants::DEFAULT_PAGE_SIZE;
use crate::domain::ColumnBlock;

/// Cache of fetched pages, keyed by page number
#[derive(Clone, Debug)]
pub struct PageCache {
    /// Fetched blocks by page number
    pages: AHashMap<usize, ColumnBlock>,
    /// Pages with a fetch outstanding in the current generation
    in_flight: AHashSet<usize>,
    /// Bumped on every invalidation; stamps outstanding fetches
    generation: u64,
    /// Rows per page
    page_size: usize,
}

impl PageCache {
    /// Create an empty cache with the given page size
    pub fn new(page_size: usize) -> Self {
        Self {
            pages: AHashMap::new(),
            in_flight: AHashSet::new(),
            generation: 0,
            page_size: page_size.max(1),
        }
    }

    /// Rows per page
    pub fn page_size(&self) -> usize {
        self.page_size
    }

    /// Current cache generation
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Page number holding a retrieval position
    pub fn page_for(&self, position: usize) -> usize {
        position / self.page_size
    }

    /// Offset of a retrieval position within its page
    pub fn offset_in_page(&self, position: usize) -> usize {
        position % self.page_size
    }

    /// Cached block for a page, if fetched
    pub fn get(&self, page: usize) -> Option<&ColumnBlock> {
        self.pages.get(&page)
    }

    /// Number of cached pages
    pub fn len(&self) -> usize {
        self.pages.len()
    }

    /// Check if no pages are cached
    pub fn is_empty(&self) -> bool {
        self.pages.is_empty()
    }

    /// Claim a page for fetching
    ///
    /// Returns `true` exactly once per page per generation: repeated reads of
    /// an unfetched page must not issue duplicate remote requests.
    pub fn begin_fetch(&mut self, page: usize) -> bool {
        if self.pages.contains_key(&page) || self.in_flight.contains(&page) {
            return false;
        }
        self.in_flight.insert(page);
        true
    }

    /// Store a completed fetch
    ///
    /// Rejects blocks stamped with a stale generation; the retrieval order has
    /// changed since the request was issued and the payload no longer means
    /// what its page number says.
    pub fn complete(&mut self, page: usize, generation: u64, block: ColumnBlock) -> bool {
        if generation != self.generation {
            return false;
        }
        self.in_flight.remove(&page);
        self.pages.insert(page, block);
        true
    }

    /// Record a failed fetch so a later read retries the page
    pub fn fetch_failed(&mut self, page: usize, generation: u64) {
        if generation == self.generation {
            self.in_flight.remove(&page);
        }
    }

    /// Flush every cached page and bump the generation
    ///
    /// No partial invalidation: a sort change redefines the meaning of every
    /// retrieval position.
    pub fn invalidate_all(&mut self) {
        self.pages.clear();
        self.in_flight.clear();
        self.generation += 1;
    }
}

impl Default for PageCache {
    fn default() -> Self {
        Self::new(DEFAULT_PAGE_SIZE)
    }
}
