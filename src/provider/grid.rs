//! Grid Provider
//!
//! Owns the index translator, the page cache, and the fetch coordinator, and
//! exposes the four operations the rendering widget consumes: `len`, `row_at`,
//! `apply_sort`, and `positions_for_selection`.
//!
//! All state mutation happens on the caller's thread. Remote completions are
//! queued on the coordinator's channel and applied only inside
//! [`GridProvider::process_events`], which the widget pumps from its frame
//! loop (or [`GridProvider::process_events_timeout`] when it has none).

use std::time::Duration;

use crate::cache::PageCache;
use crate::domain::{Row, RowId, SortKey};
use crate::error::Result;
use crate::index::IndexTranslator;
use crate::provider::ProviderConfig;
use crate::services::{FetchCoordinator, HttpRowStore, ProviderEvent, RowStore};

/// Sort lifecycle of a provider instance
///
/// Row reads are served only from `Unsorted` and `Sorted`; while a permutation
/// fetch is in flight the provider answers no reads and issues no page
/// fetches.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SortState {
    /// Natural order, no sort ever applied
    Unsorted,
    /// A permutation fetch is in flight
    Sorting,
    /// A sort key is applied and the index state is consistent
    Sorted,
}

/// What changed while applying queued fetch completions
#[derive(Clone, Debug, PartialEq)]
pub enum ProviderUpdate {
    /// A sort permutation was installed; every previous position is stale
    SortApplied { sort: SortKey },
    /// A permutation fetch failed; the key stays applied over natural order
    SortFailed { sort: SortKey, message: String },
    /// A page landed in the cache; its rows are now readable
    PageLoaded { page: usize },
    /// A page fetch failed; the next read of the page retries
    PageFailed { page: usize, message: String },
}

type SortCallback = Box<dyn FnOnce(Result<()>)>;

struct PendingSort {
    sort: SortKey,
    on_complete: SortCallback,
}

/// Virtualized data provider for one remotely-sorted table view
///
/// One instance per independent view; the cache and index state are owned
/// exclusively and no concurrent mutation is supported.
pub struct GridProvider<S: RowStore> {
    config: ProviderConfig,
    translator: IndexTranslator,
    cache: PageCache,
    coordinator: FetchCoordinator<S>,
    current_sort: Option<SortKey>,
    state: SortState,
    pending: Option<PendingSort>,
}

impl<S: RowStore> GridProvider<S> {
    /// Create a provider over a filtered row set
    ///
    /// When an initial sort is given, the permutation is fetched with the
    /// blocking call before the constructor returns: every other operation
    /// depends on its result being available. A failed initial fetch logs a
    /// warning and falls back to natural order with the key still recorded;
    /// the provider stays usable.
    pub fn new(
        config: ProviderConfig,
        filtered: Vec<RowId>,
        initial_sort: Option<SortKey>,
        store: S,
    ) -> Self {
        let translator = IndexTranslator::new(filtered);
        let cache = PageCache::new(config.page_size);
        let coordinator = FetchCoordinator::new(store);
        let mut provider = Self {
            config,
            translator,
            cache,
            coordinator,
            current_sort: None,
            state: SortState::Unsorted,
            pending: None,
        };
        if let Some(sort) = initial_sort {
            provider.bootstrap_sort(sort);
        }
        provider
    }

    /// Total number of rows under the active filter
    pub fn len(&self) -> usize {
        self.translator.row_count()
    }

    /// Check if the filtered set is empty
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Current sort lifecycle state
    pub fn state(&self) -> SortState {
        self.state
    }

    /// The sort key currently applied, if any
    pub fn applied_sort(&self) -> Option<SortKey> {
        self.current_sort
    }

    /// Rows per cached page
    pub fn page_size(&self) -> usize {
        self.cache.page_size()
    }

    /// Read one visible row by position
    ///
    /// Returns the row when its page is cached. On a cache miss, issues at
    /// most one chunk fetch per page per cache generation and returns `None`;
    /// the caller re-reads once [`GridProvider::process_events`] reports the
    /// page loaded. Returns `None` without fetching while a sort is in
    /// flight.
    ///
    /// # Panics
    ///
    /// Panics when `position` is outside `[0, len())`: the widget and the
    /// provider have desynchronized, which is not a recoverable state.
    pub fn row_at(&mut self, position: usize) -> Option<Row> {
        let row_count = self.translator.row_count();
        assert!(
            position < row_count,
            "row position {position} out of range for {row_count} rows"
        );
        if self.state == SortState::Sorting {
            return None;
        }

        let page = self.cache.page_for(position);
        if let Some(block) = self.cache.get(page) {
            return block.row(self.cache.offset_in_page(position));
        }

        if self.cache.begin_fetch(page) {
            let start = page * self.cache.page_size();
            let end = start + self.cache.page_size();
            let rows = self.translator.retrieval_slice(start, end).to_vec();
            // After a permutation-fetch failure the retrieval ids are plain
            // row ids again; the sort annotation must not claim otherwise.
            let sort = if self.translator.is_natural() {
                None
            } else {
                self.current_sort
            };
            self.coordinator.request_page(
                page,
                self.cache.generation(),
                rows,
                0,
                self.config.column_count,
                sort,
            );
        }
        None
    }

    /// Apply a sort key, or `None` for natural order
    ///
    /// Re-applying the currently applied key is a no-op: the callback fires
    /// immediately with `Ok` and no remote fetch is issued. `None` resets to
    /// natural order synchronously. Otherwise the provider enters `Sorting`,
    /// fetches the permutation asynchronously, and `on_complete` fires from
    /// within `process_events` once the provider is consistent again, with
    /// `Err` when the fetch failed and natural order was installed instead.
    ///
    /// A newer `apply_sort` supersedes a pending one: the superseded fetch's
    /// response is discarded when it arrives, and its callback is dropped
    /// unfired.
    pub fn apply_sort<F>(&mut self, sort: Option<SortKey>, on_complete: F)
    where
        F: FnOnce(Result<()>) + 'static,
    {
        if sort == self.current_sort && self.pending.is_none() {
            on_complete(Ok(()));
            return;
        }

        match sort {
            None => {
                self.pending = None;
                self.current_sort = None;
                self.translator.reset_natural();
                self.cache.invalidate_all();
                self.state = SortState::Unsorted;
                on_complete(Ok(()));
            }
            Some(key) => {
                self.state = SortState::Sorting;
                self.pending = Some(PendingSort {
                    sort: key,
                    on_complete: Box::new(on_complete),
                });
                self.coordinator
                    .request_sort_indices(self.translator.filtered_ids().to_vec(), key);
            }
        }
    }

    /// Translate selected row ids into current on-screen positions
    ///
    /// Ids no longer visible under the active filter are omitted. The same
    /// identifiers remain selected across sort changes even though their
    /// positions move.
    pub fn positions_for_selection(&self, ids: &[RowId]) -> Vec<usize> {
        self.translator.positions_for_ids(ids)
    }

    /// Install a new filtered row set in place
    ///
    /// Equivalent to constructing a fresh provider with the same
    /// configuration: the cache is flushed, any pending sort fetch is
    /// abandoned, and an applied sort key is re-fetched through the blocking
    /// call against the new row set.
    pub fn set_filter(&mut self, filtered: Vec<RowId>) {
        self.pending = None;
        self.translator = IndexTranslator::new(filtered);
        self.cache.invalidate_all();
        match self.current_sort {
            Some(sort) => self.bootstrap_sort(sort),
            None => self.state = SortState::Unsorted,
        }
    }

    /// Apply every fetch completion queued so far
    ///
    /// Returns what changed so the widget can re-render affected rows or
    /// show a degraded state.
    pub fn process_events(&mut self) -> Vec<ProviderUpdate> {
        let events = self.coordinator.drain();
        self.apply_events(events)
    }

    /// Wait up to `timeout` for a completion, then apply everything queued
    pub fn process_events_timeout(&mut self, timeout: Duration) -> Vec<ProviderUpdate> {
        let events = self.coordinator.drain_timeout(timeout);
        self.apply_events(events)
    }

    /// Blocking permutation fetch used at construction and filter-change time
    fn bootstrap_sort(&mut self, sort: SortKey) {
        self.current_sort = Some(sort);
        let fetched = self
            .coordinator
            .sorted_indices_blocking(self.translator.filtered_ids(), sort);
        match fetched.and_then(|permutation| self.translator.install_permutation(permutation)) {
            Ok(()) => {}
            Err(error) => {
                tracing::warn!(
                    "Initial sort fetch for {} failed: {}; falling back to natural order",
                    sort,
                    error
                );
                self.translator.reset_natural();
            }
        }
        self.cache.invalidate_all();
        self.state = SortState::Sorted;
    }

    fn apply_events(&mut self, events: Vec<ProviderEvent>) -> Vec<ProviderUpdate> {
        let mut updates = Vec::new();
        for event in events {
            self.apply_event(event, &mut updates);
        }
        updates
    }

    fn apply_event(&mut self, event: ProviderEvent, updates: &mut Vec<ProviderUpdate>) {
        match event {
            ProviderEvent::SortIndices { sort, result } => {
                let Some(pending) = self.pending.take() else {
                    tracing::debug!("Discarding sort response for {} with no fetch pending", sort);
                    return;
                };
                if pending.sort != sort {
                    tracing::debug!("Discarding superseded sort response for {}", sort);
                    self.pending = Some(pending);
                    return;
                }

                self.current_sort = Some(sort);
                let outcome = result
                    .and_then(|permutation| self.translator.install_permutation(permutation));
                self.cache.invalidate_all();
                self.state = SortState::Sorted;
                match outcome {
                    Ok(()) => {
                        updates.push(ProviderUpdate::SortApplied { sort });
                        (pending.on_complete)(Ok(()));
                    }
                    Err(error) => {
                        // The key stays applied; display falls back to
                        // natural order until the caller retries.
                        self.translator.reset_natural();
                        tracing::warn!("Sort fetch for {} failed: {}", sort, error);
                        updates.push(ProviderUpdate::SortFailed {
                            sort,
                            message: error.to_string(),
                        });
                        (pending.on_complete)(Err(error));
                    }
                }
            }
            ProviderEvent::PageChunk {
                page,
                generation,
                result,
            } => match result {
                Ok(block) => {
                    if self.cache.complete(page, generation, block) {
                        updates.push(ProviderUpdate::PageLoaded { page });
                    } else {
                        tracing::debug!("Discarding stale chunk for page {}", page);
                    }
                }
                Err(error) => {
                    let current = generation == self.cache.generation();
                    self.cache.fetch_failed(page, generation);
                    if current {
                        tracing::warn!("Chunk fetch for page {} failed: {}", page, error);
                        updates.push(ProviderUpdate::PageFailed {
                            page,
                            message: error.to_string(),
                        });
                    }
                }
            },
        }
    }
}

impl GridProvider<HttpRowStore> {
    /// Create a provider backed by the HTTP row store the config points at
    pub fn over_http(
        config: ProviderConfig,
        filtered: Vec<RowId>,
        initial_sort: Option<SortKey>,
    ) -> Result<Self> {
        let store = HttpRowStore::new(config.endpoint(), config.timeout())?;
        Ok(Self::new(config, filtered, initial_sort, store))
    }
}

impl<S: RowStore> std::fmt::Debug for GridProvider<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GridProvider")
            .field("rows", &self.len())
            .field("state", &self.state)
            .field("sort", &self.current_sort)
            .field("cached_pages", &self.cache.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{CellValue, ColumnBlock, SortDirection};
    use crate::error::Error;
    use crate::services::{ChunkRequest, SortIndicesRequest};
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
    use std::sync::{Arc, Mutex};
    use std::time::Instant;

    /// In-memory row store: ids are 0..rows, column 0 is the identity column,
    /// higher columns grow with the id so sorts are predictable.
    struct FakeInner {
        columns: Vec<Vec<f64>>,
        sort_calls: AtomicUsize,
        chunk_calls: AtomicUsize,
        fail_sorts: AtomicBool,
        fail_chunks: AtomicBool,
        last_chunk_sort: Mutex<Option<Option<SortKey>>>,
    }

    #[derive(Clone)]
    struct FakeStore {
        inner: Arc<FakeInner>,
    }

    impl FakeStore {
        fn new(rows: usize) -> Self {
            let ids: Vec<f64> = (0..rows).map(|id| id as f64).collect();
            let tens: Vec<f64> = (0..rows).map(|id| (id * 10) as f64).collect();
            let values: Vec<f64> = (0..rows).map(|id| (id * 3) as f64).collect();
            Self {
                inner: Arc::new(FakeInner {
                    columns: vec![ids, tens, values],
                    sort_calls: AtomicUsize::new(0),
                    chunk_calls: AtomicUsize::new(0),
                    fail_sorts: AtomicBool::new(false),
                    fail_chunks: AtomicBool::new(false),
                    last_chunk_sort: Mutex::new(None),
                }),
            }
        }

        fn row_total(&self) -> usize {
            self.inner.columns[0].len()
        }

        /// Ids in sorted order for one key
        fn sorted_view(&self, sort: SortKey) -> Vec<usize> {
            let column = &self.inner.columns[sort.column];
            let mut ids: Vec<usize> = (0..self.row_total()).collect();
            ids.sort_by(|a, b| column[*a].total_cmp(&column[*b]));
            if sort.direction == SortDirection::Descending {
                ids.reverse();
            }
            ids
        }

        /// For each requested id, its position in the sorted view
        fn sorted_positions(&self, rows: &[RowId], sort: SortKey) -> Vec<RowId> {
            let view = self.sorted_view(sort);
            let mut rank = vec![0usize; self.row_total()];
            for (position, id) in view.iter().enumerate() {
                rank[*id] = position;
            }
            rows.iter()
                .map(|id| RowId(rank[id.0 as usize] as i64))
                .collect()
        }

        fn compute_sorted(&self, request: &SortIndicesRequest) -> crate::error::Result<Vec<RowId>> {
            self.inner.sort_calls.fetch_add(1, Ordering::SeqCst);
            if self.inner.fail_sorts.load(Ordering::SeqCst) {
                return Err(Error::Invalid {
                    message: "simulated sort failure".to_string(),
                });
            }
            Ok(self.sorted_positions(&request.rows, request.sort))
        }

        fn sort_calls(&self) -> usize {
            self.inner.sort_calls.load(Ordering::SeqCst)
        }

        fn chunk_calls(&self) -> usize {
            self.inner.chunk_calls.load(Ordering::SeqCst)
        }
    }

    impl RowStore for FakeStore {
        fn sorted_indices_blocking(
            &self,
            request: &SortIndicesRequest,
        ) -> crate::error::Result<Vec<RowId>> {
            self.compute_sorted(request)
        }

        async fn sorted_indices(
            &self,
            request: SortIndicesRequest,
        ) -> crate::error::Result<Vec<RowId>> {
            self.compute_sorted(&request)
        }

        async fn fetch_chunk(&self, request: ChunkRequest) -> crate::error::Result<ColumnBlock> {
            self.inner.chunk_calls.fetch_add(1, Ordering::SeqCst);
            *self
                .inner
                .last_chunk_sort
                .lock()
                .expect("lock last_chunk_sort") = Some(request.sort);
            if self.inner.fail_chunks.load(Ordering::SeqCst) {
                return Err(Error::Invalid {
                    message: "simulated chunk failure".to_string(),
                });
            }
            // With a sort annotation the requested values are positions in the
            // sorted view; without one they are plain row ids.
            let view = request.sort.map(|sort| self.sorted_view(sort));
            let resolve = |value: &RowId| -> usize {
                match &view {
                    Some(view) => view[value.0 as usize],
                    None => value.0 as usize,
                }
            };
            let columns = (request.column_begin..request.column_end)
                .map(|column| {
                    request
                        .rows
                        .iter()
                        .map(|value| CellValue::Number(self.inner.columns[column][resolve(value)]))
                        .collect()
                })
                .collect();
            Ok(ColumnBlock::new(columns))
        }
    }

    fn all_ids(rows: usize) -> Vec<RowId> {
        (0..rows as i64).map(RowId).collect()
    }

    fn config() -> ProviderConfig {
        ProviderConfig {
            server_root: "http://localhost:8093".to_string(),
            model_id: "m1".to_string(),
            artifact_id: "data-table".to_string(),
            array_index: 0,
            column_count: 3,
            page_size: 50,
            timeout_secs: 5,
        }
    }

    fn provider(rows: usize, sort: Option<SortKey>) -> (GridProvider<FakeStore>, FakeStore) {
        let store = FakeStore::new(rows);
        let provider = GridProvider::new(config(), all_ids(rows), sort, store.clone());
        (provider, store)
    }

    fn pump(provider: &mut GridProvider<FakeStore>) -> Vec<ProviderUpdate> {
        provider.process_events_timeout(Duration::from_secs(2))
    }

    /// Pump until a predicate matches an update or the deadline passes
    fn pump_until(
        provider: &mut GridProvider<FakeStore>,
        matches: impl Fn(&ProviderUpdate) -> bool,
    ) -> Vec<ProviderUpdate> {
        let deadline = Instant::now() + Duration::from_secs(2);
        let mut updates = Vec::new();
        while Instant::now() < deadline {
            updates.extend(provider.process_events_timeout(Duration::from_millis(50)));
            if updates.iter().any(&matches) {
                return updates;
            }
        }
        panic!("no matching update before deadline; saw {updates:?}");
    }

    fn identity(row: &Row) -> f64 {
        row.value(0)
            .and_then(CellValue::as_f64)
            .expect("identity column")
    }

    #[test]
    fn test_natural_read_fetches_once() {
        let (mut provider, store) = provider(120, None);
        assert_eq!(provider.len(), 120);
        assert_eq!(provider.state(), SortState::Unsorted);

        assert!(provider.row_at(0).is_none());
        // Rapid repeated reads of the same unfetched page de-duplicate.
        assert!(provider.row_at(7).is_none());
        let updates = pump_until(&mut provider, |u| {
            matches!(u, ProviderUpdate::PageLoaded { page: 0 })
        });
        assert_eq!(updates, vec![ProviderUpdate::PageLoaded { page: 0 }]);

        let row = provider.row_at(0).expect("page cached");
        assert_eq!(identity(&row), 0.0);
        let row = provider.row_at(7).expect("same page");
        assert_eq!(identity(&row), 7.0);
        assert_eq!(store.chunk_calls(), 1);
    }

    #[test]
    #[should_panic(expected = "out of range")]
    fn test_row_at_out_of_range_panics() {
        let (mut provider, _store) = provider(3, None);
        provider.row_at(3);
    }

    #[test]
    fn test_descending_sort_scenario() {
        // 120 rows, page size 50, column 2 descending: the permutation fetch
        // reports row i at sorted position 119 - i, so visible row 0 is the
        // row whose original filtered position was 119.
        let (mut provider, store) = provider(120, None);
        let key = SortKey::new(2, SortDirection::Descending);

        let outcome: Arc<Mutex<Option<Result<()>>>> = Arc::new(Mutex::new(None));
        let slot = outcome.clone();
        provider.apply_sort(Some(key), move |result| {
            *slot.lock().expect("lock") = Some(result);
        });
        assert_eq!(provider.state(), SortState::Sorting);

        // No page read is served, and none fetched, while sorting.
        assert!(provider.row_at(0).is_none());
        assert_eq!(store.chunk_calls(), 0);

        pump_until(&mut provider, |u| {
            matches!(u, ProviderUpdate::SortApplied { .. })
        });
        assert_eq!(provider.state(), SortState::Sorted);
        assert_eq!(provider.applied_sort(), Some(key));
        assert!(
            outcome
                .lock()
                .expect("lock")
                .as_ref()
                .is_some_and(Result::is_ok)
        );

        assert!(provider.row_at(0).is_none());
        pump_until(&mut provider, |u| {
            matches!(u, ProviderUpdate::PageLoaded { page: 0 })
        });
        let row = provider.row_at(0).expect("page cached");
        assert_eq!(identity(&row), 119.0);
        assert_eq!(provider.positions_for_selection(&[RowId(119)]), vec![0]);
    }

    #[test]
    fn test_apply_sort_idempotent() {
        let (mut provider, store) = provider(20, None);
        let key = SortKey::new(2, SortDirection::Descending);
        provider.apply_sort(Some(key), |_| {});
        pump_until(&mut provider, |u| {
            matches!(u, ProviderUpdate::SortApplied { .. })
        });
        assert_eq!(store.sort_calls(), 1);
        let before = provider.positions_for_selection(&all_ids(20));

        let fired = Arc::new(AtomicBool::new(false));
        let flag = fired.clone();
        provider.apply_sort(Some(key), move |result| {
            assert!(result.is_ok());
            flag.store(true, Ordering::SeqCst);
        });
        assert!(fired.load(Ordering::SeqCst));
        assert_eq!(store.sort_calls(), 1);
        assert_eq!(provider.positions_for_selection(&all_ids(20)), before);
    }

    #[test]
    fn test_sort_change_flushes_cache() {
        let (mut provider, store) = provider(60, None);
        assert!(provider.row_at(0).is_none());
        pump_until(&mut provider, |u| {
            matches!(u, ProviderUpdate::PageLoaded { page: 0 })
        });
        assert!(provider.row_at(0).is_some());
        assert_eq!(store.chunk_calls(), 1);

        provider.apply_sort(Some(SortKey::new(2, SortDirection::Descending)), |_| {});
        pump_until(&mut provider, |u| {
            matches!(u, ProviderUpdate::SortApplied { .. })
        });

        // The previously cached page is stale; one fresh fetch is issued.
        assert!(provider.row_at(0).is_none());
        assert!(provider.row_at(1).is_none());
        pump_until(&mut provider, |u| {
            matches!(u, ProviderUpdate::PageLoaded { page: 0 })
        });
        assert_eq!(store.chunk_calls(), 2);
        let row = provider.row_at(0).expect("page cached");
        assert_eq!(identity(&row), 59.0);
    }

    #[test]
    fn test_stale_sort_response_superseded() {
        let (mut provider, _store) = provider(120, None);
        let first = SortKey::new(1, SortDirection::Ascending);
        let second = SortKey::new(2, SortDirection::Descending);

        let first_fired = Arc::new(AtomicBool::new(false));
        let flag = first_fired.clone();
        provider.apply_sort(Some(first), move |_| {
            flag.store(true, Ordering::SeqCst);
        });
        provider.apply_sort(Some(second), |result| assert!(result.is_ok()));

        let updates = pump_until(&mut provider, |u| {
            matches!(u, ProviderUpdate::SortApplied { .. })
        });
        // Allow the superseded response to arrive and be discarded.
        let late = provider.process_events_timeout(Duration::from_millis(200));

        let applied: Vec<_> = updates
            .iter()
            .chain(late.iter())
            .filter(|u| matches!(u, ProviderUpdate::SortApplied { .. }))
            .collect();
        assert_eq!(applied, vec![&ProviderUpdate::SortApplied { sort: second }]);
        assert_eq!(provider.applied_sort(), Some(second));
        // The first sort's state never landed and its callback never fired.
        assert_eq!(provider.positions_for_selection(&[RowId(0)]), vec![119]);
        assert!(!first_fired.load(Ordering::SeqCst));
    }

    #[test]
    fn test_sort_failure_falls_back_to_natural() {
        let (mut provider, store) = provider(10, None);
        store.inner.fail_sorts.store(true, Ordering::SeqCst);
        let key = SortKey::new(2, SortDirection::Descending);

        let outcome: Arc<Mutex<Option<Result<()>>>> = Arc::new(Mutex::new(None));
        let slot = outcome.clone();
        provider.apply_sort(Some(key), move |result| {
            *slot.lock().expect("lock") = Some(result);
        });
        pump_until(&mut provider, |u| {
            matches!(u, ProviderUpdate::SortFailed { .. })
        });

        // Failure reaches the callback, never the success path.
        assert!(
            outcome
                .lock()
                .expect("lock")
                .as_ref()
                .is_some_and(Result::is_err)
        );
        // The key stays applied over natural order, and reads are served.
        assert_eq!(provider.applied_sort(), Some(key));
        assert_eq!(provider.state(), SortState::Sorted);
        assert_eq!(provider.positions_for_selection(&[RowId(0)]), vec![0]);

        assert!(provider.row_at(0).is_none());
        pump_until(&mut provider, |u| {
            matches!(u, ProviderUpdate::PageLoaded { page: 0 })
        });
        let row = provider.row_at(0).expect("page cached");
        assert_eq!(identity(&row), 0.0);
        // The chunk request carried no sort annotation for natural ids.
        assert_eq!(
            *store.inner.last_chunk_sort.lock().expect("lock"),
            Some(None)
        );
    }

    #[test]
    fn test_failed_page_retries_on_next_read() {
        let (mut provider, store) = provider(10, None);
        store.inner.fail_chunks.store(true, Ordering::SeqCst);

        assert!(provider.row_at(0).is_none());
        pump_until(&mut provider, |u| {
            matches!(u, ProviderUpdate::PageFailed { page: 0, .. })
        });
        assert_eq!(store.chunk_calls(), 1);

        store.inner.fail_chunks.store(false, Ordering::SeqCst);
        assert!(provider.row_at(0).is_none());
        pump_until(&mut provider, |u| {
            matches!(u, ProviderUpdate::PageLoaded { page: 0 })
        });
        assert!(provider.row_at(0).is_some());
        assert_eq!(store.chunk_calls(), 2);
    }

    #[test]
    fn test_selection_survives_resort() {
        let (mut provider, _store) = provider(120, None);
        let selection = [RowId(5), RowId(9)];
        assert_eq!(provider.positions_for_selection(&selection), vec![5, 9]);

        provider.apply_sort(Some(SortKey::new(2, SortDirection::Descending)), |_| {});
        pump_until(&mut provider, |u| {
            matches!(u, ProviderUpdate::SortApplied { .. })
        });

        let positions = provider.positions_for_selection(&selection);
        assert_eq!(positions, vec![114, 110]);
        assert!(provider.row_at(positions[0]).is_none());
        pump_until(&mut provider, |u| {
            matches!(u, ProviderUpdate::PageLoaded { page: 2 })
        });
        let row = provider.row_at(positions[0]).expect("page cached");
        assert_eq!(identity(&row), 5.0);
        let row = provider.row_at(positions[1]).expect("same page");
        assert_eq!(identity(&row), 9.0);
    }

    #[test]
    fn test_initial_sort_bootstraps_blocking() {
        let key = SortKey::new(2, SortDirection::Descending);
        let (mut provider, store) = provider(120, Some(key));

        // Consistent before any event pump: the fetch was blocking.
        assert_eq!(provider.state(), SortState::Sorted);
        assert_eq!(provider.applied_sort(), Some(key));
        assert_eq!(store.sort_calls(), 1);
        assert_eq!(provider.positions_for_selection(&[RowId(119)]), vec![0]);

        assert!(provider.row_at(0).is_none());
        pump(&mut provider);
        let row = provider.row_at(0).expect("page cached");
        assert_eq!(identity(&row), 119.0);
    }

    #[test]
    fn test_set_filter_keeps_sort_key() {
        let key = SortKey::new(2, SortDirection::Descending);
        let (mut provider, store) = provider(120, Some(key));
        assert_eq!(store.sort_calls(), 1);

        provider.set_filter(all_ids(10));
        assert_eq!(provider.len(), 10);
        assert_eq!(provider.applied_sort(), Some(key));
        assert_eq!(store.sort_calls(), 2);
        assert_eq!(provider.positions_for_selection(&[RowId(9)]), vec![0]);
    }

    #[test]
    fn test_empty_filtered_set() {
        let (mut provider, store) = provider(0, None);
        assert!(provider.is_empty());

        let fired = Arc::new(AtomicBool::new(false));
        let flag = fired.clone();
        provider.apply_sort(Some(SortKey::new(1, SortDirection::Ascending)), move |r| {
            assert!(r.is_ok());
            flag.store(true, Ordering::SeqCst);
        });
        pump_until(&mut provider, |u| {
            matches!(u, ProviderUpdate::SortApplied { .. })
        });
        assert!(fired.load(Ordering::SeqCst));
        // No remote call for an empty row set.
        assert_eq!(store.sort_calls(), 0);
    }
}
