//! Fetch Coordinator
//!
//! Issues remote calls against a [`RowStore`] and multiplexes their
//! completions onto a single channel for the provider to drain. Asynchronous
//! fetches run as detached tokio tasks; the blocking sort-index call runs on
//! the caller's thread.

use std::sync::Arc;
use std::time::Duration;

use crossbeam_channel::{Receiver, Sender};

use crate::domain::{RowId, SortKey};
use crate::error::Result;
use crate::services::runtime::spawn_in_tokio;
use crate::services::transport::{ChunkRequest, RowStore, SortIndicesRequest};
use crate::services::ProviderEvent;

/// Coordinator for one provider instance's remote fetches
pub struct FetchCoordinator<S: RowStore> {
    store: Arc<S>,
    tx: Sender<ProviderEvent>,
    rx: Receiver<ProviderEvent>,
}

impl<S: RowStore> FetchCoordinator<S> {
    /// Create a coordinator over a row store
    pub fn new(store: S) -> Self {
        let (tx, rx) = crossbeam_channel::unbounded();
        Self {
            store: Arc::new(store),
            tx,
            rx,
        }
    }

    /// Fetch a sort permutation, blocking until it resolves
    ///
    /// An empty row set short-circuits to an empty permutation without a
    /// remote call; a single-row request resolves through the store so the
    /// response decoding handles the one-element case uniformly.
    pub fn sorted_indices_blocking(&self, rows: &[RowId], sort: SortKey) -> Result<Vec<RowId>> {
        if rows.is_empty() {
            return Ok(Vec::new());
        }
        let request = SortIndicesRequest::new(rows.to_vec(), sort);
        self.store.sorted_indices_blocking(&request)
    }

    /// Issue an asynchronous sort-permutation fetch
    ///
    /// The completion arrives as [`ProviderEvent::SortIndices`] tagged with
    /// the sort key, so superseded responses can be told apart.
    pub fn request_sort_indices(&self, rows: Vec<RowId>, sort: SortKey) {
        if rows.is_empty() {
            let _ = self.tx.send(ProviderEvent::SortIndices {
                sort,
                result: Ok(Vec::new()),
            });
            return;
        }
        let store = self.store.clone();
        let tx = self.tx.clone();
        spawn_in_tokio(async move {
            let result = store.sorted_indices(SortIndicesRequest::new(rows, sort)).await;
            let _ = tx.send(ProviderEvent::SortIndices { sort, result });
        });
    }

    /// Issue an asynchronous page-chunk fetch
    ///
    /// The completion arrives as [`ProviderEvent::PageChunk`] keyed by page
    /// number and stamped with the cache generation it was issued against.
    pub fn request_page(
        &self,
        page: usize,
        generation: u64,
        rows: Vec<RowId>,
        column_begin: usize,
        column_end: usize,
        sort: Option<SortKey>,
    ) {
        let request = ChunkRequest {
            rows,
            column_begin,
            column_end,
            sort,
        };
        let store = self.store.clone();
        let tx = self.tx.clone();
        spawn_in_tokio(async move {
            let result = store.fetch_chunk(request).await;
            let _ = tx.send(ProviderEvent::PageChunk {
                page,
                generation,
                result,
            });
        });
    }

    /// Drain every completion queued so far without waiting
    pub fn drain(&self) -> Vec<ProviderEvent> {
        self.rx.try_iter().collect()
    }

    /// Wait up to `timeout` for one completion, then drain the rest
    pub fn drain_timeout(&self, timeout: Duration) -> Vec<ProviderEvent> {
        let mut events = Vec::new();
        if let Ok(event) = self.rx.recv_timeout(timeout) {
            events.push(event);
            events.extend(self.rx.try_iter());
        }
        events
    }
}

impl<S: RowStore> std::fmt::Debug for FetchCoordinator<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FetchCoordinator")
            .field("queued", &self.rx.len())
            .finish()
    }
}
