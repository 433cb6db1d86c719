//! Row-Store Transport
//!
//! The `RowStore` trait is the seam between the provider and the remote
//! row-store service. The blocking sort-index call is a distinct method with a
//! distinct calling convention: it is the provider's only permitted blocking
//! remote operation, and keeping it separate makes that auditable at the type
//! level.

use std::future::Future;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::constants::INDEX_COLUMN;
use crate::domain::{ColumnBlock, RowId, SortKey, join_row_ids};
use crate::error::{Error, Result};
use crate::services::codec::{self, ByteOrder};

/// Request for a sort permutation over a fixed row set
#[derive(Clone, Debug)]
pub struct SortIndicesRequest {
    /// Row ids to sort, in filtered order
    pub rows: Vec<RowId>,
    /// Sort criterion
    pub sort: SortKey,
    /// Byte order the response must be encoded in
    pub byte_order: ByteOrder,
}

impl SortIndicesRequest {
    /// Build a request in the client's native byte order
    pub fn new(rows: Vec<RowId>, sort: SortKey) -> Self {
        Self {
            rows,
            sort,
            byte_order: ByteOrder::native(),
        }
    }
}

/// Request for column data over a contiguous retrieval range
#[derive(Clone, Debug)]
pub struct ChunkRequest {
    /// Ascending row ids to retrieve
    pub rows: Vec<RowId>,
    /// First column, inclusive
    pub column_begin: usize,
    /// Last column, exclusive
    pub column_end: usize,
    /// Advisory sort annotation for server-side logging/consistency
    pub sort: Option<SortKey>,
}

/// Remote row-store operations
///
/// One blocking method, two asynchronous ones. Implementations must be cheap
/// to share behind an `Arc`.
pub trait RowStore: Send + Sync + 'static {
    /// Fetch a sort permutation, blocking the calling thread
    ///
    /// Used only at construction and filter-change time, when every subsequent
    /// index calculation depends on the result.
    fn sorted_indices_blocking(&self, request: &SortIndicesRequest) -> Result<Vec<RowId>>;

    /// Fetch a sort permutation asynchronously
    fn sorted_indices(
        &self,
        request: SortIndicesRequest,
    ) -> impl Future<Output = Result<Vec<RowId>>> + Send;

    /// Fetch column data for a contiguous retrieval range
    fn fetch_chunk(&self, request: ChunkRequest) -> impl Future<Output = Result<ColumnBlock>> + Send;
}

/// Address of one remote table artifact
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct TableEndpoint {
    /// Server root, e.g. `https://host:port/`
    pub server_root: String,
    /// Model identifier
    pub model_id: String,
    /// Table artifact identifier
    pub artifact_id: String,
    /// Array index within the artifact
    pub array_index: usize,
}

impl TableEndpoint {
    fn array_root(&self) -> String {
        format!(
            "{}/models/{}/tables/{}/arrays/{}",
            self.server_root.trim_end_matches('/'),
            self.model_id,
            self.artifact_id,
            self.array_index
        )
    }

    /// URL of the sort-permutation call
    pub fn sorted_indices_url(&self, request: &SortIndicesRequest) -> String {
        format!(
            "{}/sorted-indices?rows={}&index={}&byteorder={}&sort={}",
            self.array_root(),
            join_row_ids(&request.rows),
            INDEX_COLUMN,
            request.byte_order,
            request.sort.wire_value()
        )
    }

    /// URL of the chunk call
    pub fn chunk_url(&self, request: &ChunkRequest) -> String {
        let mut url = format!(
            "{}/chunk?rows={}&columns={}-{}&index={}",
            self.array_root(),
            join_row_ids(&request.rows),
            request.column_begin,
            request.column_end,
            INDEX_COLUMN
        );
        if let Some(sort) = request.sort {
            url.push_str("&sort=");
            url.push_str(&sort.wire_value());
        }
        url
    }
}

/// HTTP implementation of [`RowStore`] over reqwest
pub struct HttpRowStore {
    endpoint: TableEndpoint,
    client: reqwest::Client,
    timeout: Duration,
}

impl HttpRowStore {
    /// Create a store for one table endpoint
    ///
    /// Timeout semantics for every fetch are delegated to the underlying
    /// clients; a timed-out fetch surfaces as a transport failure.
    pub fn new(endpoint: TableEndpoint, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            endpoint,
            client,
            timeout,
        })
    }

    /// The endpoint this store addresses
    pub fn endpoint(&self) -> &TableEndpoint {
        &self.endpoint
    }

    fn check_status(status: reqwest::StatusCode, url: &str) -> Result<()> {
        if status.is_success() {
            return Ok(());
        }
        Err(Error::Http {
            status: status.as_u16(),
            url: url.to_string(),
        })
    }

    fn check_columns(block: &ColumnBlock, request: &ChunkRequest) -> Result<()> {
        let expected = request.column_end.saturating_sub(request.column_begin);
        if block.column_count() != expected {
            return Err(Error::Decode {
                message: format!(
                    "chunk carries {} columns, requested {}",
                    block.column_count(),
                    expected
                ),
            });
        }
        Ok(())
    }
}

impl RowStore for HttpRowStore {
    fn sorted_indices_blocking(&self, request: &SortIndicesRequest) -> Result<Vec<RowId>> {
        let url = self.endpoint.sorted_indices_url(request);
        tracing::debug!("Blocking sort-index fetch: {}", url);

        // The async client cannot serve a synchronous caller; a dedicated
        // blocking client runs the one permitted blocking call.
        let client = reqwest::blocking::Client::builder()
            .timeout(self.timeout)
            .build()?;
        let response = client.get(&url).send()?;
        Self::check_status(response.status(), &url)?;
        let bytes = response.bytes()?;
        codec::decode_indices(&bytes, request.byte_order)
    }

    async fn sorted_indices(&self, request: SortIndicesRequest) -> Result<Vec<RowId>> {
        let url = self.endpoint.sorted_indices_url(&request);
        tracing::debug!("Sort-index fetch: {}", url);

        let response = self.client.get(&url).send().await?;
        Self::check_status(response.status(), &url)?;
        let bytes = response.bytes().await?;
        codec::decode_indices(&bytes, request.byte_order)
    }

    async fn fetch_chunk(&self, request: ChunkRequest) -> Result<ColumnBlock> {
        let url = self.endpoint.chunk_url(&request);
        tracing::debug!("Chunk fetch: {}", url);

        let response = self.client.get(&url).send().await?;
        Self::check_status(response.status(), &url)?;
        let block: ColumnBlock = response.json().await?;
        Self::check_columns(&block, &request)?;
        Ok(block)
    }
}

impl std::fmt::Debug for HttpRowStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpRowStore")
            .field("endpoint", &self.endpoint)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::SortDirection;

    fn endpoint() -> TableEndpoint {
        TableEndpoint {
            server_root: "https://example.com/".to_string(),
            model_id: "m1".to_string(),
            artifact_id: "data-table".to_string(),
            array_index: 0,
        }
    }

    #[test]
    fn test_sorted_indices_url() {
        let request = SortIndicesRequest {
            rows: vec![RowId(4), RowId(2), RowId(9)],
            sort: SortKey::new(2, SortDirection::Descending),
            byte_order: ByteOrder::Little,
        };
        assert_eq!(
            endpoint().sorted_indices_url(&request),
            "https://example.com/models/m1/tables/data-table/arrays/0/sorted-indices\
             ?rows=4,2,9&index=Index&byteorder=little&sort=2:descending"
        );
    }

    #[test]
    fn test_chunk_url_with_and_without_sort() {
        let mut request = ChunkRequest {
            rows: vec![RowId(0), RowId(1)],
            column_begin: 0,
            column_end: 3,
            sort: None,
        };
        assert_eq!(
            endpoint().chunk_url(&request),
            "https://example.com/models/m1/tables/data-table/arrays/0/chunk\
             ?rows=0,1&columns=0-3&index=Index"
        );

        request.sort = Some(SortKey::new(1, SortDirection::Ascending));
        assert_eq!(
            endpoint().chunk_url(&request),
            "https://example.com/models/m1/tables/data-table/arrays/0/chunk\
             ?rows=0,1&columns=0-3&index=Index&sort=1:ascending"
        );
    }
}
