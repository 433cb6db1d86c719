//! Provider Constants
//!
//! Centralized tuning constants for the data provider.

/// Rows per cached page; trades request count against per-request payload size
pub const DEFAULT_PAGE_SIZE: usize = 50;

/// Default transport timeout for remote fetches
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Array index within the remote table artifact
pub const DEFAULT_ARRAY_INDEX: usize = 0;

/// Index column name advertised on every remote call
pub const INDEX_COLUMN: &str = "Index";
