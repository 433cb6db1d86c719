//! Provider Configuration
//!
//! Construction-time settings: where the remote table lives, how wide it is,
//! and the paging/timeout tuning.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::constants::{DEFAULT_ARRAY_INDEX, DEFAULT_PAGE_SIZE, DEFAULT_TIMEOUT_SECS};
use crate::services::TableEndpoint;

/// Configuration for one provider instance
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ProviderConfig {
    /// Server root, e.g. `https://host:port/`
    pub server_root: String,
    /// Model identifier
    pub model_id: String,
    /// Table artifact identifier
    pub artifact_id: String,
    /// Array index within the artifact
    #[serde(default = "default_array_index")]
    pub array_index: usize,
    /// Number of columns fetched per chunk
    pub column_count: usize,
    /// Rows per cached page
    #[serde(default = "default_page_size")]
    pub page_size: usize,
    /// Transport timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_array_index() -> usize {
    DEFAULT_ARRAY_INDEX
}

fn default_page_size() -> usize {
    DEFAULT_PAGE_SIZE
}

fn default_timeout_secs() -> u64 {
    DEFAULT_TIMEOUT_SECS
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            server_root: String::new(),
            model_id: String::new(),
            artifact_id: String::new(),
            array_index: DEFAULT_ARRAY_INDEX,
            column_count: 0,
            page_size: DEFAULT_PAGE_SIZE,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }
}

impl ProviderConfig {
    /// The remote table address this configuration points at
    pub fn endpoint(&self) -> TableEndpoint {
        TableEndpoint {
            server_root: self.server_root.clone(),
            model_id: self.model_id.clone(),
            artifact_id: self.artifact_id.clone(),
            array_index: self.array_index,
        }
    }

    /// Transport timeout as a duration
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}
