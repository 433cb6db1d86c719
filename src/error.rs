//! Error types for gridfeed
//!
//! Centralized error handling using snafu for ergonomic error definitions.

use snafu::Snafu;

/// Main error type for the provider
#[derive(Debug, Snafu)]
pub enum Error {
    /// Invalid input or configuration
    #[snafu(display("Invalid: {message}"))]
    Invalid { message: String },

    /// Transport failure on a remote call
    #[snafu(display("Transport error: {source}"))]
    Transport { source: reqwest::Error },

    /// Remote service answered with a non-success status
    #[snafu(display("HTTP {status} from {url}"))]
    Http { status: u16, url: String },

    /// Malformed binary response payload
    #[snafu(display("Decode error: {message}"))]
    Decode { message: String },

    /// JSON deserialization error
    #[snafu(display("JSON error: {source}"))]
    Json { source: serde_json::Error },
}

impl From<reqwest::Error> for Error {
    fn from(source: reqwest::Error) -> Self {
        Error::Transport { source }
    }
}

impl From<serde_json::Error> for Error {
    fn from(source: serde_json::Error) -> Self {
        Error::Json { source }
    }
}

/// Result type alias for convenience
pub type Result<T, E = Error> = std::result::Result<T, E>;
