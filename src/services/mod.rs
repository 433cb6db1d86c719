//! Remote Fetch Layer
//!
//! Translates logical requests into the row-store service's two remote
//! operations and delivers completions back to the provider.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────┐
//! │                   FetchCoordinator                        │
//! │  ┌──────────────┐  ┌─────────────┐  ┌────────────────┐  │
//! │  │   RowStore   │  │    codec    │  │    runtime     │  │
//! │  │ (HTTP seam)  │  │ (i32 wire)  │  │ (tokio bridge) │  │
//! │  └──────────────┘  └─────────────┘  └────────────────┘  │
//! └──────────────────────────────────────────────────────────┘
//!                          │
//!                          ▼ ProviderEvent
//! ┌──────────────────────────────────────────────────────────┐
//! │              GridProvider::process_events                 │
//! └──────────────────────────────────────────────────────────┘
//! ```

pub mod codec;
mod coordinator;
mod events;
mod runtime;
mod transport;

pub use coordinator::*;
pub use events::*;
pub use runtime::*;
pub use transport::*;
