//! Grid View Adapter
//!
//! The public surface consumed by the rendering widget: row count, virtualized
//! row reads, sort application, and selection translation.

mod config;
mod grid;

pub use config::*;
pub use grid::*;
