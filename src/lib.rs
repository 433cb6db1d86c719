//! gridfeed
//!
//! Virtualized data provider for remotely-sorted tabular grids: fetches only
//! the rows currently visible, keeps the caller's row identity consistent
//! across server-computed sort orders, and caches fetched pages until a sort
//! or filter change invalidates them.

pub mod cache;
pub mod constants;
pub mod domain;
pub mod error;
pub mod index;
pub mod provider;
pub mod services;
