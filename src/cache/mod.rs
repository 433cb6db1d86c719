//! Page Cache
//!
//! Lazy, page-granular memoization of column data in retrieval-position space.

mod pages;

pub use pages::*;
