//! Index Translation
//!
//! Pure conversions between the three index spaces the provider juggles:
//! filtered (caller row identity), sorted (remote sort result), and retrieval
//! (ascending fetch order).

mod translator;

pub use translator::*;
