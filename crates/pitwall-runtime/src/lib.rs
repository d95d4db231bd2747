//! Runtime layer for pitwall.
//!
//! Owns the load-once lap table store that the binary passes into each
//! aggregation call.

pub mod store;

pub use pitwall_core as core;
pub use pitwall_data as data;
