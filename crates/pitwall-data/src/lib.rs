//! Data layer for pitwall.
//!
//! Discovers and reads the season lap table, checks its ordering invariants,
//! and runs the lap aggregation pipeline (tire stints, degradation curves,
//! team pace and the pit-stop summaries built on top of them).

pub mod aggregator;
pub mod reader;
pub mod table;
pub mod validation;

#[cfg(test)]
pub(crate) mod test_support;

pub use aggregator::LapAggregator;
pub use pitwall_core as core;
pub use table::LapTable;
