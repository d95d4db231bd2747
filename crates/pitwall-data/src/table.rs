//! The loaded season lap table.

use std::path::{Path, PathBuf};

use pitwall_core::error::Result;
use pitwall_core::models::LapRecord;

use crate::aggregator::LapAggregator;
use crate::reader::load_laps;

/// Lap records loaded from one source path.
#[derive(Debug, Clone)]
pub struct LapTable {
    source: PathBuf,
    records: Vec<LapRecord>,
}

impl LapTable {
    /// Load the table from a CSV file or a directory of CSV files.
    pub fn load(path: &Path) -> Result<Self> {
        Ok(Self {
            source: path.to_path_buf(),
            records: load_laps(path)?,
        })
    }

    /// Wrap records that were built in memory.
    pub fn from_records(source: impl Into<PathBuf>, records: Vec<LapRecord>) -> Self {
        Self {
            source: source.into(),
            records,
        }
    }

    pub fn source(&self) -> &Path {
        &self.source
    }

    pub fn records(&self) -> &[LapRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Sorted unique race names in the table.
    pub fn races(&self) -> Vec<String> {
        LapAggregator::races(&self.records)
    }

    /// Sorted unique drivers with laps in `race`.
    pub fn drivers(&self, race: &str) -> Vec<String> {
        LapAggregator::drivers(&self.records, race)
    }
}
