//! Load-once cache of lap tables keyed by file path.
//!
//! [`LapStore::get`] loads a table the first time a path is requested and
//! hands out the cached copy afterwards. Paths are canonicalised so that
//! `./data/laps.csv` and its absolute form share one entry. Failed loads are
//! never cached.

use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use pitwall_core::error::Result;
use pitwall_data::table::LapTable;

/// A cached table and the moment it was loaded.
struct CachedTable {
    table: LapTable,
    loaded_at: Instant,
}

/// Explicit in-memory cache of loaded lap tables.
///
/// # Example
/// ```no_run
/// use pitwall_runtime::store::LapStore;
/// use std::path::Path;
///
/// let mut store = LapStore::new();
/// let table = store.get(Path::new("data/processed/laps_2024_cleaned.csv"))?;
/// println!("{} laps", table.len());
/// # Ok::<(), pitwall_core::PitwallError>(())
/// ```
#[derive(Default)]
pub struct LapStore {
    tables: HashMap<PathBuf, CachedTable>,
}

impl LapStore {
    pub fn new() -> Self {
        Self::default()
    }

    // ── Public API ────────────────────────────────────────────────────────

    /// Return the table for `path`, loading it on first use.
    pub fn get(&mut self, path: &Path) -> Result<&LapTable> {
        match self.tables.entry(cache_key(path)) {
            Entry::Occupied(entry) => {
                tracing::debug!(path = %entry.key().display(), "returning cached lap table");
                Ok(&entry.into_mut().table)
            }
            Entry::Vacant(entry) => {
                let started = Instant::now();
                let table = LapTable::load(path)?;
                tracing::info!(
                    path = %entry.key().display(),
                    laps = table.len(),
                    elapsed_ms = started.elapsed().as_millis() as u64,
                    "lap table loaded"
                );
                let cached = entry.insert(CachedTable {
                    table,
                    loaded_at: Instant::now(),
                });
                Ok(&cached.table)
            }
        }
    }

    /// Drop the cached table for `path`. Returns `true` if one was cached.
    pub fn invalidate(&mut self, path: &Path) -> bool {
        let removed = self.tables.remove(&cache_key(path)).is_some();
        if removed {
            tracing::debug!(path = %path.display(), "lap table invalidated");
        }
        removed
    }

    /// Drop every cached table.
    pub fn clear(&mut self) {
        self.tables.clear();
    }

    /// Paths with a cached table, sorted.
    pub fn cached_paths(&self) -> Vec<PathBuf> {
        let mut paths: Vec<PathBuf> = self.tables.keys().cloned().collect();
        paths.sort();
        paths
    }

    /// Time since the table for `path` was loaded, or `None` if not cached.
    pub fn load_age(&self, path: &Path) -> Option<Duration> {
        self.tables
            .get(&cache_key(path))
            .map(|cached| cached.loaded_at.elapsed())
    }
}

/// Canonical form of `path` when it exists, otherwise the path as given.
fn cache_key(path: &Path) -> PathBuf {
    std::fs::canonicalize(path).unwrap_or_else(|_| path.to_path_buf())
}

// ── Tests ─────────────────────────────────────────────────────────────────────
