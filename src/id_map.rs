//! Series ↔ TMDb ID correspondence cache
//!
//! Remembers which TMDb series a `"Name (Year)"` (or a TVDb ID) resolved to,
//! so repeated runs skip the identity search.

use crate::identity::SeriesIdentity;
use crate::storage::{JsonDatabase, StorageError};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// One resolved series.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdMapping {
    /// Natural key of the series, `"Name (Year)"`
    pub series: String,
    pub tmdb_id: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tvdb_id: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub imdb_id: Option<String>,
}

impl IdMapping {
    /// Builds a mapping from a series whose TMDb ID is known.
    pub fn from_series(series: &SeriesIdentity) -> Option<Self> {
        Some(Self {
            series: series.full_name(),
            tmdb_id: series.tmdb_id?,
            tvdb_id: series.tvdb_id,
            imdb_id: series.imdb_id.clone(),
        })
    }

    /// Copies every ID this mapping knows into `series`, keeping IDs it
    /// already has.
    pub fn apply_to(&self, series: &mut SeriesIdentity) {
        series.tmdb_id.get_or_insert(self.tmdb_id);
        if series.tvdb_id.is_none() {
            series.tvdb_id = self.tvdb_id;
        }
        if series.imdb_id.is_none() {
            series.imdb_id = self.imdb_id.clone();
        }
    }
}

/// File-backed identifier map.
pub struct IdentifierMap {
    database: JsonDatabase<Vec<IdMapping>>,
    entries: Vec<IdMapping>,
}

impl IdentifierMap {
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, StorageError> {
        let database = JsonDatabase::open(path)?;
        let entries = database.load()?;
        Ok(Self { database, entries })
    }

    /// Looks up a mapping by TVDb series ID.
    pub fn by_tvdb_id(&self, tvdb_id: u64) -> Option<&IdMapping> {
        self.entries
            .iter()
            .find(|entry| entry.tvdb_id == Some(tvdb_id))
    }

    /// Looks up a mapping by natural key.
    pub fn by_series(&self, full_name: &str) -> Option<&IdMapping> {
        self.entries.iter().find(|entry| entry.series == full_name)
    }

    /// Adds `mapping`, or fills in IDs of the existing entry for the same
    /// series. Known IDs are never replaced.
    pub fn record(&mut self, mapping: IdMapping) -> Result<(), StorageError> {
        match self
            .entries
            .iter_mut()
            .find(|entry| entry.series == mapping.series)
        {
            Some(entry) => {
                let before = entry.clone();
                if entry.tvdb_id.is_none() {
                    entry.tvdb_id = mapping.tvdb_id;
                }
                if entry.imdb_id.is_none() {
                    entry.imdb_id = mapping.imdb_id;
                }
                if *entry == before {
                    return Ok(());
                }
            }
            None => self.entries.push(mapping),
        }

        self.database.save(&self.entries)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
