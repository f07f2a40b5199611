//! Negative-result cache for provider lookups
//!
//! Every lookup that comes back empty is remembered here together with how
//! often it failed and when it may be tried again. A lookup is retried at
//! most once per cooldown window; once it has failed more often than the
//! configured threshold it is never retried until the series is purged.

use crate::identity::{EpisodeIdentity, SeriesIdentity};
use crate::storage::{JsonDatabase, StorageError};
use chrono::{DateTime, TimeDelta, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

/// Minimum time between two failure increments of the same lookup.
pub const COOLDOWN: TimeDelta = TimeDelta::days(1);

/// The kind of lookup a blacklist entry refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QueryKind {
    /// Episode source image
    Image,
    /// Translated episode title
    Title,
    /// Series logo
    Logo,
    /// Series backdrop
    Backdrop,
}

impl QueryKind {
    /// Whether lookups of this kind are made per series rather than per episode.
    pub fn is_series_level(self) -> bool {
        matches!(self, QueryKind::Logo | QueryKind::Backdrop)
    }
}

impl fmt::Display for QueryKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            QueryKind::Image => "image",
            QueryKind::Title => "title",
            QueryKind::Logo => "logo",
            QueryKind::Backdrop => "backdrop",
        };
        f.write_str(name)
    }
}

/// Identifies one lookup in the blacklist.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlacklistKey {
    pub query: QueryKind,
    /// Natural key of the series, `"Name (Year)"`
    pub series: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub season: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub episode: Option<u32>,
}

impl BlacklistKey {
    /// Key for a per-episode lookup.
    ///
    /// Series-level kinds ignore the episode and produce a series key.
    pub fn episode(query: QueryKind, series: &SeriesIdentity, episode: &EpisodeIdentity) -> Self {
        if query.is_series_level() {
            return Self::series(query, series);
        }

        Self {
            query,
            series: series.full_name(),
            season: Some(episode.season_number),
            episode: Some(episode.episode_number),
        }
    }

    /// Key for a per-series lookup.
    pub fn series(query: QueryKind, series: &SeriesIdentity) -> Self {
        Self {
            query,
            series: series.full_name(),
            season: None,
            episode: None,
        }
    }
}

/// A remembered failure.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BlacklistRecord {
    #[serde(flatten)]
    pub key: BlacklistKey,
    /// How many cooldown windows this lookup has failed in
    pub failures: u32,
    /// Earliest time the lookup may be attempted again
    #[serde(with = "chrono::serde::ts_seconds")]
    pub next: DateTime<Utc>,
}

/// File-backed blacklist of failed lookups.
pub struct BlacklistStore {
    database: JsonDatabase<Vec<BlacklistRecord>>,
    records: Vec<BlacklistRecord>,
    retry_threshold: u32,
}

impl BlacklistStore {
    /// Opens (or lazily creates) the blacklist stored at `path`.
    ///
    /// `retry_threshold` is the number of failures a lookup may accumulate
    /// before it is blocked for good.
    pub fn open(path: impl Into<PathBuf>, retry_threshold: u32) -> Result<Self, StorageError> {
        let database = JsonDatabase::open(path)?;
        let records = database.load()?;

        Ok(Self {
            database,
            records,
            retry_threshold,
        })
    }

    /// Whether `key` must not be queried right now.
    pub fn is_blacklisted(&self, key: &BlacklistKey) -> bool {
        self.is_blacklisted_at(key, Utc::now())
    }

    pub(crate) fn is_blacklisted_at(&self, key: &BlacklistKey, now: DateTime<Utc>) -> bool {
        let Some(record) = self.get(key) else {
            return false;
        };

        if record.failures > self.retry_threshold {
            return true;
        }

        now < record.next
    }

    /// Whether `key` has failed more often than the retry threshold allows.
    pub fn is_permanently_blacklisted(&self, key: &BlacklistKey) -> bool {
        self.get(key)
            .is_some_and(|record| record.failures > self.retry_threshold)
    }

    /// Remembers that `key` failed.
    pub fn record_failure(&mut self, key: &BlacklistKey) -> Result<(), StorageError> {
        self.record_failure_at(key, Utc::now())
    }

    pub(crate) fn record_failure_at(
        &mut self,
        key: &BlacklistKey,
        now: DateTime<Utc>,
    ) -> Result<(), StorageError> {
        let next = now + COOLDOWN;

        match self.records.iter_mut().find(|record| record.key == *key) {
            Some(record) if now >= record.next => {
                record.failures += 1;
                record.next = next;
            }
            // Still inside the cooldown window
            Some(_) => return Ok(()),
            None => self.records.push(BlacklistRecord {
                key: key.clone(),
                failures: 1,
                next,
            }),
        }

        tracing::debug!("Blacklisted {} lookup for {}", key.query, key.series);
        self.database.save(&self.records)
    }

    /// Removes every record of the given series, returning how many went.
    pub fn purge(&mut self, series_key: &str) -> Result<usize, StorageError> {
        let before = self.records.len();
        self.records.retain(|record| record.key.series != series_key);
        let removed = before - self.records.len();

        self.database.save(&self.records)?;
        tracing::info!("Unblacklisted {} queries for {}", removed, series_key);
        Ok(removed)
    }

    /// Deletes the whole blacklist.
    pub fn reset(&mut self) -> Result<(), StorageError> {
        self.database.delete()?;
        self.records.clear();
        tracing::info!("Deleted blacklist file {}", self.database.path().display());
        Ok(())
    }

    /// Returns the record stored for `key`, if any.
    pub fn get(&self, key: &BlacklistKey) -> Option<&BlacklistRecord> {
        self.records.iter().find(|record| record.key == *key)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}
