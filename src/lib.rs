//! Artwork Resolver - Find episode stills, series logos, backdrops and
//! translated titles on TheMovieDatabase
//!
//! This library resolves partial, possibly stale identifiers to TMDb records
//! through a fixed fallback cascade, picks the best image among the
//! candidates, and remembers lookups that failed so they are not retried
//! before their cooldown has passed.
//!
//! # Examples
//!
//! ```ignore
//! let config = ResolverConfig::load(None)?;
//! let client = TmdbClient::connect(&config.api_key)?;
//! let mut resolver = Resolver::new(client, &config)?;
//!
//! let mut series = SeriesIdentity::new("Breaking Bad", 2008);
//! resolver.resolve_series_ids(&mut series);
//! let episode = EpisodeIdentity::new("Pilot", 1, 1);
//! let url = resolver.get_source_image(&series, &episode, true, false);
//! ```

mod blacklist;
mod config;
mod download;
mod generic_title;
mod id_map;
mod identity;
mod matcher;
mod provider;
mod ranking;
mod resolver;
mod storage;
mod temp;

pub use blacklist::{BlacklistKey, BlacklistRecord, BlacklistStore, COOLDOWN, QueryKind};
pub use config::{
    API_KEY_VARIABLE, DEFAULT_RETRY_THRESHOLD, ResolverConfig, default_config_path,
};
pub use download::download_image;
pub use generic_title::{GENERIC_TITLE_FORMATS, generic_title_format, is_generic_title};
pub use id_map::{IdMapping, IdentifierMap};
pub use identity::{EpisodeIdentity, SeriesIdentity};
pub use matcher::MatchedRecord;
pub use provider::{
    CrossReference, EpisodeLocator, EpisodeRecord, EpisodeSummary, ExternalSource,
    MetadataClient, MovieRecord, MovieSummary, ProviderResult, SeasonRecord, SeriesRecord,
    SeriesSummary, TmdbClient, Translation,
};
pub use ranking::{ImageCandidate, ImageFilter, Resolution, select_best_image, select_best_logo};
pub use resolver::Resolver;

// Re-export error types
pub use config::ConfigError;
pub use download::DownloadError;
pub use provider::ProviderError;
pub use storage::StorageError;

use thiserror::Error;

/// Main error type for artwork resolution operations
#[derive(Debug, Error)]
pub enum ResolverError {
    /// Error loading the configuration
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Error talking to the metadata provider
    #[error("Metadata provider error: {0}")]
    Provider(#[from] ProviderError),

    /// Error reading or writing the blacklist or identifier map
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    /// Error downloading an image
    #[error("Download error: {0}")]
    Download(#[from] DownloadError),
}
