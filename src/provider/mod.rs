//! Data structures and traits for remote metadata lookups.
//!
//! This module provides the records the resolver works with (series, seasons,
//! episodes, movies and their images and translations) as well as the
//! `MetadataClient` trait a remote provider implements.

#[cfg(test)]
pub(crate) mod fake;
mod tmdb;
mod tmdb_types;

pub use tmdb::TmdbClient;

use crate::ranking::ImageCandidate;
use chrono::NaiveDate;
use std::fmt;
use thiserror::Error;

/// Errors that can occur during metadata retrieval operations.
#[derive(Debug, Error)]
pub enum ProviderError {
    /// The requested record does not exist on the provider
    #[error("Not found: {0}")]
    NotFound(String),

    /// The provider rejected the API key
    #[error("Invalid API key")]
    Unauthorized,

    /// Request to the metadata provider failed
    #[error("Request failed: {0}")]
    RequestError(String),

    /// Failed to parse the provider's JSON response
    #[error("Failed to parse API response: {0}")]
    ParseError(String),
}

pub type ProviderResult<T> = Result<T, ProviderError>;

/// Turns a provider "not found" into `Ok(None)`, keeping every other error.
pub(crate) trait OptionalExt<T> {
    fn optional(self) -> ProviderResult<Option<T>>;
}

impl<T> OptionalExt<T> for ProviderResult<T> {
    fn optional(self) -> ProviderResult<Option<T>> {
        match self {
            Ok(value) => Ok(Some(value)),
            Err(ProviderError::NotFound(_)) => Ok(None),
            Err(e) => Err(e),
        }
    }
}

/// An ID system other than the provider's own.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ExternalSource {
    Tvdb,
    Imdb,
}

impl ExternalSource {
    /// Name of the source as used by the TMDb find endpoint.
    pub fn as_str(self) -> &'static str {
        match self {
            ExternalSource::Tvdb => "tvdb_id",
            ExternalSource::Imdb => "imdb_id",
        }
    }
}

impl fmt::Display for ExternalSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A translated episode or movie title.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Translation {
    /// ISO 639-1 language code
    pub iso_639_1: Option<String>,
    /// ISO 3166-1 region code
    pub iso_3166_1: Option<String>,
    /// The translated title, empty if the translation has none
    pub text: String,
}

impl Translation {
    /// Whether this translation's region or language code is `code`.
    pub fn has_code(&self, code: &str) -> bool {
        self.iso_3166_1.as_deref() == Some(code) || self.iso_639_1.as_deref() == Some(code)
    }
}

/// A TV series.
#[derive(Debug, Clone, PartialEq)]
pub struct SeriesRecord {
    pub id: u64,
    pub name: String,
    pub tvdb_id: Option<u64>,
    pub imdb_id: Option<String>,
    /// Numbers of every season the series has, in provider order
    pub season_numbers: Vec<u32>,
    pub logos: Vec<ImageCandidate>,
    pub backdrops: Vec<ImageCandidate>,
}

/// A series search hit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SeriesSummary {
    pub id: u64,
    pub name: String,
}

/// A season with the episode listing.
#[derive(Debug, Clone, PartialEq)]
pub struct SeasonRecord {
    pub season_number: u32,
    pub episodes: Vec<EpisodeSummary>,
}

/// An entry of a season's episode listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EpisodeSummary {
    pub id: u64,
    pub name: String,
    pub season_number: u32,
    pub episode_number: u32,
    pub air_date: Option<NaiveDate>,
}

/// A single episode with its images and translations.
#[derive(Debug, Clone, PartialEq)]
pub struct EpisodeRecord {
    pub id: u64,
    pub series_id: u64,
    pub name: String,
    pub season_number: u32,
    pub episode_number: u32,
    pub air_date: Option<NaiveDate>,
    pub tvdb_id: Option<u64>,
    pub imdb_id: Option<String>,
    pub stills: Vec<ImageCandidate>,
    pub translations: Vec<Translation>,
}

/// A movie with its images and translations.
#[derive(Debug, Clone, PartialEq)]
pub struct MovieRecord {
    pub id: u64,
    pub title: String,
    pub alternative_titles: Vec<String>,
    pub backdrops: Vec<ImageCandidate>,
    pub translations: Vec<Translation>,
}

/// A movie search hit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MovieSummary {
    pub id: u64,
    pub title: String,
}

/// Points at an episode by series ID and index.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EpisodeLocator {
    pub series_id: u64,
    pub season_number: u32,
    pub episode_number: u32,
}

/// Everything an external ID resolved to.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CrossReference {
    pub series: Vec<SeriesSummary>,
    pub episodes: Vec<EpisodeLocator>,
    pub movies: Vec<MovieSummary>,
}

/// Trait for remote metadata providers.
///
/// Every lookup returns a `ProviderResult`; a record that does not exist is
/// reported as `ProviderError::NotFound` so callers can tell it apart from a
/// provider that could not be asked at all.
pub trait MetadataClient {
    /// Fetches a series by provider ID.
    fn series(&self, series_id: u64) -> ProviderResult<SeriesRecord>;

    /// Fetches the episode listing of one season.
    fn season(&self, series_id: u64, season_number: u32) -> ProviderResult<SeasonRecord>;

    /// Fetches one episode by series ID and index.
    fn episode(
        &self,
        series_id: u64,
        season_number: u32,
        episode_number: u32,
    ) -> ProviderResult<EpisodeRecord>;

    /// Fetches a movie by provider ID.
    fn movie(&self, movie_id: u64) -> ProviderResult<MovieRecord>;

    /// Resolves an external ID into provider records.
    fn find_by_external_id(
        &self,
        source: ExternalSource,
        external_id: &str,
    ) -> ProviderResult<CrossReference>;

    /// Searches the movie catalog by title.
    fn search_movies(&self, query: &str) -> ProviderResult<Vec<MovieSummary>>;

    /// Searches the series catalog by name and first-air year.
    fn search_series(
        &self,
        name: &str,
        year: Option<i32>,
        include_adult: bool,
    ) -> ProviderResult<Vec<SeriesSummary>>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_optional_maps_not_found() {
        let found: ProviderResult<u32> = Ok(3);
        assert_eq!(found.optional().unwrap(), Some(3));

        let missing: ProviderResult<u32> = Err(ProviderError::NotFound("x".to_string()));
        assert_eq!(missing.optional().unwrap(), None);

        let failed: ProviderResult<u32> = Err(ProviderError::RequestError("boom".to_string()));
        assert!(matches!(failed.optional(), Err(ProviderError::RequestError(_))));
    }

    #[test]
    fn test_translation_codes() {
        let translation = Translation {
            iso_639_1: Some("pt".to_string()),
            iso_3166_1: Some("BR".to_string()),
            text: "Piloto".to_string(),
        };
        assert!(translation.has_code("pt"));
        assert!(translation.has_code("BR"));
        assert!(!translation.has_code("PT"));
    }
}
