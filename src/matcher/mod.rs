//! Episode matching module
//!
//! This module finds the TMDb record that corresponds to a caller's
//! `EpisodeIdentity`. Lookups are tried as an ordered list of strategies,
//! cheapest and least ambiguous first, and the first strategy that produces
//! a match wins.

mod strategies;

pub(crate) use strategies::{AbsoluteIndex, EpisodeCrossReference, FullScan, MovieTitleSearch, SeasonIndex};

use crate::identity::{EpisodeIdentity, SeriesIdentity};
use crate::provider::{
    EpisodeRecord, MetadataClient, MovieRecord, OptionalExt, ProviderResult, SeriesRecord,
    Translation,
};
use crate::ranking::ImageCandidate;

/// The record an episode was matched to.
///
/// Some episodes (specials, standalone films) are catalogued by TMDb as
/// movies, so a match is either shape.
#[derive(Debug, Clone, PartialEq)]
pub enum MatchedRecord {
    Episode(EpisodeRecord),
    Movie(MovieRecord),
}

impl MatchedRecord {
    /// TMDb ID of the matched record
    pub fn id(&self) -> u64 {
        match self {
            MatchedRecord::Episode(episode) => episode.id,
            MatchedRecord::Movie(movie) => movie.id,
        }
    }

    /// Title of the matched record
    pub fn title(&self) -> &str {
        match self {
            MatchedRecord::Episode(episode) => &episode.name,
            MatchedRecord::Movie(movie) => &movie.title,
        }
    }

    /// Candidate source images: stills for episodes, backdrops for movies.
    pub fn images(&self) -> &[ImageCandidate] {
        match self {
            MatchedRecord::Episode(episode) => &episode.stills,
            MatchedRecord::Movie(movie) => &movie.backdrops,
        }
    }

    pub fn translations(&self) -> &[Translation] {
        match self {
            MatchedRecord::Episode(episode) => &episode.translations,
            MatchedRecord::Movie(movie) => &movie.translations,
        }
    }
}

/// Everything a strategy needs to know about the lookup.
pub(crate) struct MatchRequest<'a> {
    pub series: &'a SeriesIdentity,
    pub episode: &'a EpisodeIdentity,
    /// Whether index lookups must be confirmed by the episode title
    pub title_match: bool,
    /// The series as resolved on TMDb, once the cascade has one
    pub anchor: Option<&'a SeriesRecord>,
}

/// One way of locating an episode on TMDb.
pub(crate) trait MatchStrategy {
    /// Short name used in log output
    fn name(&self) -> &'static str;

    /// Tries to find the episode described by `request`.
    ///
    /// Returns `Ok(None)` when this strategy does not apply or TMDb has no
    /// matching record. Errors are reserved for failures to ask TMDb at all.
    fn attempt(
        &self,
        client: &dyn MetadataClient,
        request: &MatchRequest<'_>,
    ) -> ProviderResult<Option<MatchedRecord>>;
}

/// The ordered fallback chain used to find an episode.
///
/// Cross-reference IDs are tried first. Without a TMDb series ID the only
/// remaining option is searching the episode title as a movie. Otherwise the
/// series is resolved and index, absolute-number and full-scan lookups run in
/// turn, with the movie search as the final fallback.
pub(crate) struct EpisodeCascade {
    unanchored: Vec<Box<dyn MatchStrategy>>,
    anchored: Vec<Box<dyn MatchStrategy>>,
    fallback: Box<dyn MatchStrategy>,
}

impl Default for EpisodeCascade {
    fn default() -> Self {
        Self {
            unanchored: vec![
                Box::new(EpisodeCrossReference::tvdb()),
                Box::new(EpisodeCrossReference::imdb()),
            ],
            anchored: vec![
                Box::new(SeasonIndex),
                Box::new(AbsoluteIndex),
                Box::new(FullScan),
            ],
            fallback: Box::new(MovieTitleSearch),
        }
    }
}

impl EpisodeCascade {
    /// Finds the TMDb record for `episode` of `series`.
    ///
    /// # Errors
    ///
    /// Only errors other than "not found" are returned; a lookup TMDb has no
    /// answer for simply moves the cascade on to the next strategy.
    pub fn find(
        &self,
        client: &dyn MetadataClient,
        series: &SeriesIdentity,
        episode: &EpisodeIdentity,
        title_match: bool,
    ) -> ProviderResult<Option<MatchedRecord>> {
        let request = MatchRequest {
            series,
            episode,
            title_match,
            anchor: None,
        };

        if let Some(matched) = Self::first_match(&self.unanchored, client, &request)? {
            return Ok(Some(matched));
        }

        // Nothing to anchor index lookups on
        let Some(series_id) = series.tmdb_id else {
            return self.fallback.attempt(client, &request);
        };

        let Some(anchor) = client.series(series_id).optional()? else {
            tracing::debug!("TMDb has no series {} for \"{}\"", series_id, series);
            return Ok(None);
        };

        let request = MatchRequest {
            series,
            episode,
            title_match,
            anchor: Some(&anchor),
        };

        if let Some(matched) = Self::first_match(&self.anchored, client, &request)? {
            return Ok(Some(matched));
        }

        self.fallback.attempt(client, &request)
    }

    fn first_match(
        strategies: &[Box<dyn MatchStrategy>],
        client: &dyn MetadataClient,
        request: &MatchRequest<'_>,
    ) -> ProviderResult<Option<MatchedRecord>> {
        for strategy in strategies {
            if let Some(matched) = strategy.attempt(client, request)? {
                tracing::debug!(
                    "Matched {} of \"{}\" by {}",
                    request.episode,
                    request.series,
                    strategy.name()
                );
                return Ok(Some(matched));
            }
        }

        Ok(None)
    }
}
