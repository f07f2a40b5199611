//! The individual lookups the episode cascade is built from.

use super::{MatchRequest, MatchStrategy, MatchedRecord};
use crate::provider::{ExternalSource, MetadataClient, OptionalExt, ProviderResult};
use std::iter;

/// Looks the episode up by its TVDb or IMDb ID.
pub(crate) struct EpisodeCrossReference {
    source: ExternalSource,
    /// Whether a movie result counts as a match
    accept_movies: bool,
}

impl EpisodeCrossReference {
    pub fn tvdb() -> Self {
        Self {
            source: ExternalSource::Tvdb,
            accept_movies: false,
        }
    }

    /// IMDb IDs of specials often point at a movie.
    pub fn imdb() -> Self {
        Self {
            source: ExternalSource::Imdb,
            accept_movies: true,
        }
    }

    fn external_id(&self, request: &MatchRequest<'_>) -> Option<String> {
        match self.source {
            ExternalSource::Tvdb => request.episode.tvdb_id.map(|id| id.to_string()),
            ExternalSource::Imdb => request.episode.imdb_id.clone(),
        }
    }
}

impl MatchStrategy for EpisodeCrossReference {
    fn name(&self) -> &'static str {
        match self.source {
            ExternalSource::Tvdb => "TVDb ID",
            ExternalSource::Imdb => "IMDb ID",
        }
    }

    fn attempt(
        &self,
        client: &dyn MetadataClient,
        request: &MatchRequest<'_>,
    ) -> ProviderResult<Option<MatchedRecord>> {
        let Some(external_id) = self.external_id(request) else {
            return Ok(None);
        };

        let Some(reference) = client
            .find_by_external_id(self.source, &external_id)
            .optional()?
        else {
            return Ok(None);
        };

        if let Some(locator) = reference.episodes.first() {
            let episode = client
                .episode(
                    locator.series_id,
                    locator.season_number,
                    locator.episode_number,
                )
                .optional()?;
            return Ok(episode.map(MatchedRecord::Episode));
        }

        match reference.movies.first() {
            Some(summary) if self.accept_movies => {
                let movie = client.movie(summary.id).optional()?;
                Ok(movie.map(MatchedRecord::Movie))
            }
            _ => Ok(None),
        }
    }
}

/// Searches the episode title in the movie catalog.
///
/// The first hit is accepted when it carries the episode's TMDb ID or when
/// its title or one of its alternative titles matches the episode title.
pub(crate) struct MovieTitleSearch;

impl MatchStrategy for MovieTitleSearch {
    fn name(&self) -> &'static str {
        "movie title"
    }

    fn attempt(
        &self,
        client: &dyn MetadataClient,
        request: &MatchRequest<'_>,
    ) -> ProviderResult<Option<MatchedRecord>> {
        let episode = request.episode;
        if episode.title.is_empty() {
            return Ok(None);
        }

        let results = client.search_movies(&episode.title).optional()?;
        let Some(first) = results.as_ref().and_then(|results| results.first()) else {
            return Ok(None);
        };

        let Some(movie) = client.movie(first.id).optional()? else {
            return Ok(None);
        };

        let names = iter::once(movie.title.as_str())
            .chain(movie.alternative_titles.iter().map(String::as_str));
        if episode.is_tmdb_id(movie.id) || episode.title_matches(names) {
            tracing::info!(
                "Matched {} of \"{}\" to TMDb movie \"{}\"",
                episode,
                request.series,
                movie.title
            );
            return Ok(Some(MatchedRecord::Movie(movie)));
        }

        Ok(None)
    }
}

/// Fetches the episode at the given index of the anchor series and checks it.
///
/// The record is accepted when it carries the episode's TMDb ID, or when
/// title matching is off, or when its title matches.
fn match_by_index(
    client: &dyn MetadataClient,
    request: &MatchRequest<'_>,
    season_number: u32,
    episode_number: u32,
) -> ProviderResult<Option<MatchedRecord>> {
    let Some(anchor) = request.anchor else {
        return Ok(None);
    };

    let Some(record) = client
        .episode(anchor.id, season_number, episode_number)
        .optional()?
    else {
        return Ok(None);
    };

    let episode = request.episode;
    let accepted = episode.is_tmdb_id(record.id)
        || !request.title_match
        || episode.title_matches([record.name.as_str()]);

    Ok(accepted.then_some(MatchedRecord::Episode(record)))
}

/// Season and episode number as given.
pub(crate) struct SeasonIndex;

impl MatchStrategy for SeasonIndex {
    fn name(&self) -> &'static str {
        "season index"
    }

    fn attempt(
        &self,
        client: &dyn MetadataClient,
        request: &MatchRequest<'_>,
    ) -> ProviderResult<Option<MatchedRecord>> {
        match_by_index(
            client,
            request,
            request.episode.season_number,
            request.episode.episode_number,
        )
    }
}

/// The absolute number as episode number, in the same season first and then
/// in every season of the series.
pub(crate) struct AbsoluteIndex;

impl MatchStrategy for AbsoluteIndex {
    fn name(&self) -> &'static str {
        "absolute number"
    }

    fn attempt(
        &self,
        client: &dyn MetadataClient,
        request: &MatchRequest<'_>,
    ) -> ProviderResult<Option<MatchedRecord>> {
        let (Some(absolute), Some(anchor)) = (request.episode.absolute_number, request.anchor)
        else {
            return Ok(None);
        };

        let own_season = request.episode.season_number;
        if let Some(matched) = match_by_index(client, request, own_season, absolute)? {
            return Ok(Some(matched));
        }

        for &season_number in &anchor.season_numbers {
            if season_number == own_season {
                continue;
            }
            if let Some(matched) = match_by_index(client, request, season_number, absolute)? {
                return Ok(Some(matched));
            }
        }

        Ok(None)
    }
}

/// Walks every season listing looking for the episode's TMDb ID or title.
///
/// Only runs with title matching enabled.
pub(crate) struct FullScan;

impl MatchStrategy for FullScan {
    fn name(&self) -> &'static str {
        "season scan"
    }

    fn attempt(
        &self,
        client: &dyn MetadataClient,
        request: &MatchRequest<'_>,
    ) -> ProviderResult<Option<MatchedRecord>> {
        let Some(anchor) = request.anchor else {
            return Ok(None);
        };
        if !request.title_match {
            return Ok(None);
        }

        let episode = request.episode;
        for &season_number in &anchor.season_numbers {
            let Some(season) = client.season(anchor.id, season_number).optional()? else {
                continue;
            };

            let candidates = season.episodes.iter().filter(|entry| {
                episode.is_tmdb_id(entry.id) || episode.title_matches([entry.name.as_str()])
            });
            for entry in candidates {
                // Listings can name episodes whose details are gone
                if let Some(record) = client
                    .episode(anchor.id, entry.season_number, entry.episode_number)
                    .optional()?
                {
                    return Ok(Some(MatchedRecord::Episode(record)));
                }
            }
        }

        Ok(None)
    }
}
