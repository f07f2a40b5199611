//! Resolver facade
//!
//! The `Resolver` is the public entry point of the crate. It wraps a
//! `MetadataClient` with the blacklist and identifier map, runs the episode
//! cascade and picks images and titles from whatever TMDb returns.
//!
//! Provider failures never escape: they are logged and the operation returns
//! its empty value. Only lookups TMDb positively had no answer for are
//! recorded in the blacklist.

use crate::blacklist::{BlacklistKey, BlacklistStore, QueryKind};
use crate::config::ResolverConfig;
use crate::generic_title::is_generic_title;
use crate::id_map::{IdMapping, IdentifierMap};
use crate::identity::{EpisodeIdentity, SeriesIdentity};
use crate::matcher::EpisodeCascade;
use crate::provider::{
    ExternalSource, MetadataClient, OptionalExt, ProviderError, ProviderResult, SeriesRecord,
};
use crate::ranking::{ImageFilter, Resolution, select_best_image, select_best_logo};
use crate::storage::StorageError;
use chrono::{DateTime, NaiveDate, NaiveTime, TimeDelta, Utc};

/// Episodes count as aired this long after midnight of their air date
const AIRING_GRACE: TimeDelta = TimeDelta::hours(2);

/// Resolves artwork and titles for series and episodes.
pub struct Resolver<C>
where
    C: MetadataClient,
{
    /// The remote metadata provider
    client: C,
    cascade: EpisodeCascade,
    /// Remembered failed lookups
    blacklist: BlacklistStore,
    /// Remembered series IDs
    id_map: IdentifierMap,
    /// Smallest acceptable source image
    minimum_resolution: Option<Resolution>,
}

impl<C> Resolver<C>
where
    C: MetadataClient,
{
    /// Creates a resolver, opening the blacklist and identifier map in the
    /// configured database directory.
    ///
    /// # Arguments
    ///
    /// * `client` - The metadata provider to query
    /// * `config` - Resolver settings
    ///
    /// # Errors
    ///
    /// Returns an error if either store cannot be created or read.
    pub fn new(client: C, config: &ResolverConfig) -> Result<Self, StorageError> {
        let blacklist = BlacklistStore::open(config.blacklist_path(), config.retry_threshold)?;
        let id_map = IdentifierMap::open(config.id_map_path())?;

        Ok(Self {
            client,
            cascade: EpisodeCascade::default(),
            blacklist,
            id_map,
            minimum_resolution: config.minimum_resolution,
        })
    }

    /// The wrapped metadata client
    pub fn client(&self) -> &C {
        &self.client
    }

    /// Fills in the TMDb, TVDb and IMDb IDs of `series`.
    ///
    /// The identifier map is consulted first. Otherwise the series is looked
    /// up on TMDb by TMDb ID, by TVDb or IMDb cross-reference, and finally by
    /// name and year. A series that cannot be found keeps its IDs unset.
    pub fn resolve_series_ids(&mut self, series: &mut SeriesIdentity) {
        if series.has_all_ids() {
            return;
        }

        let mapping = series
            .tvdb_id
            .and_then(|tvdb_id| self.id_map.by_tvdb_id(tvdb_id))
            .or_else(|| self.id_map.by_series(&series.full_name()));
        if let Some(mapping) = mapping {
            tracing::debug!("Using remembered IDs for \"{}\"", series);
            mapping.apply_to(series);
            return;
        }

        let record = match self.lookup_series(series) {
            Ok(Some(record)) => record,
            Ok(None) => {
                tracing::warn!("Series \"{}\" not found on TMDb", series);
                return;
            }
            Err(e) => {
                tracing::error!("Error resolving IDs of \"{}\": {}", series, e);
                return;
            }
        };

        series.tmdb_id = Some(record.id);
        if record.tvdb_id.is_some() {
            series.tvdb_id = record.tvdb_id;
        }
        if record.imdb_id.is_some() {
            series.imdb_id = record.imdb_id;
        }

        let Some(mapping) = IdMapping::from_series(series) else {
            return;
        };
        if let Err(e) = self.id_map.record(mapping) {
            tracing::warn!("Failed to remember IDs of \"{}\": {}", series, e);
        }
    }

    fn lookup_series(&self, series: &SeriesIdentity) -> ProviderResult<Option<SeriesRecord>> {
        if let Some(tmdb_id) = series.tmdb_id {
            if let Some(record) = self.client.series(tmdb_id).optional()? {
                return Ok(Some(record));
            }
        }

        let cross_references = [
            (ExternalSource::Tvdb, series.tvdb_id.map(|id| id.to_string())),
            (ExternalSource::Imdb, series.imdb_id.clone()),
        ];
        for (source, external_id) in cross_references {
            let Some(external_id) = external_id else {
                continue;
            };
            let reference = self
                .client
                .find_by_external_id(source, &external_id)
                .optional()?
                .unwrap_or_default();
            let Some(summary) = reference.series.first() else {
                continue;
            };
            if let Some(record) = self.client.series(summary.id).optional()? {
                return Ok(Some(record));
            }
            tracing::debug!(
                "{} {} of \"{}\" points at unknown series {}",
                source,
                external_id,
                series,
                summary.id
            );
        }

        let results = self
            .client
            .search_series(&series.name, Some(series.year), false)
            .optional()?
            .unwrap_or_default();
        match results.first() {
            Some(summary) => self.client.series(summary.id).optional(),
            None => Ok(None),
        }
    }

    /// Finds the URL of the best source image for an episode.
    ///
    /// # Arguments
    ///
    /// * `series` - The series the episode belongs to
    /// * `episode` - The episode to find an image for
    /// * `title_match` - Whether index lookups must be confirmed by title
    /// * `skip_localized` - Whether to ignore images with a language code
    ///
    /// # Returns
    ///
    /// The image URL, or `None` if there is no suitable image, the lookup is
    /// blacklisted, or TMDb could not be asked.
    pub fn get_source_image(
        &mut self,
        series: &SeriesIdentity,
        episode: &EpisodeIdentity,
        title_match: bool,
        skip_localized: bool,
    ) -> Option<String> {
        let key = BlacklistKey::episode(QueryKind::Image, series, episode);
        if self.skip_blacklisted(&key) {
            return None;
        }

        let matched = match self.cascade.find(&self.client, series, episode, title_match) {
            Ok(Some(matched)) => matched,
            Ok(None) => {
                tracing::debug!("TMDb has no matching episode for \"{}\" {}", series, episode);
                self.record_failure(&key);
                return None;
            }
            Err(e) => return log_provider_error("getting source image", series, e),
        };

        let images = matched.images();
        if images.is_empty() {
            tracing::debug!("TMDb has no images for \"{}\" {}", series, episode);
            self.record_failure(&key);
            return None;
        }

        let filter = self.source_filter(skip_localized);
        match select_best_image(images, &filter) {
            Some(best) => Some(best.url.clone()),
            None => {
                tracing::debug!(
                    "TMDb images for \"{}\" {} do not meet the requirements",
                    series,
                    episode
                );
                self.record_failure(&key);
                None
            }
        }
    }

    /// Finds the title of an episode in the given language.
    ///
    /// `language_code` is compared against both the region and the language
    /// code of each translation, so `"de"` and `"DE"` select differently.
    /// Placeholder titles like "Episode 5" are treated as missing.
    pub fn get_episode_title(
        &mut self,
        series: &SeriesIdentity,
        episode: &EpisodeIdentity,
        language_code: &str,
    ) -> Option<String> {
        let key = BlacklistKey::episode(QueryKind::Title, series, episode);
        if self.skip_blacklisted(&key) {
            return None;
        }

        let matched = match self.cascade.find(&self.client, series, episode, true) {
            Ok(Some(matched)) => matched,
            Ok(None) => {
                self.record_failure(&key);
                return None;
            }
            Err(e) => return log_provider_error("getting episode title", series, e),
        };

        let translation = matched
            .translations()
            .iter()
            .find(|translation| translation.has_code(language_code))?;
        if translation.text.is_empty() {
            return None;
        }

        if is_generic_title(
            &translation.text,
            language_code,
            episode.episode_number,
            episode.absolute_number,
        ) {
            tracing::debug!(
                "Generic title \"{}\" detected for {}",
                translation.text,
                episode
            );
            self.record_failure(&key);
            return None;
        }

        Some(translation.text.clone())
    }

    /// Finds the URL of the best English logo of a series.
    pub fn get_series_logo(&mut self, series: &SeriesIdentity) -> Option<String> {
        let key = BlacklistKey::series(QueryKind::Logo, series);
        let record = match self.series_artwork(series, &key) {
            Ok(record) => record?,
            Err(e) => return log_provider_error("getting series logo", series, e),
        };

        match select_best_logo(&record.logos) {
            Some(logo) => Some(logo.url.clone()),
            None => {
                tracing::debug!("TMDb has no English logo for \"{}\"", series);
                self.record_failure(&key);
                None
            }
        }
    }

    /// Finds the URL of the best backdrop of a series.
    pub fn get_series_backdrop(
        &mut self,
        series: &SeriesIdentity,
        skip_localized: bool,
    ) -> Option<String> {
        let key = BlacklistKey::series(QueryKind::Backdrop, series);
        let record = match self.series_artwork(series, &key) {
            Ok(record) => record?,
            Err(e) => return log_provider_error("getting series backdrop", series, e),
        };

        if record.backdrops.is_empty() {
            tracing::debug!("TMDb has no backdrops for \"{}\"", series);
            self.record_failure(&key);
            return None;
        }

        let filter = self.source_filter(skip_localized);
        match select_best_image(&record.backdrops, &filter) {
            Some(best) => Some(best.url.clone()),
            None => {
                self.record_failure(&key);
                None
            }
        }
    }

    /// Loads a series for a series-level artwork query.
    ///
    /// Returns `Ok(None)` when the query is blacklisted, the series has no
    /// TMDb ID, or TMDb does not know it; only the last case is recorded as
    /// a failure.
    fn series_artwork(
        &mut self,
        series: &SeriesIdentity,
        key: &BlacklistKey,
    ) -> ProviderResult<Option<SeriesRecord>> {
        let Some(series_id) = series.tmdb_id else {
            tracing::warn!("Cannot query TMDb for {} of \"{}\" without a TMDb ID", key.query, series);
            return Ok(None);
        };
        if self.skip_blacklisted(key) {
            return Ok(None);
        }

        let Some(record) = self.client.series(series_id).optional()? else {
            self.record_failure(key);
            return Ok(None);
        };

        Ok(Some(record))
    }

    /// Whether the given lookup has failed too often to be retried.
    pub fn is_permanently_blacklisted(
        &self,
        series: &SeriesIdentity,
        episode: &EpisodeIdentity,
        query: QueryKind,
    ) -> bool {
        self.blacklist
            .is_permanently_blacklisted(&BlacklistKey::episode(query, series, episode))
    }

    /// Forgets every failed lookup of one series.
    ///
    /// # Returns
    ///
    /// The number of forgotten lookups.
    pub fn purge_blacklist(&mut self, series: &SeriesIdentity) -> Result<usize, StorageError> {
        self.blacklist.purge(&series.full_name())
    }

    /// Forgets every failed lookup.
    pub fn reset_blacklist(&mut self) -> Result<(), StorageError> {
        self.blacklist.reset()
    }

    /// Lists every episode of a series that aired at least two hours ago.
    ///
    /// Returns an empty list if the series has no TMDb ID or TMDb cannot be
    /// asked.
    pub fn all_episodes(&self, series: &SeriesIdentity) -> Vec<EpisodeIdentity> {
        self.all_episodes_at(series, Utc::now())
    }

    pub(crate) fn all_episodes_at(
        &self,
        series: &SeriesIdentity,
        now: DateTime<Utc>,
    ) -> Vec<EpisodeIdentity> {
        let Some(series_id) = series.tmdb_id else {
            tracing::error!("Cannot source episodes from TMDb for \"{}\"", series);
            return Vec::new();
        };

        match self.collect_episodes(series_id, now) {
            Ok(episodes) => episodes,
            Err(e) => {
                tracing::error!("Error listing episodes for \"{}\": {}", series, e);
                Vec::new()
            }
        }
    }

    fn collect_episodes(
        &self,
        series_id: u64,
        now: DateTime<Utc>,
    ) -> ProviderResult<Vec<EpisodeIdentity>> {
        let Some(record) = self.client.series(series_id).optional()? else {
            tracing::error!("TMDb has no series {}", series_id);
            return Ok(Vec::new());
        };

        let mut episodes = Vec::new();
        for &season_number in &record.season_numbers {
            let Some(season) = self.client.season(series_id, season_number).optional()? else {
                continue;
            };

            for entry in season.episodes.iter().filter(|entry| has_aired(entry.air_date, now)) {
                let Some(episode) = self
                    .client
                    .episode(series_id, entry.season_number, entry.episode_number)
                    .optional()?
                else {
                    tracing::error!(
                        "TMDb error, skipping S{:02}E{:02}",
                        entry.season_number,
                        entry.episode_number
                    );
                    continue;
                };

                let mut identity =
                    EpisodeIdentity::new(episode.name, episode.season_number, episode.episode_number)
                        .with_tmdb_id(episode.id);
                identity.tvdb_id = episode.tvdb_id;
                identity.imdb_id = episode.imdb_id;
                episodes.push(identity);
            }
        }

        Ok(episodes)
    }

    fn source_filter(&self, skip_localized: bool) -> ImageFilter {
        ImageFilter {
            is_source_image: true,
            skip_localized,
            minimum_resolution: self.minimum_resolution,
        }
    }

    fn skip_blacklisted(&self, key: &BlacklistKey) -> bool {
        let blacklisted = self.blacklist.is_blacklisted(key);
        if blacklisted {
            tracing::debug!("Skipping blacklisted {} lookup for \"{}\"", key.query, key.series);
        }
        blacklisted
    }

    fn record_failure(&mut self, key: &BlacklistKey) {
        if let Err(e) = self.blacklist.record_failure(key) {
            tracing::warn!("Failed to update blacklist: {}", e);
        }
    }
}

fn log_provider_error<T>(action: &str, series: &SeriesIdentity, error: ProviderError) -> Option<T> {
    tracing::error!("Error {} for \"{}\": {}", action, series, error);
    None
}

/// Episodes without an air date are always included.
fn has_aired(air_date: Option<NaiveDate>, now: DateTime<Utc>) -> bool {
    air_date.is_none_or(|date| date.and_time(NaiveTime::MIN).and_utc() + AIRING_GRACE <= now)
}
