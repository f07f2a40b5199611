//! In-memory metadata client for tests
//!
//! Serves records from hash maps and logs every call, so tests can check
//! which lookups a resolver operation actually made.

use super::{
    CrossReference, EpisodeRecord, EpisodeSummary, ExternalSource, MetadataClient, MovieRecord,
    MovieSummary, ProviderError, ProviderResult, SeasonRecord, SeriesRecord, SeriesSummary,
    Translation,
};
use crate::ranking::ImageCandidate;
use std::cell::{Cell, RefCell};
use std::collections::HashMap;

#[derive(Default)]
pub(crate) struct FakeClient {
    series: HashMap<u64, SeriesRecord>,
    seasons: HashMap<(u64, u32), SeasonRecord>,
    episodes: HashMap<(u64, u32, u32), EpisodeRecord>,
    movies: HashMap<u64, MovieRecord>,
    cross_references: HashMap<(ExternalSource, String), CrossReference>,
    movie_searches: HashMap<String, Vec<MovieSummary>>,
    series_searches: HashMap<(String, Option<i32>), Vec<SeriesSummary>>,
    offline: Cell<bool>,
    calls: RefCell<Vec<String>>,
}

impl FakeClient {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_series(&mut self, series: SeriesRecord) {
        self.series.insert(series.id, series);
    }

    /// Adds an episode and lists it in its season.
    pub fn add_episode(&mut self, episode: EpisodeRecord) {
        let key = (episode.series_id, episode.season_number);
        let season = self.seasons.entry(key).or_insert_with(|| SeasonRecord {
            season_number: episode.season_number,
            episodes: Vec::new(),
        });
        season.episodes.push(EpisodeSummary {
            id: episode.id,
            name: episode.name.clone(),
            season_number: episode.season_number,
            episode_number: episode.episode_number,
            air_date: episode.air_date,
        });

        self.episodes.insert(
            (
                episode.series_id,
                episode.season_number,
                episode.episode_number,
            ),
            episode,
        );
    }

    /// Lists an episode in its season without serving its details.
    pub fn add_listing_only(&mut self, series_id: u64, entry: EpisodeSummary) {
        self.seasons
            .entry((series_id, entry.season_number))
            .or_insert_with(|| SeasonRecord {
                season_number: entry.season_number,
                episodes: Vec::new(),
            })
            .episodes
            .push(entry);
    }

    pub fn add_movie(&mut self, movie: MovieRecord) {
        self.movies.insert(movie.id, movie);
    }

    pub fn add_cross_reference(
        &mut self,
        source: ExternalSource,
        external_id: &str,
        reference: CrossReference,
    ) {
        self.cross_references
            .insert((source, external_id.to_string()), reference);
    }

    pub fn add_movie_search(&mut self, query: &str, results: Vec<MovieSummary>) {
        self.movie_searches.insert(query.to_string(), results);
    }

    pub fn add_series_search(&mut self, name: &str, year: Option<i32>, results: Vec<SeriesSummary>) {
        self.series_searches
            .insert((name.to_string(), year), results);
    }

    /// Makes every following call fail with a request error.
    pub fn go_offline(&self) {
        self.offline.set(true);
    }

    /// Every call made so far, e.g. `"episode 1 1 2"`.
    pub fn calls(&self) -> Vec<String> {
        self.calls.borrow().clone()
    }

    pub fn clear_calls(&self) {
        self.calls.borrow_mut().clear();
    }

    fn call(&self, description: String) -> ProviderResult<()> {
        self.calls.borrow_mut().push(description);
        if self.offline.get() {
            return Err(ProviderError::RequestError("connection refused".to_string()));
        }
        Ok(())
    }
}

fn not_found<T>(what: String) -> ProviderResult<T> {
    Err(ProviderError::NotFound(what))
}

impl MetadataClient for FakeClient {
    fn series(&self, series_id: u64) -> ProviderResult<SeriesRecord> {
        let call = format!("series {}", series_id);
        self.call(call.clone())?;
        self.series
            .get(&series_id)
            .cloned()
            .map_or_else(|| not_found(call), Ok)
    }

    fn season(&self, series_id: u64, season_number: u32) -> ProviderResult<SeasonRecord> {
        let call = format!("season {} {}", series_id, season_number);
        self.call(call.clone())?;
        self.seasons
            .get(&(series_id, season_number))
            .cloned()
            .map_or_else(|| not_found(call), Ok)
    }

    fn episode(
        &self,
        series_id: u64,
        season_number: u32,
        episode_number: u32,
    ) -> ProviderResult<EpisodeRecord> {
        let call = format!("episode {} {} {}", series_id, season_number, episode_number);
        self.call(call.clone())?;
        self.episodes
            .get(&(series_id, season_number, episode_number))
            .cloned()
            .map_or_else(|| not_found(call), Ok)
    }

    fn movie(&self, movie_id: u64) -> ProviderResult<MovieRecord> {
        let call = format!("movie {}", movie_id);
        self.call(call.clone())?;
        self.movies
            .get(&movie_id)
            .cloned()
            .map_or_else(|| not_found(call), Ok)
    }

    fn find_by_external_id(
        &self,
        source: ExternalSource,
        external_id: &str,
    ) -> ProviderResult<CrossReference> {
        self.call(format!("find {} {}", source, external_id))?;
        Ok(self
            .cross_references
            .get(&(source, external_id.to_string()))
            .cloned()
            .unwrap_or_default())
    }

    fn search_movies(&self, query: &str) -> ProviderResult<Vec<MovieSummary>> {
        self.call(format!("search_movies {}", query))?;
        Ok(self.movie_searches.get(query).cloned().unwrap_or_default())
    }

    fn search_series(
        &self,
        name: &str,
        year: Option<i32>,
        include_adult: bool,
    ) -> ProviderResult<Vec<SeriesSummary>> {
        self.call(format!(
            "search_series {} {:?} adult={}",
            name, year, include_adult
        ))?;
        Ok(self
            .series_searches
            .get(&(name.to_string(), year))
            .cloned()
            .unwrap_or_default())
    }
}

/// A series with the given seasons and no images.
pub(crate) fn series_record(id: u64, name: &str, season_numbers: &[u32]) -> SeriesRecord {
    SeriesRecord {
        id,
        name: name.to_string(),
        tvdb_id: None,
        imdb_id: None,
        season_numbers: season_numbers.to_vec(),
        logos: Vec::new(),
        backdrops: Vec::new(),
    }
}

/// An episode with one 1920x1080 still and no translations.
pub(crate) fn episode_record(
    series_id: u64,
    season_number: u32,
    episode_number: u32,
    id: u64,
    name: &str,
) -> EpisodeRecord {
    EpisodeRecord {
        id,
        series_id,
        name: name.to_string(),
        season_number,
        episode_number,
        air_date: None,
        tvdb_id: None,
        imdb_id: None,
        stills: vec![image(
            1920,
            1080,
            None,
            &format!("https://image.example/still_{}.jpg", id),
        )],
        translations: Vec::new(),
    }
}

/// A movie with one 1920x1080 backdrop.
pub(crate) fn movie_record(id: u64, title: &str) -> MovieRecord {
    MovieRecord {
        id,
        title: title.to_string(),
        alternative_titles: Vec::new(),
        backdrops: vec![image(
            1920,
            1080,
            None,
            &format!("https://image.example/backdrop_{}.jpg", id),
        )],
        translations: Vec::new(),
    }
}

pub(crate) fn image(width: u32, height: u32, language: Option<&str>, url: &str) -> ImageCandidate {
    ImageCandidate {
        width,
        height,
        language: language.map(str::to_string),
        score: 0.0,
        url: url.to_string(),
    }
}

pub(crate) fn translation(iso_639_1: &str, iso_3166_1: &str, text: &str) -> Translation {
    Translation {
        iso_639_1: Some(iso_639_1.to_string()),
        iso_3166_1: Some(iso_3166_1.to_string()),
        text: text.to_string(),
    }
}
