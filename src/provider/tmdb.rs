//! TMDb metadata provider implementation.

use super::tmdb_types::{
    TmdbEpisode, TmdbEpisodeSummary, TmdbExternalIds, TmdbFindResults, TmdbImage, TmdbMovie,
    TmdbMovieSummary, TmdbSearchPage, TmdbSeason, TmdbSeries, TmdbSeriesSummary,
    TmdbTranslations,
};
use super::{
    CrossReference, EpisodeLocator, EpisodeRecord, EpisodeSummary, ExternalSource,
    MetadataClient, MovieRecord, MovieSummary, ProviderError, ProviderResult, SeasonRecord,
    SeriesRecord, SeriesSummary, Translation,
};
use crate::ranking::ImageCandidate;
use chrono::NaiveDate;
use serde::de::DeserializeOwned;

const TMDB_API_BASE: &str = "https://api.themoviedb.org/3";

/// Prefix for full-size image URLs
const TMDB_IMAGE_BASE: &str = "https://image.tmdb.org/t/p/original";

/// Metadata provider for the TMDb v3 API.
///
/// Requests are authenticated with the `api_key` query parameter and issued
/// one at a time on a blocking HTTP client.
pub struct TmdbClient {
    client: reqwest::blocking::Client,
    api_key: String,
    base_url: String,
}

impl TmdbClient {
    /// Creates a client without checking the API key.
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            client: reqwest::blocking::Client::new(),
            api_key: api_key.into(),
            base_url: TMDB_API_BASE.to_string(),
        }
    }

    /// Creates a client and verifies the API key against TMDb.
    ///
    /// # Errors
    ///
    /// Returns `ProviderError::Unauthorized` if TMDb rejects the key, or a
    /// request error if TMDb could not be reached.
    pub fn connect(api_key: impl Into<String>) -> ProviderResult<Self> {
        let client = Self::new(api_key);
        client.get::<serde_json::Value>("/configuration", &[])?;
        Ok(client)
    }

    /// Issues a GET request and decodes the JSON body.
    fn get<T: DeserializeOwned>(&self, path: &str, query: &[(&str, &str)]) -> ProviderResult<T> {
        let url = format!("{}{}", self.base_url, path);

        let response = self
            .client
            .get(&url)
            .query(&[("api_key", self.api_key.as_str())])
            .query(query)
            .send()
            .map_err(|e| ProviderError::RequestError(e.to_string()))?;

        let status = response.status();
        if status == 404 {
            return Err(ProviderError::NotFound(path.to_string()));
        }
        if status == 401 {
            return Err(ProviderError::Unauthorized);
        }

        // Ensure request was successful
        if !status.is_success() {
            return Err(ProviderError::RequestError(format!(
                "HTTP {} {} for {}",
                status.as_u16(),
                status.canonical_reason().unwrap_or("Unknown"),
                path
            )));
        }

        response
            .json()
            .map_err(|e| ProviderError::ParseError(e.to_string()))
    }

    fn convert_image(image: TmdbImage) -> ImageCandidate {
        ImageCandidate {
            width: image.width,
            height: image.height,
            language: image.iso_639_1,
            score: image.vote_average,
            url: format!("{}{}", TMDB_IMAGE_BASE, image.file_path),
        }
    }

    fn convert_images(images: Vec<TmdbImage>) -> Vec<ImageCandidate> {
        images.into_iter().map(Self::convert_image).collect()
    }

    fn convert_translations(translations: TmdbTranslations) -> Vec<Translation> {
        translations
            .translations
            .into_iter()
            .map(|t| Translation {
                iso_639_1: t.iso_639_1,
                iso_3166_1: t.iso_3166_1,
                text: t.data.name.or(t.data.title).unwrap_or_default(),
            })
            .collect()
    }

    /// TMDb reports missing IDs as `0` and `""`; both mean "absent".
    fn convert_external_ids(ids: TmdbExternalIds) -> (Option<u64>, Option<String>) {
        (
            ids.tvdb_id.filter(|id| *id != 0),
            ids.imdb_id.filter(|id| !id.is_empty()),
        )
    }

    fn parse_air_date(air_date: Option<&str>) -> Option<NaiveDate> {
        air_date.and_then(|date| NaiveDate::parse_from_str(date, "%Y-%m-%d").ok())
    }

    fn convert_series(series: TmdbSeries) -> SeriesRecord {
        let (tvdb_id, imdb_id) = Self::convert_external_ids(series.external_ids);
        SeriesRecord {
            id: series.id,
            name: series.name,
            tvdb_id,
            imdb_id,
            season_numbers: series.seasons.iter().map(|s| s.season_number).collect(),
            logos: Self::convert_images(series.images.logos),
            backdrops: Self::convert_images(series.images.backdrops),
        }
    }

    fn convert_episode_summary(episode: TmdbEpisodeSummary) -> EpisodeSummary {
        EpisodeSummary {
            id: episode.id,
            air_date: Self::parse_air_date(episode.air_date.as_deref()),
            name: episode.name,
            season_number: episode.season_number,
            episode_number: episode.episode_number,
        }
    }

    fn convert_episode(series_id: u64, episode: TmdbEpisode) -> EpisodeRecord {
        let (tvdb_id, imdb_id) = Self::convert_external_ids(episode.external_ids);
        EpisodeRecord {
            id: episode.id,
            series_id,
            air_date: Self::parse_air_date(episode.air_date.as_deref()),
            name: episode.name,
            season_number: episode.season_number,
            episode_number: episode.episode_number,
            tvdb_id,
            imdb_id,
            stills: Self::convert_images(episode.images.stills),
            translations: Self::convert_translations(episode.translations),
        }
    }

    fn convert_movie(movie: TmdbMovie) -> MovieRecord {
        MovieRecord {
            id: movie.id,
            title: movie.title,
            alternative_titles: movie
                .alternative_titles
                .titles
                .into_iter()
                .map(|t| t.title)
                .collect(),
            backdrops: Self::convert_images(movie.images.backdrops),
            translations: Self::convert_translations(movie.translations),
        }
    }

    fn convert_find_results(results: TmdbFindResults) -> CrossReference {
        CrossReference {
            series: results
                .tv_results
                .into_iter()
                .map(|s| SeriesSummary {
                    id: s.id,
                    name: s.name,
                })
                .collect(),
            // Episode hits without a show ID cannot be loaded
            episodes: results
                .tv_episode_results
                .into_iter()
                .filter_map(|e| {
                    Some(EpisodeLocator {
                        series_id: e.show_id?,
                        season_number: e.season_number,
                        episode_number: e.episode_number,
                    })
                })
                .collect(),
            movies: results
                .movie_results
                .into_iter()
                .map(|m| MovieSummary {
                    id: m.id,
                    title: m.title,
                })
                .collect(),
        }
    }
}

impl MetadataClient for TmdbClient {
    fn series(&self, series_id: u64) -> ProviderResult<SeriesRecord> {
        let series: TmdbSeries = self.get(
            &format!("/tv/{}", series_id),
            &[("append_to_response", "external_ids,images")],
        )?;
        Ok(Self::convert_series(series))
    }

    fn season(&self, series_id: u64, season_number: u32) -> ProviderResult<SeasonRecord> {
        let season: TmdbSeason =
            self.get(&format!("/tv/{}/season/{}", series_id, season_number), &[])?;
        Ok(SeasonRecord {
            season_number: season.season_number,
            episodes: season
                .episodes
                .into_iter()
                .map(Self::convert_episode_summary)
                .collect(),
        })
    }

    fn episode(
        &self,
        series_id: u64,
        season_number: u32,
        episode_number: u32,
    ) -> ProviderResult<EpisodeRecord> {
        let episode: TmdbEpisode = self.get(
            &format!(
                "/tv/{}/season/{}/episode/{}",
                series_id, season_number, episode_number
            ),
            &[("append_to_response", "external_ids,images,translations")],
        )?;
        Ok(Self::convert_episode(series_id, episode))
    }

    fn movie(&self, movie_id: u64) -> ProviderResult<MovieRecord> {
        let movie: TmdbMovie = self.get(
            &format!("/movie/{}", movie_id),
            &[("append_to_response", "alternative_titles,images,translations")],
        )?;
        Ok(Self::convert_movie(movie))
    }

    fn find_by_external_id(
        &self,
        source: ExternalSource,
        external_id: &str,
    ) -> ProviderResult<CrossReference> {
        let results: TmdbFindResults = self.get(
            &format!("/find/{}", external_id),
            &[("external_source", source.as_str())],
        )?;
        Ok(Self::convert_find_results(results))
    }

    fn search_movies(&self, query: &str) -> ProviderResult<Vec<MovieSummary>> {
        let page: TmdbSearchPage<TmdbMovieSummary> =
            self.get("/search/movie", &[("query", query)])?;
        Ok(page
            .results
            .into_iter()
            .map(|m| MovieSummary {
                id: m.id,
                title: m.title,
            })
            .collect())
    }

    fn search_series(
        &self,
        name: &str,
        year: Option<i32>,
        include_adult: bool,
    ) -> ProviderResult<Vec<SeriesSummary>> {
        let year = year.map(|y| y.to_string());
        let include_adult = if include_adult { "true" } else { "false" };

        let mut query = vec![("query", name), ("include_adult", include_adult)];
        if let Some(year) = year.as_deref() {
            query.push(("first_air_date_year", year));
        }

        let page: TmdbSearchPage<TmdbSeriesSummary> = self.get("/search/tv", &query)?;
        Ok(page
            .results
            .into_iter()
            .map(|s| SeriesSummary {
                id: s.id,
                name: s.name,
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_convert_episode_response() {
        let json = r#"{
            "id": 62085,
            "name": "Pilot",
            "season_number": 1,
            "episode_number": 1,
            "air_date": "2008-01-20",
            "external_ids": {"tvdb_id": 349232, "imdb_id": "tt0959621"},
            "images": {"stills": [
                {"width": 1920, "height": 1080, "iso_639_1": null,
                 "vote_average": 5.3, "file_path": "/still.jpg"}
            ]},
            "translations": {"translations": [
                {"iso_3166_1": "DE", "iso_639_1": "de", "data": {"name": "Der Einstieg"}},
                {"iso_3166_1": "US", "iso_639_1": "en", "data": {"name": ""}}
            ]}
        }"#;
        let episode: TmdbEpisode = serde_json::from_str(json).unwrap();
        let record = TmdbClient::convert_episode(1396, episode);

        assert_eq!(record.series_id, 1396);
        assert_eq!(record.air_date, NaiveDate::from_ymd_opt(2008, 1, 20));
        assert_eq!(record.tvdb_id, Some(349232));
        assert_eq!(record.imdb_id.as_deref(), Some("tt0959621"));
        assert_eq!(
            record.stills[0].url,
            "https://image.tmdb.org/t/p/original/still.jpg"
        );
        assert_eq!(record.stills[0].language, None);
        assert_eq!(record.translations[0].text, "Der Einstieg");
        assert_eq!(record.translations[1].text, "");
    }

    #[test]
    fn test_convert_series_sentinel_ids() {
        let json = r#"{
            "id": 1396,
            "name": "Breaking Bad",
            "seasons": [{"season_number": 0}, {"season_number": 1}],
            "external_ids": {"tvdb_id": 0, "imdb_id": ""},
            "images": {"logos": [
                {"width": 500, "height": 200, "iso_639_1": "en",
                 "vote_average": 0, "file_path": "/logo.svg"}
            ]}
        }"#;
        let series: TmdbSeries = serde_json::from_str(json).unwrap();
        let record = TmdbClient::convert_series(series);

        assert_eq!(record.tvdb_id, None);
        assert_eq!(record.imdb_id, None);
        assert_eq!(record.season_numbers, vec![0, 1]);
        assert_eq!(record.logos.len(), 1);
        assert!(record.backdrops.is_empty());
    }

    #[test]
    fn test_convert_movie_uses_title_translations() {
        let json = r#"{
            "id": 603,
            "title": "The Matrix",
            "alternative_titles": {"titles": [{"title": "Matrix"}]},
            "translations": {"translations": [
                {"iso_3166_1": "FR", "iso_639_1": "fr", "data": {"title": "Matrix"}}
            ]}
        }"#;
        let movie: TmdbMovie = serde_json::from_str(json).unwrap();
        let record = TmdbClient::convert_movie(movie);

        assert_eq!(record.alternative_titles, vec!["Matrix".to_string()]);
        assert_eq!(record.translations[0].text, "Matrix");
        assert!(record.backdrops.is_empty());
    }

    #[test]
    fn test_convert_find_results() {
        let json = r#"{
            "movie_results": [{"id": 603, "title": "The Matrix"}],
            "tv_results": [],
            "tv_episode_results": [
                {"id": 62085, "name": "Pilot", "season_number": 1,
                 "episode_number": 1, "show_id": 1396},
                {"id": 1, "name": "Orphan", "season_number": 1, "episode_number": 2}
            ]
        }"#;
        let results: TmdbFindResults = serde_json::from_str(json).unwrap();
        let reference = TmdbClient::convert_find_results(results);

        assert_eq!(
            reference.episodes,
            vec![EpisodeLocator {
                series_id: 1396,
                season_number: 1,
                episode_number: 1
            }]
        );
        assert_eq!(reference.movies[0].id, 603);
        assert!(reference.series.is_empty());
    }
}
