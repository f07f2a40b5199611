//! TMDb API response types for deserialization.
//!
//! These structures mirror the JSON response format of the TMDb v3 API.
//! Fields TMDb may send as `null` are optional.

use serde::Deserialize;

/// An entry of an `images` array.
#[derive(Debug, Deserialize)]
pub(super) struct TmdbImage {
    pub width: u32,
    pub height: u32,
    pub iso_639_1: Option<String>,
    #[serde(default)]
    pub vote_average: f64,
    pub file_path: String,
}

/// Image lists appended with `append_to_response=images`.
#[derive(Debug, Default, Deserialize)]
pub(super) struct TmdbImages {
    #[serde(default)]
    pub backdrops: Vec<TmdbImage>,
    #[serde(default)]
    pub logos: Vec<TmdbImage>,
    #[serde(default)]
    pub stills: Vec<TmdbImage>,
}

/// IDs appended with `append_to_response=external_ids`.
///
/// TMDb reports a missing TVDb ID as `0` or `null`.
#[derive(Debug, Default, Deserialize)]
pub(super) struct TmdbExternalIds {
    pub tvdb_id: Option<u64>,
    pub imdb_id: Option<String>,
}

/// Translation payload; episodes carry `name`, movies carry `title`.
#[derive(Debug, Default, Deserialize)]
pub(super) struct TmdbTranslationData {
    pub name: Option<String>,
    pub title: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(super) struct TmdbTranslation {
    pub iso_3166_1: Option<String>,
    pub iso_639_1: Option<String>,
    #[serde(default)]
    pub data: TmdbTranslationData,
}

#[derive(Debug, Default, Deserialize)]
pub(super) struct TmdbTranslations {
    #[serde(default)]
    pub translations: Vec<TmdbTranslation>,
}

/// Season entry inside a series response.
#[derive(Debug, Deserialize)]
pub(super) struct TmdbSeasonRef {
    pub season_number: u32,
}

/// Response of `/tv/{id}`.
#[derive(Debug, Deserialize)]
pub(super) struct TmdbSeries {
    pub id: u64,
    pub name: String,
    #[serde(default)]
    pub seasons: Vec<TmdbSeasonRef>,
    #[serde(default)]
    pub external_ids: TmdbExternalIds,
    #[serde(default)]
    pub images: TmdbImages,
}

/// Episode entry of a season listing or a find result.
#[derive(Debug, Deserialize)]
pub(super) struct TmdbEpisodeSummary {
    pub id: u64,
    #[serde(default)]
    pub name: String,
    pub season_number: u32,
    pub episode_number: u32,
    pub air_date: Option<String>,
    pub show_id: Option<u64>,
}

/// Response of `/tv/{id}/season/{n}`.
#[derive(Debug, Deserialize)]
pub(super) struct TmdbSeason {
    pub season_number: u32,
    #[serde(default)]
    pub episodes: Vec<TmdbEpisodeSummary>,
}

/// Response of `/tv/{id}/season/{n}/episode/{e}`.
#[derive(Debug, Deserialize)]
pub(super) struct TmdbEpisode {
    pub id: u64,
    #[serde(default)]
    pub name: String,
    pub season_number: u32,
    pub episode_number: u32,
    pub air_date: Option<String>,
    #[serde(default)]
    pub external_ids: TmdbExternalIds,
    #[serde(default)]
    pub images: TmdbImages,
    #[serde(default)]
    pub translations: TmdbTranslations,
}

#[derive(Debug, Deserialize)]
pub(super) struct TmdbAlternativeTitle {
    pub title: String,
}

#[derive(Debug, Default, Deserialize)]
pub(super) struct TmdbAlternativeTitles {
    #[serde(default)]
    pub titles: Vec<TmdbAlternativeTitle>,
}

/// Response of `/movie/{id}`.
#[derive(Debug, Deserialize)]
pub(super) struct TmdbMovie {
    pub id: u64,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub alternative_titles: TmdbAlternativeTitles,
    #[serde(default)]
    pub images: TmdbImages,
    #[serde(default)]
    pub translations: TmdbTranslations,
}

#[derive(Debug, Deserialize)]
pub(super) struct TmdbMovieSummary {
    pub id: u64,
    #[serde(default)]
    pub title: String,
}

#[derive(Debug, Deserialize)]
pub(super) struct TmdbSeriesSummary {
    pub id: u64,
    #[serde(default)]
    pub name: String,
}

/// A page of search results.
#[derive(Debug, Deserialize)]
pub(super) struct TmdbSearchPage<T> {
    #[serde(default = "Vec::new")]
    pub results: Vec<T>,
}

/// Response of `/find/{external_id}`.
#[derive(Debug, Deserialize)]
pub(super) struct TmdbFindResults {
    #[serde(default)]
    pub movie_results: Vec<TmdbMovieSummary>,
    #[serde(default)]
    pub tv_results: Vec<TmdbSeriesSummary>,
    #[serde(default)]
    pub tv_episode_results: Vec<TmdbEpisodeSummary>,
}
