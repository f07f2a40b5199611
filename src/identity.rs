//! Series and episode identities
//!
//! These are the partial, possibly stale descriptions of media that callers
//! hand to the resolver. Every ID is optional; only the series name and year
//! are guaranteed, and together they form the natural key used by the
//! blacklist and the identifier map.

use std::fmt;

/// A series as known to the caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SeriesIdentity {
    /// The name of the series
    pub name: String,
    /// The year the series first aired
    pub year: i32,
    /// TheMovieDatabase series ID
    pub tmdb_id: Option<u64>,
    /// TheTVDB series ID
    pub tvdb_id: Option<u64>,
    /// IMDb series ID (e.g. `tt0903747`)
    pub imdb_id: Option<String>,
}

impl SeriesIdentity {
    /// Creates a series identity without any known IDs.
    pub fn new(name: impl Into<String>, year: i32) -> Self {
        Self {
            name: name.into(),
            year,
            tmdb_id: None,
            tvdb_id: None,
            imdb_id: None,
        }
    }

    /// The natural key of this series, `"Name (Year)"`.
    pub fn full_name(&self) -> String {
        format!("{} ({})", self.name, self.year)
    }

    /// Whether the TMDb, TVDb and IMDb IDs are all known.
    pub fn has_all_ids(&self) -> bool {
        self.tmdb_id.is_some() && self.tvdb_id.is_some() && self.imdb_id.is_some()
    }

    pub fn with_tmdb_id(mut self, tmdb_id: u64) -> Self {
        self.tmdb_id = Some(tmdb_id);
        self
    }

    pub fn with_tvdb_id(mut self, tvdb_id: u64) -> Self {
        self.tvdb_id = Some(tvdb_id);
        self
    }

    pub fn with_imdb_id(mut self, imdb_id: impl Into<String>) -> Self {
        self.imdb_id = Some(imdb_id.into());
        self
    }
}

impl fmt::Display for SeriesIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.name, self.year)
    }
}

/// An episode as known to the caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EpisodeIdentity {
    /// The episode title, empty if unknown
    pub title: String,
    /// The season number (0 for specials)
    pub season_number: u32,
    /// The episode number within the season
    pub episode_number: u32,
    /// The episode number counted across all seasons
    pub absolute_number: Option<u32>,
    /// TheTVDB episode ID
    pub tvdb_id: Option<u64>,
    /// IMDb episode ID
    pub imdb_id: Option<String>,
    /// TheMovieDatabase episode (or movie) ID
    pub tmdb_id: Option<u64>,
}

impl EpisodeIdentity {
    /// Creates an episode identity without absolute number or IDs.
    pub fn new(title: impl Into<String>, season_number: u32, episode_number: u32) -> Self {
        Self {
            title: title.into(),
            season_number,
            episode_number,
            absolute_number: None,
            tvdb_id: None,
            imdb_id: None,
            tmdb_id: None,
        }
    }

    pub fn with_absolute_number(mut self, absolute_number: u32) -> Self {
        self.absolute_number = Some(absolute_number);
        self
    }

    pub fn with_tvdb_id(mut self, tvdb_id: u64) -> Self {
        self.tvdb_id = Some(tvdb_id);
        self
    }

    pub fn with_imdb_id(mut self, imdb_id: impl Into<String>) -> Self {
        self.imdb_id = Some(imdb_id.into());
        self
    }

    pub fn with_tmdb_id(mut self, tmdb_id: u64) -> Self {
        self.tmdb_id = Some(tmdb_id);
        self
    }

    /// Whether the given provider ID is this episode's known TMDb ID.
    pub(crate) fn is_tmdb_id(&self, id: u64) -> bool {
        self.tmdb_id == Some(id)
    }

    /// Whether any of the given names matches this episode's title.
    ///
    /// Matching ignores case and everything that is not an ASCII letter or
    /// digit. An episode without a title never matches.
    pub fn title_matches<'a, I>(&self, names: I) -> bool
    where
        I: IntoIterator<Item = &'a str>,
    {
        let own = matching_title(&self.title);
        if own.is_empty() {
            return false;
        }

        names.into_iter().any(|name| matching_title(name) == own)
    }
}

impl fmt::Display for EpisodeIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "S{:02}E{:02}", self.season_number, self.episode_number)
    }
}

/// Reduces a title to lowercase ASCII letters and digits.
pub(crate) fn matching_title(text: &str) -> String {
    text.chars()
        .filter(|c| c.is_ascii_alphanumeric())
        .map(|c| c.to_ascii_lowercase())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_full_name() {
        let series = SeriesIdentity::new("Breaking Bad", 2008);
        assert_eq!(series.full_name(), "Breaking Bad (2008)");
        assert_eq!(series.to_string(), "Breaking Bad (2008)");
    }

    #[test]
    fn test_has_all_ids() {
        let series = SeriesIdentity::new("Breaking Bad", 2008)
            .with_tmdb_id(1396)
            .with_tvdb_id(81189);
        assert!(!series.has_all_ids());
        assert!(series.with_imdb_id("tt0903747").has_all_ids());
    }

    #[test]
    fn test_matching_title() {
        assert_eq!(matching_title("Cat's in the Bag..."), "catsinthebag");
        assert_eq!(matching_title("Pilot (Part 1)"), "pilotpart1");
        assert_eq!(matching_title("第1話"), "1");
    }

    #[test]
    fn test_title_matches_any_name() {
        let episode = EpisodeIdentity::new("The One Where It Begins", 1, 1);
        assert!(episode.title_matches(["Something Else", "the one where it begins!"]));
        assert!(!episode.title_matches(["Something Else"]));
    }

    #[test]
    fn test_empty_title_never_matches() {
        let episode = EpisodeIdentity::new("", 1, 1);
        assert!(!episode.title_matches([""]));
        assert!(!episode.title_matches(["..."]));
    }

    #[test]
    fn test_episode_display() {
        assert_eq!(EpisodeIdentity::new("Pilot", 1, 2).to_string(), "S01E02");
    }
}
