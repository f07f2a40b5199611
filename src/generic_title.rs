//! Detection of provider-generated placeholder titles
//!
//! TMDb fills untranslated episodes with titles like "Episode 5" in the
//! requested language. Such a title is no better than having none at all.

/// Placeholder title template per language code; `{number}` is replaced by
/// the episode number.
pub const GENERIC_TITLE_FORMATS: &[(&str, &str)] = &[
    ("ar", "الحلقة {number}"),
    ("cs", "{number}. epizoda"),
    ("de", "Episode {number}"),
    ("en", "Episode {number}"),
    ("es", "Episodio {number}"),
    ("fr", "Épisode {number}"),
    ("he", "פרק {number}"),
    ("hu", "{number}. epizód"),
    ("id", "Episode {number}"),
    ("it", "Episodio {number}"),
    ("ja", "第{number}話"),
    ("ko", "에피소드 {number}"),
    ("pl", "Odcinek {number}"),
    ("pt", "Episódio {number}"),
    ("ro", "Episodul {number}"),
    ("ru", "Эпизод {number}"),
    ("sk", "Epizóda {number}"),
    ("th", "Episode {number}"),
    ("tr", "{number}. Bölüm"),
    ("uk", "Серія {number}"),
    ("vi", "Episode {number}"),
    ("zh", "第 {number} 集"),
];

/// Returns the placeholder template for `language_code`, if one is known.
pub fn generic_title_format(language_code: &str) -> Option<&'static str> {
    GENERIC_TITLE_FORMATS
        .iter()
        .find(|(code, _)| *code == language_code)
        .map(|(_, format)| *format)
}

/// Whether `title` is the placeholder TMDb generates for this episode.
///
/// The title is compared against the template rendered with the episode
/// number and, when known, the absolute number. Unknown language codes never
/// produce a match.
pub fn is_generic_title(
    title: &str,
    language_code: &str,
    episode_number: u32,
    absolute_number: Option<u32>,
) -> bool {
    let Some(format) = generic_title_format(language_code) else {
        tracing::debug!("Unrecognized language code \"{}\"", language_code);
        return false;
    };

    let render = |number: u32| format.replace("{number}", &number.to_string());

    title == render(episode_number) || absolute_number.is_some_and(|abs| title == render(abs))
}
