//! Image selection
//!
//! Picks the "best" image out of the candidates TMDb returns for an episode,
//! movie or series. Both selectors are pure functions of their input.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// An image offered by the provider.
#[derive(Debug, Clone, PartialEq)]
pub struct ImageCandidate {
    pub width: u32,
    pub height: u32,
    /// ISO 639-1 language code, `None` for unlocalized images
    pub language: Option<String>,
    /// Provider vote average
    pub score: f64,
    /// Full URL of the image
    pub url: String,
}

impl ImageCandidate {
    /// Number of pixels in the image.
    pub fn area(&self) -> u64 {
        u64::from(self.width) * u64::from(self.height)
    }

    pub fn is_localized(&self) -> bool {
        self.language.is_some()
    }

    fn is_english(&self) -> bool {
        self.language.as_deref() == Some("en")
    }

    fn is_svg(&self) -> bool {
        self.url.to_ascii_lowercase().ends_with(".svg")
    }
}

/// A minimum image size, written as `WIDTHxHEIGHT`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Resolution {
    pub width: u32,
    pub height: u32,
}

impl Resolution {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Whether an image of the given size is at least this large in both
    /// dimensions.
    pub fn is_met_by(&self, width: u32, height: u32) -> bool {
        width >= self.width && height >= self.height
    }
}

impl fmt::Display for Resolution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

impl FromStr for Resolution {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (width, height) = s
            .trim()
            .split_once(['x', 'X'])
            .ok_or_else(|| format!("Invalid resolution '{}', expected WIDTHxHEIGHT", s))?;

        let parse = |value: &str| {
            value
                .trim()
                .parse::<u32>()
                .map_err(|e| format!("Invalid resolution '{}': {}", s, e))
        };

        Ok(Self::new(parse(width)?, parse(height)?))
    }
}

impl TryFrom<String> for Resolution {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Resolution> for String {
    fn from(value: Resolution) -> Self {
        value.to_string()
    }
}

/// Constraints applied when ranking images.
#[derive(Debug, Clone, Copy, Default)]
pub struct ImageFilter {
    /// Source images are subject to the size and localization filters
    pub is_source_image: bool,
    /// Drop images that carry a language code
    pub skip_localized: bool,
    /// Smallest acceptable source image
    pub minimum_resolution: Option<Resolution>,
}

impl ImageFilter {
    fn accepts(&self, image: &ImageCandidate) -> bool {
        if !self.is_source_image {
            return true;
        }

        if let Some(minimum) = self.minimum_resolution {
            if !minimum.is_met_by(image.width, image.height) {
                return false;
            }
        }

        !(self.skip_localized && image.is_localized())
    }
}

/// Selects the best image among those passing `filter`.
///
/// Larger images win; on an exact area tie the higher score wins, and on a
/// full tie the earlier candidate is kept.
pub fn select_best_image<'a>(
    images: &'a [ImageCandidate],
    filter: &ImageFilter,
) -> Option<&'a ImageCandidate> {
    let mut best: Option<&ImageCandidate> = None;

    for image in images.iter().filter(|image| filter.accepts(image)) {
        let better = match best {
            None => true,
            Some(current) => {
                image.area() > current.area()
                    || (image.area() == current.area() && image.score > current.score)
            }
        };

        if better {
            best = Some(image);
        }
    }

    best
}

/// Selects the best English logo.
///
/// The first English SVG wins outright; otherwise the largest English raster
/// image is chosen. Logos in other languages are never considered.
pub fn select_best_logo(logos: &[ImageCandidate]) -> Option<&ImageCandidate> {
    let mut best: Option<&ImageCandidate> = None;

    for logo in logos.iter().filter(|logo| logo.is_english()) {
        if logo.is_svg() {
            return Some(logo);
        }

        if best.is_none_or(|current| logo.area() > current.area()) {
            best = Some(logo);
        }
    }

    best
}

#[cfg(test)]
mod tests {
    use super::*;

    fn image(width: u32, height: u32, score: f64, language: Option<&str>) -> ImageCandidate {
        ImageCandidate {
            width,
            height,
            language: language.map(str::to_string),
            score,
            url: format!("https://image.example/{}x{}_{}.jpg", width, height, score),
        }
    }

    fn source_filter(skip_localized: bool, minimum: Option<Resolution>) -> ImageFilter {
        ImageFilter {
            is_source_image: true,
            skip_localized,
            minimum_resolution: minimum,
        }
    }

    #[test]
    fn test_largest_image_wins() {
        let images = vec![
            image(1280, 720, 9.0, None),
            image(1920, 1080, 1.0, None),
            image(640, 360, 10.0, None),
        ];
        let best = select_best_image(&images, &source_filter(false, None)).unwrap();
        assert_eq!(best.width, 1920);
    }

    #[test]
    fn test_area_tie_prefers_higher_score() {
        let images = vec![
            image(1920, 1080, 5.2, None),
            image(1080, 1920, 5.6, None),
            image(1920, 1080, 5.4, None),
        ];
        let best = select_best_image(&images, &source_filter(false, None)).unwrap();
        assert_eq!(best.score, 5.6);
    }

    #[test]
    fn test_full_tie_keeps_first() {
        let images = vec![image(100, 100, 1.0, Some("en")), image(100, 100, 1.0, None)];
        let best = select_best_image(&images, &source_filter(false, None)).unwrap();
        assert_eq!(best.language.as_deref(), Some("en"));
    }

    #[test]
    fn test_all_filtered_yields_none() {
        let images = vec![image(800, 600, 5.0, None), image(1200, 800, 1.0, Some("fr"))];
        let filter = source_filter(true, Some(Resolution::new(1000, 700)));
        assert_eq!(select_best_image(&images, &filter), None);
    }

    #[test]
    fn test_localized_kept_unless_skipped() {
        let images = vec![image(800, 600, 5.0, None), image(1200, 800, 1.0, Some("fr"))];

        let best = select_best_image(&images, &source_filter(false, None)).unwrap();
        assert_eq!(best.language.as_deref(), Some("fr"));

        let best = select_best_image(&images, &source_filter(true, None)).unwrap();
        assert_eq!(best.language, None);
    }

    #[test]
    fn test_minimum_applies_to_each_dimension() {
        let images = vec![image(4000, 100, 1.0, None), image(1000, 700, 1.0, None)];
        let filter = source_filter(false, Some(Resolution::new(1000, 700)));
        let best = select_best_image(&images, &filter).unwrap();
        assert_eq!((best.width, best.height), (1000, 700));
    }

    #[test]
    fn test_non_source_images_unfiltered() {
        let images = vec![image(10, 10, 1.0, Some("fr"))];
        let filter = ImageFilter {
            is_source_image: false,
            skip_localized: true,
            minimum_resolution: Some(Resolution::new(1000, 1000)),
        };
        assert!(select_best_image(&images, &filter).is_some());
    }

    #[test]
    fn test_empty_input() {
        assert_eq!(select_best_image(&[], &ImageFilter::default()), None);
        assert_eq!(select_best_logo(&[]), None);
    }

    #[test]
    fn test_logo_svg_short_circuits() {
        let mut svg = image(10, 10, 0.0, Some("en"));
        svg.url = "https://image.example/logo.svg".to_string();
        let logos = vec![image(2000, 800, 9.0, Some("en")), svg.clone()];

        assert_eq!(select_best_logo(&logos), Some(&svg));
    }

    #[test]
    fn test_logo_largest_english_raster() {
        let logos = vec![
            image(500, 200, 1.0, Some("en")),
            image(3000, 1000, 1.0, Some("de")),
            image(1000, 400, 1.0, Some("en")),
            image(4000, 1600, 1.0, None),
        ];
        let best = select_best_logo(&logos).unwrap();
        assert_eq!((best.width, best.language.as_deref()), (1000, Some("en")));
    }

    #[test]
    fn test_logo_without_english_is_none() {
        let mut svg = image(10, 10, 0.0, Some("ja"));
        svg.url = "https://image.example/logo.svg".to_string();
        let logos = vec![image(500, 200, 1.0, None), svg];
        assert_eq!(select_best_logo(&logos), None);
    }

    #[test]
    fn test_parse_resolution() {
        assert_eq!("1920x1080".parse::<Resolution>(), Ok(Resolution::new(1920, 1080)));
        assert_eq!(" 800X600 ".parse::<Resolution>(), Ok(Resolution::new(800, 600)));
        assert!("1920".parse::<Resolution>().is_err());
        assert!("axb".parse::<Resolution>().is_err());
    }
}
