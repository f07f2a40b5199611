//! Resolver configuration
//!
//! Settings come from an optional TOML file. The TMDb API key may also be
//! given through the `TMDB_API_KEY` environment variable, which takes
//! precedence over the file.

use crate::ranking::Resolution;
use serde::Deserialize;
use std::env;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Environment variable holding the TMDb API key
pub const API_KEY_VARIABLE: &str = "TMDB_API_KEY";

/// Failures allowed before a lookup is blacklisted for good
pub const DEFAULT_RETRY_THRESHOLD: u32 = 5;

const BLACKLIST_FILE: &str = "tmdb_blacklist.json";
const ID_MAP_FILE: &str = "tmdb_ids.json";

/// Errors that can occur while loading the configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to read the config file
    #[error("Failed to read config file {path}: {source}")]
    ReadFailed {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Config file is not valid TOML or has unexpected values
    #[error("Failed to parse config file {path}: {source}")]
    ParseFailed {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    /// Neither the environment nor the config file provide an API key
    #[error("No TMDb API key found. Set {API_KEY_VARIABLE} or api_key in the config file")]
    MissingApiKey,

    /// Could not determine the platform data directory
    #[error("Could not determine data directory")]
    DataDirectoryNotFound,
}

/// Layout of the TOML config file
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct ConfigFile {
    api_key: Option<String>,
    retry_threshold: Option<u32>,
    minimum_resolution: Option<Resolution>,
    database_directory: Option<PathBuf>,
}

/// Settings the resolver is constructed with.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolverConfig {
    /// TMDb v3 API key
    pub api_key: String,
    /// Failures a lookup may accumulate before it is blacklisted for good
    pub retry_threshold: u32,
    /// Smallest acceptable source image
    pub minimum_resolution: Option<Resolution>,
    /// Directory holding the blacklist and identifier map files
    pub database_directory: PathBuf,
}

impl ResolverConfig {
    /// Creates a configuration with default threshold and no minimum
    /// resolution.
    pub fn new(api_key: impl Into<String>, database_directory: impl Into<PathBuf>) -> Self {
        Self {
            api_key: api_key.into(),
            retry_threshold: DEFAULT_RETRY_THRESHOLD,
            minimum_resolution: None,
            database_directory: database_directory.into(),
        }
    }

    pub fn with_retry_threshold(mut self, retry_threshold: u32) -> Self {
        self.retry_threshold = retry_threshold;
        self
    }

    pub fn with_minimum_resolution(mut self, minimum_resolution: Resolution) -> Self {
        self.minimum_resolution = Some(minimum_resolution);
        self
    }

    /// Loads the configuration.
    ///
    /// # Arguments
    ///
    /// * `path` - Config file to read. When `None`, the default config file
    ///   is read if it exists.
    ///
    /// # Errors
    ///
    /// Returns an error if an explicitly given file cannot be read, if the
    /// file does not parse, or if no API key is available.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let file = match path {
            Some(path) => read_config_file(path)?,
            None => match default_config_path() {
                Some(path) if path.exists() => read_config_file(&path)?,
                _ => ConfigFile::default(),
            },
        };

        let env_api_key = env::var(API_KEY_VARIABLE).ok();
        Self::from_file(file, env_api_key, default_database_directory)
    }

    fn from_file(
        file: ConfigFile,
        env_api_key: Option<String>,
        default_directory: impl FnOnce() -> Option<PathBuf>,
    ) -> Result<Self, ConfigError> {
        let api_key = env_api_key
            .into_iter()
            .chain(file.api_key)
            .find(|key| !key.trim().is_empty())
            .ok_or(ConfigError::MissingApiKey)?;

        let database_directory = match file.database_directory {
            Some(directory) => directory,
            None => default_directory().ok_or(ConfigError::DataDirectoryNotFound)?,
        };

        Ok(Self {
            api_key,
            retry_threshold: file.retry_threshold.unwrap_or(DEFAULT_RETRY_THRESHOLD),
            minimum_resolution: file.minimum_resolution,
            database_directory,
        })
    }

    /// Location of the blacklist file
    pub fn blacklist_path(&self) -> PathBuf {
        self.database_directory.join(BLACKLIST_FILE)
    }

    /// Location of the identifier map file
    pub fn id_map_path(&self) -> PathBuf {
        self.database_directory.join(ID_MAP_FILE)
    }
}

fn project_dirs() -> Option<directories::ProjectDirs> {
    directories::ProjectDirs::from("org", "artwork-resolver", "artwork-resolver")
}

/// Default config file location, e.g. `~/.config/artwork-resolver/config.toml`
pub fn default_config_path() -> Option<PathBuf> {
    project_dirs().map(|dirs| dirs.config_dir().join("config.toml"))
}

fn default_database_directory() -> Option<PathBuf> {
    project_dirs().map(|dirs| dirs.data_dir().to_path_buf())
}

fn read_config_file(path: &Path) -> Result<ConfigFile, ConfigError> {
    let content = fs::read_to_string(path).map_err(|e| ConfigError::ReadFailed {
        path: path.to_path_buf(),
        source: e,
    })?;

    toml::from_str(&content).map_err(|e| ConfigError::ParseFailed {
        path: path.to_path_buf(),
        source: e,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn no_directory() -> Option<PathBuf> {
        None
    }

    fn write_config(dir: &Path, content: &str) -> PathBuf {
        let path = dir.join("config.toml");
        fs::write(&path, content).unwrap();
        path
    }

    #[test]
    fn test_full_config_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_config(
            dir.path(),
            r#"
api_key = "file-key"
retry_threshold = 3
minimum_resolution = "1280x720"
database_directory = "/var/lib/artwork"
"#,
        );

        let file = read_config_file(&path).unwrap();
        let config = ResolverConfig::from_file(file, None, no_directory).unwrap();

        assert_eq!(config.api_key, "file-key");
        assert_eq!(config.retry_threshold, 3);
        assert_eq!(config.minimum_resolution, Some(Resolution::new(1280, 720)));
        assert_eq!(config.database_directory, PathBuf::from("/var/lib/artwork"));
        assert_eq!(
            config.blacklist_path(),
            PathBuf::from("/var/lib/artwork/tmdb_blacklist.json")
        );
        assert_eq!(
            config.id_map_path(),
            PathBuf::from("/var/lib/artwork/tmdb_ids.json")
        );
    }

    #[test]
    fn test_environment_key_takes_precedence() {
        let file = ConfigFile {
            api_key: Some("file-key".to_string()),
            ..Default::default()
        };
        let config = ResolverConfig::from_file(file, Some("env-key".to_string()), || {
            Some(PathBuf::from("/data"))
        })
        .unwrap();

        assert_eq!(config.api_key, "env-key");
        assert_eq!(config.retry_threshold, DEFAULT_RETRY_THRESHOLD);
        assert_eq!(config.minimum_resolution, None);
        assert_eq!(config.database_directory, PathBuf::from("/data"));
    }

    #[test]
    fn test_blank_environment_key_is_ignored() {
        let file = ConfigFile {
            api_key: Some("file-key".to_string()),
            database_directory: Some(PathBuf::from("/data")),
            ..Default::default()
        };
        let config = ResolverConfig::from_file(file, Some("  ".to_string()), no_directory).unwrap();

        assert_eq!(config.api_key, "file-key");
    }

    #[test]
    fn test_missing_api_key() {
        let result = ResolverConfig::from_file(ConfigFile::default(), None, || {
            Some(PathBuf::from("/data"))
        });
        assert!(matches!(result, Err(ConfigError::MissingApiKey)));
    }

    #[test]
    fn test_missing_data_directory() {
        let result =
            ResolverConfig::from_file(ConfigFile::default(), Some("key".to_string()), no_directory);
        assert!(matches!(result, Err(ConfigError::DataDirectoryNotFound)));
    }

    #[test]
    fn test_invalid_resolution_is_parse_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_config(dir.path(), "minimum_resolution = \"big\"\n");

        assert!(matches!(
            read_config_file(&path),
            Err(ConfigError::ParseFailed { .. })
        ));
    }

    #[test]
    fn test_unknown_field_is_parse_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_config(dir.path(), "api_token = \"x\"\n");

        assert!(matches!(
            read_config_file(&path),
            Err(ConfigError::ParseFailed { .. })
        ));
    }

    #[test]
    fn test_explicit_missing_file_is_read_error() {
        let dir = tempfile::tempdir().unwrap();
        let result = ResolverConfig::load(Some(&dir.path().join("absent.toml")));

        assert!(matches!(result, Err(ConfigError::ReadFailed { .. })));
    }

    #[test]
    fn test_builder() {
        let config = ResolverConfig::new("key", "/data")
            .with_retry_threshold(2)
            .with_minimum_resolution(Resolution::new(800, 600));

        assert_eq!(config.retry_threshold, 2);
        assert_eq!(config.minimum_resolution, Some(Resolution::new(800, 600)));
    }
}
