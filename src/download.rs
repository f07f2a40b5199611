//! Image download
//!
//! Fetches a resolved image URL to disk. The body is streamed into a staging
//! file next to the destination which is only renamed into place once the
//! download completed.

use crate::temp::create_staging_file;
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors that can occur while downloading an image
#[derive(Debug, Error)]
pub enum DownloadError {
    /// Failed to create the destination directory
    #[error("Failed to create directory at {path}: {source}")]
    DirectoryCreationFailed {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// The request could not be sent or the body could not be read
    #[error("Failed to download {url}: {source}")]
    RequestFailed {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    /// The server answered with a non-success status
    #[error("HTTP {status} while downloading {url}")]
    HttpStatus {
        url: String,
        status: reqwest::StatusCode,
    },

    /// Failed to write the image file
    #[error("Failed to write image file {path}: {source}")]
    WriteFailed {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Downloads `url` to `destination`, replacing any existing file.
///
/// # Arguments
///
/// * `client` - HTTP client to download with
/// * `url` - The image URL, as returned by the resolver
/// * `destination` - Where to store the image
///
/// # Returns
///
/// The number of bytes written.
///
/// # Examples
///
/// ```ignore
/// let client = reqwest::blocking::Client::new();
/// let size = download_image(&client, &url, Path::new("s01e01.jpg"))?;
/// ```
pub fn download_image(
    client: &reqwest::blocking::Client,
    url: &str,
    destination: &Path,
) -> Result<u64, DownloadError> {
    if let Some(parent) = destination.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent).map_err(|e| DownloadError::DirectoryCreationFailed {
                path: parent.to_path_buf(),
                source: e,
            })?;
        }
    }

    let mut response = client
        .get(url)
        .send()
        .map_err(|e| DownloadError::RequestFailed {
            url: url.to_string(),
            source: e,
        })?;

    if !response.status().is_success() {
        return Err(DownloadError::HttpStatus {
            url: url.to_string(),
            status: response.status(),
        });
    }

    let write_failed = |e: io::Error| DownloadError::WriteFailed {
        path: destination.to_path_buf(),
        source: e,
    };

    let (staging, mut file) = create_staging_file(destination).map_err(write_failed)?;
    let size = response.copy_to(&mut file).map_err(|e| DownloadError::RequestFailed {
        url: url.to_string(),
        source: e,
    })?;
    file.flush().map_err(write_failed)?;
    drop(file);

    staging.persist(destination).map_err(write_failed)?;
    tracing::debug!("Downloaded {} to {}", url, destination.display());

    Ok(size)
}
