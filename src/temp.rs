//! Staging file management module
//!
//! Files are written to a uniquely named sibling first and moved over their
//! destination once complete, so readers never see a half-written database
//! or image.

use std::fs::{self, File};
use std::io;
use std::ops::Deref;
use std::path::{Path, PathBuf};

/// Guard for a staging file that is removed on drop unless persisted
#[derive(Debug)]
pub(crate) struct StagingFile {
    path: PathBuf,
    persisted: bool,
}

impl StagingFile {
    /// Get the path to the staging file
    pub(crate) fn path(&self) -> &Path {
        &self.path
    }

    /// Moves the staging file over `destination`, disarming the cleanup
    pub(crate) fn persist(mut self, destination: &Path) -> io::Result<()> {
        fs::rename(&self.path, destination)?;
        self.persisted = true;
        Ok(())
    }
}

impl Drop for StagingFile {
    fn drop(&mut self) {
        if !self.persisted {
            // Silently ignore errors during cleanup
            let _ = fs::remove_file(&self.path);
        }
    }
}

impl Deref for StagingFile {
    type Target = Path;

    fn deref(&self) -> &Self::Target {
        self.path()
    }
}

/// Creates a staging file next to `destination`
///
/// The staging file lives in the same directory as the destination, so the
/// final rename never crosses filesystems. Its name is the destination's file
/// name plus a ULID, which keeps concurrent writers from clobbering each
/// other's partial output.
///
/// # Examples
///
/// ```ignore
/// let (staging, mut file) = create_staging_file(Path::new("/data/tmdb_ids.json"))?;
/// file.write_all(b"[]")?;
/// drop(file);
/// staging.persist(Path::new("/data/tmdb_ids.json"))?;
/// ```
pub(crate) fn create_staging_file(destination: &Path) -> io::Result<(StagingFile, File)> {
    let directory = match destination.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    };
    let name = destination
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "staging".to_string());

    let ulid = ulid::Ulid::new();
    let path = directory.join(format!(".{}_{}.partial", name, ulid));

    let file = File::create(&path)?;

    Ok((
        StagingFile {
            path,
            persisted: false,
        },
        file,
    ))
}
