use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

/// Hard cap on rhythm tracks and on backing tracks.
pub const MAX_TRACKS: usize = 3;

/// A discovered audio file. Immutable once scanned.
#[derive(Debug, Clone, PartialEq)]
pub struct Track {
    pub name: String,
    pub path: PathBuf,
    /// `None` when the length could not be probed (or probed as zero).
    pub duration: Option<Duration>,
}

impl Track {
    pub fn new(path: PathBuf, duration: Option<Duration>) -> Self {
        let name = path
            .file_name()
            .and_then(|s| s.to_str())
            .unwrap_or("UNKNOWN")
            .to_string();
        Self {
            name,
            path,
            duration: duration.filter(|d| !d.is_zero()),
        }
    }
}

#[derive(Debug, Error)]
pub enum LibraryError {
    #[error("failed to create directory {path}: {source}")]
    CreateDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to read directory {path}: {source}")]
    ReadDir {
        path: PathBuf,
        #[source]
        source: walkdir::Error,
    },
}
