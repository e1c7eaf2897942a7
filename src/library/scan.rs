use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use lofty::prelude::AudioFile;
use walkdir::WalkDir;

use crate::config::LibrarySettings;

use super::model::{LibraryError, MAX_TRACKS, Track};

fn is_audio_file(path: &Path, settings: &LibrarySettings) -> bool {
    let exts: Vec<String> = settings
        .extensions
        .iter()
        .map(|e| e.trim().trim_start_matches('.').to_ascii_lowercase())
        .filter(|e| !e.is_empty())
        .collect();

    path.extension()
        .and_then(|s| s.to_str())
        .map(|ext| {
            let ext = ext.to_ascii_lowercase();
            exts.iter().any(|e| e == &ext)
        })
        .unwrap_or(false)
}

fn is_hidden(path: &Path) -> bool {
    path.file_name()
        .and_then(|s| s.to_str())
        .map(|name| name.starts_with('.'))
        .unwrap_or(false)
}

/// Make sure `dir` exists, creating it when `settings.create_missing` is set.
pub fn ensure_dir(dir: &Path, settings: &LibrarySettings) -> Result<(), LibraryError> {
    if settings.create_missing && !dir.exists() {
        fs::create_dir_all(dir).map_err(|source| LibraryError::CreateDir {
            path: dir.to_path_buf(),
            source,
        })?;
        log::info!("created track directory {}", dir.display());
    }
    Ok(())
}

/// List up to `MAX_TRACKS` audio files directly inside `dir`, in lexicographic order.
///
/// A missing directory yields an empty list.
pub fn scan_audio_files(
    dir: &Path,
    settings: &LibrarySettings,
) -> Result<Vec<PathBuf>, LibraryError> {
    if !dir.exists() {
        return Ok(Vec::new());
    }

    let mut files: Vec<PathBuf> = Vec::new();
    for entry in WalkDir::new(dir).min_depth(1).max_depth(1) {
        let entry = entry.map_err(|source| LibraryError::ReadDir {
            path: dir.to_path_buf(),
            source,
        })?;
        let path = entry.path();
        if entry.file_type().is_file()
            && (settings.include_hidden || !is_hidden(path))
            && is_audio_file(path, settings)
        {
            files.push(path.to_path_buf());
        }
    }

    files.sort();
    files.truncate(MAX_TRACKS);
    Ok(files)
}

/// Best-effort duration probe. Unreadable files and zero lengths both map to `None`.
pub fn probe_duration(path: &Path) -> Option<Duration> {
    match lofty::read_from_path(path) {
        Ok(tagged) => Some(tagged.properties().duration()).filter(|d| !d.is_zero()),
        Err(e) => {
            log::debug!("could not probe duration of {}: {e}", path.display());
            None
        }
    }
}

/// Discover the rhythm tracks in `dir` with their probed durations.
pub fn discover_rhythms(
    dir: &Path,
    settings: &LibrarySettings,
) -> Result<Vec<Track>, LibraryError> {
    ensure_dir(dir, settings)?;
    let tracks = scan_audio_files(dir, settings)?
        .into_iter()
        .map(|path| {
            let duration = probe_duration(&path);
            Track::new(path, duration)
        })
        .collect();
    Ok(tracks)
}

/// Discover the backing track files in `dir`. Durations are irrelevant for loops.
pub fn discover_backing(
    dir: &Path,
    settings: &LibrarySettings,
) -> Result<Vec<PathBuf>, LibraryError> {
    ensure_dir(dir, settings)?;
    scan_audio_files(dir, settings)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn is_audio_file_matches_configured_extensions_case_insensitive() {
        let settings = LibrarySettings::default();
        assert!(is_audio_file(Path::new("/tmp/a.mp3"), &settings));
        assert!(is_audio_file(Path::new("/tmp/a.MP3"), &settings));
        assert!(!is_audio_file(Path::new("/tmp/a.flac"), &settings));
        assert!(!is_audio_file(Path::new("/tmp/a.txt"), &settings));
        assert!(!is_audio_file(Path::new("/tmp/a"), &settings));

        let settings = LibrarySettings {
            extensions: vec![".OGG".into(), " ".into()],
            ..LibrarySettings::default()
        };
        assert!(is_audio_file(Path::new("/tmp/a.ogg"), &settings));
        assert!(!is_audio_file(Path::new("/tmp/a.mp3"), &settings));
    }

    #[test]
    fn scan_caps_at_three_in_lexicographic_order() {
        let dir = tempdir().unwrap();
        for name in ["d.mp3", "b.mp3", "a.mp3", "c.mp3", "notes.txt"] {
            fs::write(dir.path().join(name), b"not a real mp3").unwrap();
        }

        let files = scan_audio_files(dir.path(), &LibrarySettings::default()).unwrap();
        let names: Vec<&str> = files
            .iter()
            .map(|p| p.file_name().unwrap().to_str().unwrap())
            .collect();
        assert_eq!(names, vec!["a.mp3", "b.mp3", "c.mp3"]);
    }

    #[test]
    fn scan_ignores_subdirectories_and_hidden_files() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join(".hidden.mp3"), b"x").unwrap();
        fs::write(dir.path().join("visible.mp3"), b"x").unwrap();
        let sub = dir.path().join("sub");
        fs::create_dir_all(&sub).unwrap();
        fs::write(sub.join("child.mp3"), b"x").unwrap();

        let files = scan_audio_files(dir.path(), &LibrarySettings::default()).unwrap();
        assert_eq!(files, vec![dir.path().join("visible.mp3")]);

        let settings = LibrarySettings {
            include_hidden: true,
            ..LibrarySettings::default()
        };
        let files = scan_audio_files(dir.path(), &settings).unwrap();
        assert_eq!(files.len(), 2);
    }

    #[test]
    fn missing_directory_is_created_when_configured() {
        let dir = tempdir().unwrap();
        let rhythms = dir.path().join("rhythms");

        let tracks = discover_rhythms(&rhythms, &LibrarySettings::default()).unwrap();
        assert!(tracks.is_empty());
        assert!(rhythms.is_dir());

        let other = dir.path().join("backing");
        let settings = LibrarySettings {
            create_missing: false,
            ..LibrarySettings::default()
        };
        assert!(discover_backing(&other, &settings).unwrap().is_empty());
        assert!(!other.exists());
    }
}
