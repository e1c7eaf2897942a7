use std::path::{Path, PathBuf};

use crate::audio::{RodioChannel, RodioOutput, load_backing_sound, open_output_stream};
use crate::config;
use crate::library::{Track, discover_backing, discover_rhythms};
use crate::session::{BackingChannels, Session, SessionError, SessionOptions, SystemClock};

/// The session wired to real audio output.
pub type LiveSession = Session<RodioOutput, RodioChannel>;

/// What was found on disk at startup.
pub struct Discovered {
    pub rhythms: Vec<Track>,
    pub backing: Vec<PathBuf>,
}

/// Resolve `dir` against `base` unless it is already absolute.
pub fn resolve_dir(base: &Path, dir: &str) -> PathBuf {
    base.join(dir)
}

pub fn discover(
    base: &Path,
    settings: &config::LibrarySettings,
) -> Result<Discovered, Box<dyn std::error::Error>> {
    let rhythms_dir = resolve_dir(base, &settings.rhythms_dir);
    let backing_dir = resolve_dir(base, &settings.backing_dir);

    let rhythms = discover_rhythms(&rhythms_dir, settings)?;
    if rhythms.is_empty() {
        return Err(format!(
            "{}: {}",
            SessionError::NoTracks,
            rhythms_dir.display()
        )
        .into());
    }
    let backing = discover_backing(&backing_dir, settings)?;

    log::info!(
        "found {} rhythm track(s) in {} and {} backing file(s) in {}",
        rhythms.len(),
        rhythms_dir.display(),
        backing.len(),
        backing_dir.display()
    );
    Ok(Discovered { rhythms, backing })
}

/// Open the output device, decode the backing loops and build the session.
pub fn build_session(
    settings: &config::Settings,
    found: Discovered,
) -> Result<LiveSession, Box<dyn std::error::Error>> {
    let stream = open_output_stream()?;
    let steps = settings.audio.fade_steps;

    let channels = std::array::from_fn(|_| RodioChannel::new(stream.clone(), steps));
    let mut backing = BackingChannels::new(channels, settings.backing.default_volume);
    for (slot, path) in found.backing.iter().enumerate() {
        match load_backing_sound(path) {
            Ok(sound) => {
                let name = path
                    .file_name()
                    .map(|n| n.to_string_lossy().into_owned())
                    .unwrap_or_else(|| path.display().to_string());
                backing.load(slot, name, sound);
            }
            Err(e) => log::warn!("backing slot {slot} left empty: {e}"),
        }
    }

    let engine = RodioOutput::new(stream, steps);
    let options = SessionOptions {
        fade_seconds: settings.audio.fade_seconds,
        selection_reset: settings.session.selection_reset.into(),
    };
    let session = Session::new(found.rhythms, engine, backing, SystemClock, options)?;
    Ok(session)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn empty_rhythms_dir_is_fatal() {
        let tmp = tempfile::tempdir().unwrap();
        let settings = config::LibrarySettings::default();

        let err = discover(tmp.path(), &settings).err().unwrap();
        assert!(err.to_string().contains("no rhythm tracks found"));
        // First run creates both folders.
        assert!(tmp.path().join("rhythms").is_dir());
        assert!(tmp.path().join("backing").is_dir());
    }

    #[test]
    fn discovers_rhythms_and_backing() {
        let tmp = tempfile::tempdir().unwrap();
        let rhythms = tmp.path().join("rhythms");
        let backing = tmp.path().join("backing");
        fs::create_dir_all(&rhythms).unwrap();
        fs::create_dir_all(&backing).unwrap();
        fs::write(rhythms.join("b.mp3"), b"x").unwrap();
        fs::write(rhythms.join("a.mp3"), b"x").unwrap();
        fs::write(backing.join("rain.mp3"), b"x").unwrap();

        let found = discover(tmp.path(), &config::LibrarySettings::default()).unwrap();
        let names: Vec<&str> = found.rhythms.iter().map(|t| t.name.as_str()).collect();
        assert_eq!(names, vec!["a.mp3", "b.mp3"]);
        assert_eq!(found.backing, vec![backing.join("rain.mp3")]);
    }

    #[test]
    fn absolute_dirs_are_kept() {
        let base = Path::new("/home/user");
        assert_eq!(resolve_dir(base, "/srv/rhythms"), PathBuf::from("/srv/rhythms"));
        assert_eq!(resolve_dir(base, "rhythms"), PathBuf::from("/home/user/rhythms"));
    }
}
