//! Engine contracts and errors shared by the audio subsystem.

use std::path::{Path, PathBuf};
use std::time::Duration;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum AudioError {
    #[error("no audio output device: {0}")]
    NoOutputDevice(String),
    #[error("failed to open {path}: {source}")]
    Open {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to decode {path}: {reason}")]
    Decode { path: PathBuf, reason: String },
    #[error("nothing is loaded")]
    NothingLoaded,
}

/// The primary transport: one loaded track, played from an arbitrary offset.
///
/// Commands are fire-and-forget. Only `load` and `play` report failures since
/// those are the only ones that touch the file system.
pub trait PrimaryOutput {
    /// Load `path`, stopping whatever was playing. The track stays stopped.
    fn load(&mut self, path: &Path) -> Result<(), AudioError>;
    /// Start the loaded track at `start`, fading in over `fade` (zero = no fade).
    fn play(&mut self, start: Duration, fade: Duration) -> Result<(), AudioError>;
    fn pause(&mut self);
    fn resume(&mut self);
    fn stop(&mut self);
    /// Fade the current audio to silence over `fade`, then drop it.
    fn fade_out(&mut self, fade: Duration);
    /// Whether audio is currently coming out. False once a track runs dry.
    fn is_producing_audio(&self) -> bool;
}

/// One independent mixing channel looping a backing sound.
pub trait Channel {
    type Sound;

    fn play_looped(&mut self, sound: &Self::Sound, fade: Duration);
    fn pause(&mut self);
    fn resume(&mut self);
    fn fade_out(&mut self, fade: Duration);
    fn set_volume(&mut self, volume: f32);
}
