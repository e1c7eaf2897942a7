use std::path::{Path, PathBuf};
use std::rc::Rc;
use std::sync::Arc;
use std::time::Duration;

use rodio::source::Buffered;
use rodio::{OutputStream, OutputStreamBuilder, Sink, Source};

use super::sink::{FileDecoder, create_sink_at, fade_out_detached, open_source};
use super::types::{AudioError, Channel, PrimaryOutput};

/// A decoded backing loop, kept in memory so each restart is instant.
pub type BackingSound = Buffered<FileDecoder>;

/// Open the default output device.
pub fn open_output_stream() -> Result<Rc<OutputStream>, AudioError> {
    let mut stream = OutputStreamBuilder::open_default_stream()
        .map_err(|e| AudioError::NoOutputDevice(e.to_string()))?;
    // rodio logs to stderr when OutputStream is dropped. That's useful in debugging,
    // but noisy for a TUI app.
    stream.log_on_drop(false);
    Ok(Rc::new(stream))
}

/// Decode a backing file into a reusable in-memory sound.
pub fn load_backing_sound(path: &Path) -> Result<BackingSound, AudioError> {
    Ok(open_source(path)?.buffered())
}

/// `rodio` implementation of the primary transport.
pub struct RodioOutput {
    stream: Rc<OutputStream>,
    loaded: Option<PathBuf>,
    sink: Option<Arc<Sink>>,
    fade_steps: u64,
}

impl RodioOutput {
    pub fn new(stream: Rc<OutputStream>, fade_steps: u64) -> Self {
        Self {
            stream,
            loaded: None,
            sink: None,
            fade_steps,
        }
    }
}

impl PrimaryOutput for RodioOutput {
    fn load(&mut self, path: &Path) -> Result<(), AudioError> {
        self.stop();
        self.loaded = None;
        // Decode once up front so a broken file is reported at load time, not on play.
        open_source(path)?;
        self.loaded = Some(path.to_path_buf());
        Ok(())
    }

    fn play(&mut self, start: Duration, fade: Duration) -> Result<(), AudioError> {
        let path = self.loaded.clone().ok_or(AudioError::NothingLoaded)?;
        let sink = create_sink_at(&self.stream, &path, start, fade)?;
        self.stop();
        sink.set_volume(1.0);
        sink.play();
        self.sink = Some(Arc::new(sink));
        Ok(())
    }

    fn pause(&mut self) {
        if let Some(s) = self.sink.as_ref() {
            s.pause();
        }
    }

    fn resume(&mut self) {
        if let Some(s) = self.sink.as_ref() {
            s.play();
        }
    }

    fn stop(&mut self) {
        if let Some(s) = self.sink.take() {
            s.stop();
        }
    }

    fn fade_out(&mut self, fade: Duration) {
        if let Some(s) = self.sink.take() {
            fade_out_detached(s, fade, self.fade_steps);
        }
    }

    fn is_producing_audio(&self) -> bool {
        self.sink
            .as_ref()
            .is_some_and(|s| !s.empty() && !s.is_paused())
    }
}

/// `rodio` implementation of a backing channel: its own sink on the shared mixer.
pub struct RodioChannel {
    stream: Rc<OutputStream>,
    sink: Option<Arc<Sink>>,
    volume: f32,
    fade_steps: u64,
}

impl RodioChannel {
    pub fn new(stream: Rc<OutputStream>, fade_steps: u64) -> Self {
        Self {
            stream,
            sink: None,
            volume: 1.0,
            fade_steps,
        }
    }
}

impl Channel for RodioChannel {
    type Sound = BackingSound;

    fn play_looped(&mut self, sound: &Self::Sound, fade: Duration) {
        if let Some(old) = self.sink.take() {
            old.stop();
        }

        let sink = Sink::connect_new(self.stream.mixer());
        let looped = sound.clone().repeat_infinite();
        if fade.is_zero() {
            sink.append(looped);
        } else {
            sink.append(looped.fade_in(fade));
        }
        sink.set_volume(self.volume);
        sink.play();
        self.sink = Some(Arc::new(sink));
    }

    fn pause(&mut self) {
        if let Some(s) = self.sink.as_ref() {
            s.pause();
        }
    }

    fn resume(&mut self) {
        if let Some(s) = self.sink.as_ref() {
            s.play();
        }
    }

    fn fade_out(&mut self, fade: Duration) {
        if let Some(s) = self.sink.take() {
            fade_out_detached(s, fade, self.fade_steps);
        }
    }

    fn set_volume(&mut self, volume: f32) {
        self.volume = volume;
        if let Some(s) = self.sink.as_ref() {
            s.set_volume(volume);
        }
    }
}
