//! Utilities for creating `rodio` sinks and fading them out.
//!
//! Opening a track and detaching a fading sink are shared by the primary
//! output and the backing channels.

use std::fs::File;
use std::io::BufReader;
use std::path::Path;
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use rodio::{Decoder, OutputStream, Sink, Source};

use crate::config::MAX_FADE_STEPS;

use super::types::AudioError;

pub(super) type FileDecoder = Decoder<BufReader<File>>;

/// Open and decode `path`.
pub(super) fn open_source(path: &Path) -> Result<FileDecoder, AudioError> {
    let file = File::open(path).map_err(|source| AudioError::Open {
        path: path.to_path_buf(),
        source,
    })?;

    Decoder::new(BufReader::new(file)).map_err(|e| AudioError::Decode {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })
}

/// Create a paused `Sink` playing `path` from `start_at`, fading in over `fade_in`.
pub(super) fn create_sink_at(
    stream: &OutputStream,
    path: &Path,
    start_at: Duration,
    fade_in: Duration,
) -> Result<Sink, AudioError> {
    // `skip_duration` is our seeking primitive; even Duration::ZERO is fine.
    let source = open_source(path)?.skip_duration(start_at);

    let sink = Sink::connect_new(stream.mixer());
    if fade_in.is_zero() {
        sink.append(source);
    } else {
        sink.append(source.fade_in(fade_in));
    }
    sink.pause();
    Ok(sink)
}

/// Volume levels stepping from `from` down to silence in `steps` steps.
pub(crate) fn fade_out_levels(from: f32, steps: u64) -> Vec<f32> {
    let steps = steps.clamp(1, MAX_FADE_STEPS);
    (1..=steps)
        .map(|step| {
            let t = step as f32 / steps as f32;
            (from * (1.0 - t)).max(0.0)
        })
        .collect()
}

/// Fade `sink` to silence over `fade` on a detached thread, then stop it.
///
/// The caller has already let go of the sink, so a new one can start on the
/// same mixer while this one fades: that overlap is the crossfade.
pub(super) fn fade_out_detached(sink: Arc<Sink>, fade: Duration, steps: u64) {
    if fade.is_zero() {
        sink.stop();
        return;
    }

    let levels = fade_out_levels(sink.volume(), steps);
    let step = fade / levels.len() as u32;
    thread::spawn(move || {
        for level in levels {
            sink.set_volume(level);
            thread::sleep(step);
        }
        sink.stop();
    });
}
