use std::time::Duration;

use thiserror::Error;

use crate::audio::{AudioError, Channel, PrimaryOutput};
use crate::config::{MAX_FADE_SECONDS, MIN_FADE_SECONDS, SelectionResetSetting};
use crate::library::{MAX_TRACKS, Track};

use super::backing::BackingChannels;
use super::clock::{Clock, SystemClock};
use super::timeline::TrackTimeline;
use super::view::{PlaybackState, ProgressView, TrackRowView};

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("no rhythm tracks found")]
    NoTracks,
    #[error("failed to load {track}: {source}")]
    Load {
        track: String,
        #[source]
        source: AudioError,
    },
    #[error("playback error: {source}")]
    Playback {
        #[source]
        source: AudioError,
    },
}

/// What happens to track timelines when a track is picked by hand.
///
/// Natural advancement only ever resets the track that ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SelectionReset {
    /// Every track's progress is cleared.
    #[default]
    AllTracks,
    /// Only the track being left is cleared.
    DepartingTrack,
    /// The track being left keeps its position; selecting it again resumes there.
    Preserve,
}

impl From<SelectionResetSetting> for SelectionReset {
    fn from(s: SelectionResetSetting) -> Self {
        match s {
            SelectionResetSetting::AllTracks => Self::AllTracks,
            SelectionResetSetting::DepartingTrack => Self::DepartingTrack,
            SelectionResetSetting::Preserve => Self::Preserve,
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct SessionOptions {
    pub fade_seconds: u64,
    pub selection_reset: SelectionReset,
}

impl Default for SessionOptions {
    fn default() -> Self {
        Self {
            fade_seconds: 3,
            selection_reset: SelectionReset::AllTracks,
        }
    }
}

/// The session controller.
///
/// `playing` is the session's own belief about whether audio should be
/// audible; the engine is only consulted to detect that a track ran dry.
/// Operations never return errors: failures that cannot be masked are
/// queued for `take_reports`, everything else degrades to a no-op.
pub struct Session<E: PrimaryOutput, C: Channel, K: Clock = SystemClock> {
    tracks: Vec<Track>,
    timelines: Vec<TrackTimeline>,
    current: usize,
    playing: bool,
    fade_seconds: u64,
    selection_reset: SelectionReset,
    engine: E,
    backing: BackingChannels<C>,
    clock: K,
    reports: Vec<SessionError>,
}

impl<E: PrimaryOutput, C: Channel, K: Clock> Session<E, C, K> {
    /// Build a session over `tracks` (at most three are kept) and load the
    /// first one, stopped. No tracks is fatal.
    pub fn new(
        mut tracks: Vec<Track>,
        engine: E,
        backing: BackingChannels<C>,
        clock: K,
        options: SessionOptions,
    ) -> Result<Self, SessionError> {
        if tracks.is_empty() {
            return Err(SessionError::NoTracks);
        }
        tracks.truncate(MAX_TRACKS);

        let mut session = Self {
            timelines: vec![TrackTimeline::Idle; tracks.len()],
            tracks,
            current: 0,
            playing: false,
            fade_seconds: options.fade_seconds.clamp(MIN_FADE_SECONDS, MAX_FADE_SECONDS),
            selection_reset: options.selection_reset,
            engine,
            backing,
            clock,
            reports: Vec::new(),
        };
        session.load_current();
        Ok(session)
    }

    pub fn tracks(&self) -> &[Track] {
        &self.tracks
    }

    pub fn current_index(&self) -> usize {
        self.current
    }

    pub fn is_playing(&self) -> bool {
        self.playing
    }

    #[cfg(test)]
    pub(crate) fn timeline(&self, index: usize) -> Option<&TrackTimeline> {
        self.timelines.get(index)
    }

    pub fn fade_seconds(&self) -> u64 {
        self.fade_seconds
    }

    pub fn set_fade_seconds(&mut self, seconds: u64) {
        self.fade_seconds = seconds.clamp(MIN_FADE_SECONDS, MAX_FADE_SECONDS);
    }

    pub fn backing(&self) -> &BackingChannels<C> {
        &self.backing
    }

    /// Backing volumes are bound to the UI; this is that binding's handle.
    pub fn backing_mut(&mut self) -> &mut BackingChannels<C> {
        &mut self.backing
    }

    /// Drain failures surfaced since the last call.
    pub fn take_reports(&mut self) -> Vec<SessionError> {
        std::mem::take(&mut self.reports)
    }

    pub fn playback_state(&self) -> PlaybackState {
        if self.playing {
            PlaybackState::Playing
        } else if self.timelines[self.current].is_paused() {
            PlaybackState::Paused
        } else {
            PlaybackState::Stopped
        }
    }

    fn fade(&self) -> Duration {
        Duration::from_secs(self.fade_seconds)
    }

    /// Make `index` the current track.
    ///
    /// Selecting the current track does nothing at all. Otherwise playing
    /// audio fades out, timelines are reset per the selection policy and the
    /// new track is loaded; it starts with a fade-in if the session was playing.
    pub fn select_track(&mut self, index: usize) {
        if index == self.current || index >= self.tracks.len() {
            return;
        }

        let was_playing = self.playing;
        let now = self.clock.now();
        if was_playing {
            self.fade_out_current();
        }

        match self.selection_reset {
            SelectionReset::AllTracks => self.timelines.iter_mut().for_each(TrackTimeline::reset),
            SelectionReset::DepartingTrack => self.timelines[self.current].reset(),
            SelectionReset::Preserve => self.timelines[self.current].on_pause(now),
        }

        log::debug!("selecting track {index} (was playing: {was_playing})");
        self.current = index;
        self.playing = false;
        if !self.load_current() {
            return;
        }

        let resume_at = self.timelines[index].accumulated();
        if was_playing {
            self.start_at(resume_at);
        } else if !resume_at.is_zero() {
            self.prime_at(resume_at);
        }
    }

    pub fn select_next(&mut self) {
        if self.current + 1 < self.tracks.len() {
            self.select_track(self.current + 1);
        }
    }

    pub fn select_previous(&mut self) {
        if let Some(prev) = self.current.checked_sub(1) {
            self.select_track(prev);
        }
    }

    /// Start, pause or resume the current track depending on its timeline.
    pub fn toggle_play_pause(&mut self) {
        let timeline = self.timelines[self.current];
        if !self.playing && timeline.is_fresh() {
            self.start_at(Duration::ZERO);
        } else if self.playing {
            self.pause();
        } else {
            self.resume();
        }
    }

    /// Seek track `index` to `fraction` of its length, selecting it first if
    /// needed. Unknown lengths make this a no-op; engine failures are
    /// swallowed and the timeline still reports the requested position.
    pub fn seek(&mut self, index: usize, fraction: f64) {
        if index >= self.tracks.len() {
            return;
        }
        let fraction = if fraction.is_nan() {
            0.0
        } else {
            fraction.clamp(0.0, 1.0)
        };

        if index != self.current {
            self.select_track(index);
        }

        let Some(duration) = self.tracks[self.current].duration else {
            return;
        };
        let target = Duration::from_millis((duration.as_millis() as f64 * fraction).round() as u64);
        let now = self.clock.now();

        if self.playing {
            if let Err(e) = self.engine.play(target, Duration::ZERO) {
                log::debug!("seek to {target:?} failed: {e}");
            }
            self.timelines[self.current].seek_to(target, now, true);
        } else {
            self.prime_at(target);
            self.timelines[self.current].seek_to(target, now, false);
        }
    }

    /// Seek the current track by `delta` (a fraction of its length).
    pub fn seek_relative(&mut self, delta: f64) {
        let Some(duration) = self.tracks[self.current].duration else {
            return;
        };
        let elapsed = self.timelines[self.current].current_elapsed(self.clock.now());
        let fraction = elapsed.as_secs_f64() / duration.as_secs_f64() + delta;
        self.seek(self.current, fraction);
    }

    /// One poll of the progress/completion check.
    ///
    /// Playing while the engine has gone quiet means the track ended on its
    /// own, which triggers advancement.
    pub fn tick(&mut self) -> ProgressView {
        if self.playing && !self.engine.is_producing_audio() {
            self.on_track_end();
        }
        self.view()
    }

    /// Natural end of the current track: advance with a crossfade, or stop
    /// after the last one.
    ///
    /// The next track always starts from the top with a zero timeline, even if
    /// a preserved position was saved for it; the end of the sequence clears
    /// every timeline.
    pub fn on_track_end(&mut self) {
        self.fade_out_current();
        self.timelines[self.current].reset();

        if self.current + 1 < self.tracks.len() {
            self.current += 1;
            log::info!("advancing to {}", self.tracks[self.current].name);
            self.timelines[self.current].reset();
            self.playing = false;
            if self.load_current() {
                self.start_at(Duration::ZERO);
            }
        } else {
            log::info!("session finished");
            self.timelines.iter_mut().for_each(TrackTimeline::reset);
            self.playing = false;
        }
    }

    /// Fade everything out, e.g. before quitting.
    pub fn shutdown(&mut self, fade: Duration) {
        self.engine.fade_out(fade);
        self.backing.fade_out_all(fade);
        self.playing = false;
    }

    pub fn view(&self) -> ProgressView {
        let now = self.clock.now();
        let rows = self
            .tracks
            .iter()
            .zip(&self.timelines)
            .enumerate()
            .map(|(i, (track, timeline))| TrackRowView {
                name: track.name.clone(),
                selected: i == self.current,
                elapsed: timeline.current_elapsed(now),
                total: track.duration,
            })
            .collect();

        ProgressView {
            current_index: self.current,
            state: self.playback_state(),
            rows,
        }
    }

    fn fade_out_current(&mut self) {
        let fade = self.fade();
        self.engine.fade_out(fade);
        self.backing.fade_out(self.current, fade);
    }

    fn load_current(&mut self) -> bool {
        let track = &self.tracks[self.current];
        match self.engine.load(&track.path) {
            Ok(()) => true,
            Err(source) => {
                log::error!("failed to load {}: {source}", track.path.display());
                let track = track.name.clone();
                self.report(SessionError::Load { track, source });
                self.playing = false;
                false
            }
        }
    }

    /// Fade the current track and its backing loop in from `start`.
    fn start_at(&mut self, start: Duration) {
        let fade = self.fade();
        if let Err(source) = self.engine.play(start, fade) {
            log::error!("failed to start {}: {source}", self.tracks[self.current].name);
            self.report(SessionError::Playback { source });
            self.playing = false;
            return;
        }
        self.backing.play_looped(self.current, fade);
        self.timelines[self.current].on_play_started(self.clock.now());
        self.playing = true;
    }

    /// Position the engine at `start` without making a sound.
    fn prime_at(&mut self, start: Duration) {
        match self.engine.play(start, Duration::ZERO) {
            Ok(()) => self.engine.pause(),
            Err(e) => log::debug!("priming at {start:?} failed: {e}"),
        }
    }

    fn pause(&mut self) {
        self.engine.pause();
        self.backing.pause(self.current);
        self.timelines[self.current].on_pause(self.clock.now());
        self.playing = false;
    }

    fn resume(&mut self) {
        self.engine.resume();
        if !self.engine.is_producing_audio() {
            // Nothing was primed (a swallowed seek failure); play from where the timeline is.
            let position = self.timelines[self.current].accumulated();
            if let Err(source) = self.engine.play(position, Duration::ZERO) {
                log::error!("failed to resume {}: {source}", self.tracks[self.current].name);
                self.report(SessionError::Playback { source });
                return;
            }
        }
        self.backing.resume(self.current);
        self.timelines[self.current].on_unpause(self.clock.now());
        self.playing = true;
    }

    fn report(&mut self, error: SessionError) {
        self.reports.push(error);
    }
}
