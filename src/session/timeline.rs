use std::time::{Duration, Instant};

/// Elapsed play time of one track, measured against the wall clock.
///
/// Time accrued by earlier run segments is folded into `accumulated`; only
/// the segment in progress is measured from `started_at`. Pausing, resuming
/// and seeking therefore never drift, whatever the engine's own clock says.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TrackTimeline {
    #[default]
    Idle,
    Running {
        started_at: Instant,
        accumulated: Duration,
    },
    Paused {
        accumulated: Duration,
    },
}

impl TrackTimeline {
    pub fn reset(&mut self) {
        *self = Self::Idle;
    }

    /// Audio started producing sound from some offset.
    ///
    /// Keeps time accumulated so far; a segment already in progress is
    /// discarded since playback restarted from a new position.
    pub fn on_play_started(&mut self, now: Instant) {
        *self = Self::Running {
            started_at: now,
            accumulated: self.accumulated(),
        };
    }

    pub fn on_pause(&mut self, now: Instant) {
        if let Self::Running {
            started_at,
            accumulated,
        } = *self
        {
            *self = Self::Paused {
                accumulated: accumulated + now.saturating_duration_since(started_at),
            };
        }
    }

    pub fn on_unpause(&mut self, now: Instant) {
        if let Self::Paused { accumulated } = *self {
            *self = Self::Running {
                started_at: now,
                accumulated,
            };
        }
    }

    /// Jump to `position`, running from `now` or frozen there.
    pub fn seek_to(&mut self, position: Duration, now: Instant, running: bool) {
        *self = if running {
            Self::Running {
                started_at: now,
                accumulated: position,
            }
        } else {
            Self::Paused {
                accumulated: position,
            }
        };
    }

    pub fn current_elapsed(&self, now: Instant) -> Duration {
        match *self {
            Self::Idle => Duration::ZERO,
            Self::Running {
                started_at,
                accumulated,
            } => accumulated + now.saturating_duration_since(started_at),
            Self::Paused { accumulated } => accumulated,
        }
    }

    #[cfg(test)]
    pub(crate) fn current_elapsed_ms(&self, now: Instant) -> u64 {
        self.current_elapsed(now).as_millis() as u64
    }

    /// Time accrued before the current run segment.
    pub fn accumulated(&self) -> Duration {
        match *self {
            Self::Idle => Duration::ZERO,
            Self::Running { accumulated, .. } | Self::Paused { accumulated } => accumulated,
        }
    }

    pub fn is_running(&self) -> bool {
        matches!(self, Self::Running { .. })
    }

    pub fn is_paused(&self) -> bool {
        matches!(self, Self::Paused { .. })
    }

    /// Not running and nothing accrued: the next play starts from the top.
    pub fn is_fresh(&self) -> bool {
        !self.is_running() && self.accumulated().is_zero()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(base: Instant, ms: u64) -> Instant {
        base + Duration::from_millis(ms)
    }

    #[test]
    fn idle_timeline_reports_zero_and_is_fresh() {
        let t = TrackTimeline::default();
        assert_eq!(t.current_elapsed_ms(Instant::now()), 0);
        assert!(t.is_fresh());
        assert!(!t.is_paused());
    }

    #[test]
    fn running_elapsed_is_monotonic() {
        let base = Instant::now();
        let mut t = TrackTimeline::Idle;
        t.on_play_started(base);

        let mut last = 0;
        for ms in [0, 10, 250, 251, 4_000] {
            let e = t.current_elapsed_ms(at(base, ms));
            assert!(e >= last);
            assert_eq!(e, ms);
            last = e;
        }
    }

    #[test]
    fn paused_elapsed_is_frozen() {
        let base = Instant::now();
        let mut t = TrackTimeline::Idle;
        t.on_play_started(base);
        t.on_pause(at(base, 1_500));

        assert!(t.is_paused());
        assert_eq!(t.current_elapsed_ms(at(base, 1_500)), 1_500);
        assert_eq!(t.current_elapsed_ms(at(base, 90_000)), 1_500);
    }

    #[test]
    fn pause_then_unpause_loses_no_time() {
        let base = Instant::now();
        let mut t = TrackTimeline::Idle;
        t.on_play_started(base);

        let now = at(base, 700);
        let before = t.current_elapsed_ms(now);
        t.on_pause(now);
        t.on_unpause(now);
        assert_eq!(t.current_elapsed_ms(now), before);
        assert!(t.is_running());
    }

    #[test]
    fn pause_and_unpause_are_guarded_by_state() {
        let base = Instant::now();
        let mut t = TrackTimeline::Idle;
        t.on_pause(base);
        assert_eq!(t, TrackTimeline::Idle);
        t.on_unpause(base);
        assert_eq!(t, TrackTimeline::Idle);

        t.on_play_started(base);
        t.on_pause(at(base, 100));
        t.on_pause(at(base, 900));
        assert_eq!(t.current_elapsed_ms(at(base, 900)), 100);

        t.on_unpause(at(base, 1_000));
        t.on_unpause(at(base, 5_000));
        assert_eq!(t.current_elapsed_ms(at(base, 5_000)), 4_100);
    }

    #[test]
    fn reset_always_returns_to_zero() {
        let base = Instant::now();
        for mut t in [
            TrackTimeline::Idle,
            TrackTimeline::Running {
                started_at: base,
                accumulated: Duration::from_secs(3),
            },
            TrackTimeline::Paused {
                accumulated: Duration::from_secs(9),
            },
        ] {
            t.reset();
            assert_eq!(t.current_elapsed_ms(at(base, 10_000)), 0);
            assert!(!t.is_paused());
            assert!(t.is_fresh());
        }
    }

    #[test]
    fn only_paused_intervals_are_excluded() {
        let base = Instant::now();
        let mut t = TrackTimeline::Idle;
        t.on_play_started(at(base, 0));
        t.on_pause(at(base, 2_000));
        t.on_unpause(at(base, 7_000));
        t.on_pause(at(base, 8_500));

        assert_eq!(t.current_elapsed_ms(at(base, 60_000)), 3_500);
    }

    #[test]
    fn seek_sets_position_running_or_frozen() {
        let base = Instant::now();
        let mut t = TrackTimeline::Idle;

        t.seek_to(Duration::from_secs(5), base, true);
        assert_eq!(t.current_elapsed_ms(at(base, 250)), 5_250);

        t.seek_to(Duration::from_secs(2), at(base, 250), false);
        assert!(t.is_paused());
        assert!(!t.is_fresh());
        assert_eq!(t.current_elapsed_ms(at(base, 9_000)), 2_000);

        t.seek_to(Duration::ZERO, base, false);
        assert!(t.is_fresh());
    }

    #[test]
    fn play_started_keeps_accumulated_time() {
        let base = Instant::now();
        let mut t = TrackTimeline::Paused {
            accumulated: Duration::from_secs(4),
        };
        t.on_play_started(base);
        assert_eq!(t.current_elapsed_ms(at(base, 1_000)), 5_000);
    }
}
