use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::time::{Duration, Instant};

/// Fixed-cadence scheduler for the progress tick.
///
/// The runtime loop asks how long it may block (`time_until_due`) and then
/// calls `poll`. The next deadline is armed before the tick body runs, so a
/// body that panics still leaves monitoring scheduled.
#[derive(Debug, Clone)]
pub struct Poller {
    interval: Duration,
    next_due: Instant,
}

impl Poller {
    pub fn new(interval: Duration, now: Instant) -> Self {
        let interval = interval.max(Duration::from_millis(1));
        Self {
            interval,
            next_due: now + interval,
        }
    }

    pub fn is_due(&self, now: Instant) -> bool {
        now >= self.next_due
    }

    pub fn time_until_due(&self, now: Instant) -> Duration {
        self.next_due.saturating_duration_since(now)
    }

    /// Run `tick` if the deadline has passed. Returns its output, or `None`
    /// when not due or when the body panicked.
    pub fn poll<T>(&mut self, now: Instant, tick: impl FnOnce() -> T) -> Option<T> {
        if !self.is_due(now) {
            return None;
        }
        self.rearm(now);

        match panic::catch_unwind(AssertUnwindSafe(tick)) {
            Ok(out) => Some(out),
            Err(payload) => {
                log::error!("progress tick panicked: {}", panic_message(payload.as_ref()));
                None
            }
        }
    }

    fn rearm(&mut self, now: Instant) {
        self.next_due += self.interval;
        // Fell behind (slow operation or suspended process): skip missed ticks.
        if self.next_due <= now {
            self.next_due = now + self.interval;
        }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> &str {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.as_str()
    } else {
        "unknown panic"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MS: Duration = Duration::from_millis(1);

    #[test]
    fn not_due_before_interval() {
        let base = Instant::now();
        let mut p = Poller::new(150 * MS, base);

        assert!(!p.is_due(base + 149 * MS));
        assert_eq!(p.time_until_due(base + 100 * MS), 50 * MS);
        assert_eq!(p.poll(base + 149 * MS, || 1), None);
    }

    #[test]
    fn keeps_fixed_cadence() {
        let base = Instant::now();
        let mut p = Poller::new(150 * MS, base);

        // A tick served late does not push the schedule back.
        assert_eq!(p.poll(base + 170 * MS, || 1), Some(1));
        assert_eq!(p.time_until_due(base + 170 * MS), 130 * MS);
        assert_eq!(p.poll(base + 300 * MS, || 2), Some(2));
    }

    #[test]
    fn skips_missed_ticks_after_a_stall() {
        let base = Instant::now();
        let mut p = Poller::new(100 * MS, base);

        assert_eq!(p.poll(base + 1_000 * MS, || ()), Some(()));
        assert_eq!(p.time_until_due(base + 1_000 * MS), 100 * MS);
    }

    #[test]
    fn panicking_tick_is_rearmed() {
        let base = Instant::now();
        let mut p = Poller::new(100 * MS, base);

        let out: Option<()> = p.poll(base + 100 * MS, || panic!("boom"));
        assert_eq!(out, None);
        assert!(!p.is_due(base + 150 * MS));
        assert_eq!(p.poll(base + 200 * MS, || 7), Some(7));
    }
}
