use std::time::Duration;

use crate::config::TimeField;

pub const UNKNOWN_LENGTH: &str = "Unknown length";

/// The playback state as seen from outside the session.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Default)]
pub enum PlaybackState {
    #[default]
    Stopped,
    Playing,
    Paused,
}

/// Progress of a single rhythm track.
#[derive(Debug, Clone, PartialEq)]
pub struct TrackRowView {
    pub name: String,
    pub selected: bool,
    pub elapsed: Duration,
    pub total: Option<Duration>,
}

impl TrackRowView {
    /// Normalized progress in `0.0..=1.0`, or `None` when the length is unknown.
    pub fn fraction(&self) -> Option<f64> {
        let total = self.total.filter(|t| !t.is_zero())?;
        Some((self.elapsed.as_secs_f64() / total.as_secs_f64()).clamp(0.0, 1.0))
    }

    /// Human-readable time for this row, e.g. `01:05 / 04:00`.
    pub fn time_text(&self, fields: &[TimeField], separator: &str) -> String {
        let Some(total) = self.total else {
            return UNKNOWN_LENGTH.to_string();
        };
        let elapsed = self.elapsed.min(total);

        let parts: Vec<String> = fields
            .iter()
            .map(|f| match f {
                TimeField::Elapsed => format_mmss(elapsed),
                TimeField::Total => format_mmss(total),
                TimeField::Remaining => format!("-{}", format_mmss(total.saturating_sub(elapsed))),
            })
            .collect();

        if parts.is_empty() {
            format_mmss(elapsed)
        } else {
            parts.join(separator)
        }
    }
}

/// Everything a front end needs to render the session, recomputed on demand.
#[derive(Debug, Clone, PartialEq)]
pub struct ProgressView {
    pub current_index: usize,
    pub state: PlaybackState,
    pub rows: Vec<TrackRowView>,
}

impl ProgressView {
    pub fn current(&self) -> &TrackRowView {
        &self.rows[self.current_index]
    }

    pub fn progress_fraction(&self) -> Option<f64> {
        self.current().fraction()
    }

    pub fn selected_indices(&self) -> Vec<usize> {
        self.rows
            .iter()
            .enumerate()
            .filter(|(_, r)| r.selected)
            .map(|(i, _)| i)
            .collect()
    }
}

/// Format a `Duration` as `MM:SS`.
pub fn format_mmss(d: Duration) -> String {
    let secs = d.as_secs();
    format!("{:02}:{:02}", secs / 60, secs % 60)
}
