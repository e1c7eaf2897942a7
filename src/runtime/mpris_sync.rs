use std::time::Duration;

use crate::mpris::MprisHandle;
use crate::session::{ProgressView, TrackRowView};

/// Publish the current track, its position and the playback state.
pub fn update_mpris(mpris: &MprisHandle, view: &ProgressView) {
    mpris.publish(view);
}

/// `elapsed` moved by `offset_micros`, floored at zero.
pub fn offset_target(elapsed: Duration, offset_micros: i64) -> Duration {
    let delta = Duration::from_micros(offset_micros.unsigned_abs());
    if offset_micros < 0 {
        elapsed.saturating_sub(delta)
    } else {
        elapsed.saturating_add(delta)
    }
}

/// Where `target` falls within `row` as a seek fraction. `None` when the
/// length is unknown.
pub fn fraction_at(row: &TrackRowView, target: Duration) -> Option<f64> {
    let total = row.total.filter(|t| !t.is_zero())?;
    Some(target.as_secs_f64() / total.as_secs_f64())
}
