//! The playback timeline and transition engine.
//!
//! `Session` owns the rhythm tracks, one `TrackTimeline` per track and the
//! backing channels, and drives the audio engine through the contracts in
//! `crate::audio`. The runtime calls `Session::tick` from a `Poller` on a
//! fixed cadence; everything else happens in reaction to user commands.

mod backing;
mod clock;
mod controller;
mod poller;
mod timeline;
mod view;

pub use backing::*;
pub use clock::*;
pub use controller::*;
pub use poller::*;
pub use timeline::*;
pub use view::*;
