//! Audio output: the narrow command contracts the session drives, and the
//! `rodio`-backed implementations used by the application.
//!
//! `PrimaryOutput` plays one rhythm track at a time; each `Channel` loops one
//! backing sound at its own volume. Fades run on the mixer side and never
//! block the caller.

mod engine;
mod sink;
mod types;

pub use engine::*;
pub use types::*;
