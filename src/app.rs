//! Application module: exposes the UI model used by the TUI and runtime.
//!
//! The `App` model lives in `app::model` and holds focus, cursors and the
//! status message. Key presses are decoded into `Action`s here and applied
//! to the session by the runtime.

mod model;

pub use model::*;
