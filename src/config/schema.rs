use serde::Deserialize;

/// Top-level application settings loaded from `config.toml`.
///
/// File format: TOML
/// Default path (Linux/XDG): `$XDG_CONFIG_HOME/breathsync/config.toml` or `~/.config/breathsync/config.toml`
///
/// Precedence (highest wins):
/// 1) Environment variables (prefix `BREATHSYNC__`, `__` as nested separator)
/// 2) Config file (if present)
/// 3) Struct defaults
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub audio: AudioSettings,
    pub session: SessionSettings,
    pub library: LibrarySettings,
    pub backing: BackingSettings,
    pub ui: UiSettings,
    pub controls: ControlsSettings,
    pub logging: LoggingSettings,
}

/// Shortest and longest crossfade the session accepts, in whole seconds.
pub const MIN_FADE_SECONDS: u64 = 1;
pub const MAX_FADE_SECONDS: u64 = 9;

/// Upper bound on software fade-out volume steps.
pub const MAX_FADE_STEPS: u64 = 200;

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AudioSettings {
    /// Crossfade duration between rhythm tracks (seconds, 1..=9).
    pub fade_seconds: u64,
    /// Number of volume steps used for software fade-outs.
    pub fade_steps: u64,
    /// Fade-out duration when quitting (milliseconds).
    /// Set to 0 to stop immediately.
    pub quit_fade_out_ms: u64,
}

impl Default for AudioSettings {
    fn default() -> Self {
        Self {
            fade_seconds: 3,
            fade_steps: 20,
            quit_fade_out_ms: 500,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SessionSettings {
    /// Interval of the progress/completion tick (milliseconds).
    pub poll_interval_ms: u64,
    /// What happens to track timelines when a track is picked by hand.
    pub selection_reset: SelectionResetSetting,
}

impl Default for SessionSettings {
    fn default() -> Self {
        Self {
            poll_interval_ms: 150,
            selection_reset: SelectionResetSetting::AllTracks,
        }
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SelectionResetSetting {
    #[serde(alias = "all", alias = "all_tracks")]
    AllTracks,
    #[serde(alias = "departing", alias = "departing_track")]
    DepartingTrack,
    #[serde(alias = "keep")]
    Preserve,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LibrarySettings {
    /// Directory holding the rhythm tracks, relative paths resolve against the working dir.
    pub rhythms_dir: String,
    /// Directory holding the looping backing tracks.
    pub backing_dir: String,
    /// File extensions to treat as audio (case-insensitive, without dot).
    pub extensions: Vec<String>,
    /// Whether to include hidden files (dotfiles).
    pub include_hidden: bool,
    /// Create the track directories when they are missing.
    pub create_missing: bool,
}

impl Default for LibrarySettings {
    fn default() -> Self {
        Self {
            rhythms_dir: "rhythms".to_string(),
            backing_dir: "backing".to_string(),
            extensions: vec!["mp3".into()],
            include_hidden: false,
            create_missing: true,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct BackingSettings {
    /// Volume every backing slot starts at (0.0..=1.0).
    pub default_volume: f32,
    /// Volume change per key press.
    pub volume_step: f32,
}

impl Default for BackingSettings {
    fn default() -> Self {
        Self {
            default_volume: 0.5,
            volume_step: 0.05,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct UiSettings {
    /// The text rendered inside the top header box.
    pub header_text: String,

    /// Which time fields to show on each rhythm row, and in what order.
    ///
    /// Example: ["elapsed", "total", "remaining"]
    pub time_fields: Vec<TimeField>,

    /// Separator used to join `time_fields`.
    pub time_separator: String,
}

impl Default for UiSettings {
    fn default() -> Self {
        Self {
            header_text: "BreathSync • Rhythms".to_string(),
            time_fields: vec![TimeField::Elapsed, TimeField::Total],
            time_separator: " / ".to_string(),
        }
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TimeField {
    Elapsed,
    Total,
    Remaining,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ControlsSettings {
    /// Percentage of the track to seek when pressing `h` / `l`.
    pub seek_step_percent: u64,
}

impl Default for ControlsSettings {
    fn default() -> Self {
        Self {
            seek_step_percent: 5,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingSettings {
    /// Filter used when `RUST_LOG` is not set (e.g. "info", "breathsync=debug").
    pub level: String,
    /// Optional log file. The terminal belongs to the UI, so logs go here.
    pub file: Option<String>,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: "warn".to_string(),
            file: None,
        }
    }
}
