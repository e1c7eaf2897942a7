use std::{env, path::PathBuf};

use super::schema::{MAX_FADE_SECONDS, MAX_FADE_STEPS, MIN_FADE_SECONDS, Settings};

/// Configuration loading helpers.
///
/// `Settings::load` tries environment variables first (prefix `BREATHSYNC__`), then an
/// optional config file and falls back to struct defaults.
impl Settings {
    /// Load settings from environment and optional config file.
    pub fn load() -> Result<Self, ::config::ConfigError> {
        let config_path = resolve_config_path();

        let mut builder = ::config::Config::builder();

        if let Some(path) = &config_path {
            builder = builder.add_source(::config::File::from(path.as_path()).required(false));
        }

        builder = builder.add_source(
            ::config::Environment::with_prefix("BREATHSYNC")
                .separator("__")
                .try_parsing(true),
        );

        let cfg = builder.build()?;
        let settings: Settings = cfg.try_deserialize()?;
        Ok(settings)
    }

    /// Perform basic validation checks on loaded settings.
    pub fn validate(&self) -> Result<(), String> {
        if !(MIN_FADE_SECONDS..=MAX_FADE_SECONDS).contains(&self.audio.fade_seconds) {
            return Err(format!(
                "audio.fade_seconds must be within {MIN_FADE_SECONDS}..={MAX_FADE_SECONDS}"
            ));
        }
        if !(1..=MAX_FADE_STEPS).contains(&self.audio.fade_steps) {
            return Err(format!("audio.fade_steps must be within 1..={MAX_FADE_STEPS}"));
        }
        if !(50..=1000).contains(&self.session.poll_interval_ms) {
            return Err("session.poll_interval_ms must be within 50..=1000".to_string());
        }
        if !(0.0..=1.0).contains(&self.backing.default_volume) {
            return Err("backing.default_volume must be within 0.0..=1.0".to_string());
        }
        if !(self.backing.volume_step > 0.0 && self.backing.volume_step <= 1.0) {
            return Err("backing.volume_step must be within (0.0, 1.0]".to_string());
        }
        if self.controls.seek_step_percent == 0 || self.controls.seek_step_percent > 100 {
            return Err("controls.seek_step_percent must be within 1..=100".to_string());
        }
        Ok(())
    }
}

/// Resolve the config path from `BREATHSYNC_CONFIG_PATH` or XDG defaults.
pub fn resolve_config_path() -> Option<PathBuf> {
    if let Some(p) = env::var_os("BREATHSYNC_CONFIG_PATH") {
        return Some(PathBuf::from(p));
    }
    default_config_path()
}

/// Compute the default config path under `$XDG_CONFIG_HOME/breathsync/config.toml`
/// or `~/.config/breathsync/config.toml` when `XDG_CONFIG_HOME` is not set.
pub fn default_config_path() -> Option<PathBuf> {
    let config_home = if let Some(xdg) = env::var_os("XDG_CONFIG_HOME") {
        Some(PathBuf::from(xdg))
    } else {
        env::var_os("HOME").map(|home| PathBuf::from(home).join(".config"))
    };

    config_home.map(|d| d.join("breathsync").join("config.toml"))
}
