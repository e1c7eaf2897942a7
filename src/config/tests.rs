use super::load::{default_config_path, resolve_config_path};
use super::schema::*;
use std::sync::{Mutex, OnceLock};

static ENV_LOCK: OnceLock<Mutex<()>> = OnceLock::new();

fn env_lock() -> std::sync::MutexGuard<'static, ()> {
    ENV_LOCK
        .get_or_init(|| Mutex::new(()))
        .lock()
        .unwrap_or_else(|poisoned| poisoned.into_inner())
}

struct EnvGuard {
    key: &'static str,
    old: Option<std::ffi::OsString>,
}

impl EnvGuard {
    fn set(key: &'static str, val: &str) -> Self {
        let old = std::env::var_os(key);
        unsafe {
            std::env::set_var(key, val);
        }
        Self { key, old }
    }

    fn remove(key: &'static str) -> Self {
        let old = std::env::var_os(key);
        unsafe {
            std::env::remove_var(key);
        }
        Self { key, old }
    }
}

impl Drop for EnvGuard {
    fn drop(&mut self) {
        match self.old.take() {
            Some(v) => unsafe {
                std::env::set_var(self.key, v);
            },
            None => unsafe {
                std::env::remove_var(self.key);
            },
        }
    }
}

#[test]
fn resolve_config_path_prefers_explicit_env_path() {
    let _lock = env_lock();
    let _g1 = EnvGuard::set("BREATHSYNC_CONFIG_PATH", "/tmp/breathsync-test-config.toml");
    assert_eq!(
        resolve_config_path().unwrap(),
        std::path::PathBuf::from("/tmp/breathsync-test-config.toml")
    );
}

#[test]
fn default_config_path_prefers_xdg_config_home() {
    let _lock = env_lock();
    let _g1 = EnvGuard::set("XDG_CONFIG_HOME", "/tmp/xdg-config-home");
    let _g2 = EnvGuard::set("HOME", "/tmp/home-should-not-win");

    let p = default_config_path().unwrap();
    assert_eq!(
        p,
        std::path::PathBuf::from("/tmp/xdg-config-home")
            .join("breathsync")
            .join("config.toml")
    );
}

#[test]
fn default_config_path_falls_back_to_home_dot_config() {
    let _lock = env_lock();
    let _g1 = EnvGuard::remove("XDG_CONFIG_HOME");
    let _g2 = EnvGuard::set("HOME", "/tmp/home-dir");

    let p = default_config_path().unwrap();
    assert_eq!(
        p,
        std::path::PathBuf::from("/tmp/home-dir")
            .join(".config")
            .join("breathsync")
            .join("config.toml")
    );
}

#[test]
fn defaults_pass_validation() {
    let s = Settings::default();
    assert!(s.validate().is_ok());
    assert_eq!(s.audio.fade_seconds, 3);
    assert_eq!(s.session.poll_interval_ms, 150);
    assert_eq!(s.session.selection_reset, SelectionResetSetting::AllTracks);
    assert_eq!(s.library.rhythms_dir, "rhythms");
    assert_eq!(s.library.backing_dir, "backing");
    assert_eq!(s.backing.default_volume, 0.5);
}

#[test]
fn validate_rejects_out_of_range_values() {
    let mut s = Settings::default();
    s.audio.fade_seconds = 0;
    assert!(s.validate().is_err());

    let mut s = Settings::default();
    s.audio.fade_seconds = 10;
    assert!(s.validate().is_err());

    let mut s = Settings::default();
    s.session.poll_interval_ms = 5;
    assert!(s.validate().is_err());

    let mut s = Settings::default();
    s.backing.default_volume = 1.5;
    assert!(s.validate().is_err());

    let mut s = Settings::default();
    s.controls.seek_step_percent = 0;
    assert!(s.validate().is_err());
}

#[test]
fn validate_bounds_fade_steps() {
    let mut s = Settings::default();
    s.audio.fade_steps = 0;
    assert!(s.validate().is_err());

    s.audio.fade_steps = MAX_FADE_STEPS;
    assert!(s.validate().is_ok());

    s.audio.fade_steps = 1 << 32;
    assert!(s.validate().is_err());
}

#[test]
fn settings_load_from_config_file_and_parse_aliases() {
    let _lock = env_lock();

    let dir = tempfile::tempdir().unwrap();
    let cfg_path = dir.path().join("config.toml");
    std::fs::write(
        &cfg_path,
        r#"
[audio]
fade_seconds = 7
fade_steps = 4
quit_fade_out_ms = 123

[session]
poll_interval_ms = 200
selection_reset = "keep"

[library]
rhythms_dir = "/srv/rhythms"
backing_dir = "/srv/backing"
extensions = ["mp3", "ogg"]
include_hidden = true
create_missing = false

[backing]
default_volume = 0.25
volume_step = 0.1

[ui]
header_text = "hello"
time_fields = ["remaining", "total"]
time_separator = " | "

[controls]
seek_step_percent = 10

[logging]
level = "debug"
file = "/tmp/breathsync.log"
"#,
    )
    .unwrap();

    let _g1 = EnvGuard::set("BREATHSYNC_CONFIG_PATH", cfg_path.to_str().unwrap());
    let _g2 = EnvGuard::remove("BREATHSYNC__AUDIO__FADE_SECONDS");

    let s = Settings::load().unwrap();
    assert_eq!(s.audio.fade_seconds, 7);
    assert_eq!(s.audio.fade_steps, 4);
    assert_eq!(s.audio.quit_fade_out_ms, 123);
    assert_eq!(s.session.poll_interval_ms, 200);
    assert_eq!(s.session.selection_reset, SelectionResetSetting::Preserve);
    assert_eq!(s.library.rhythms_dir, "/srv/rhythms");
    assert_eq!(s.library.backing_dir, "/srv/backing");
    assert_eq!(s.library.extensions, vec!["mp3".to_string(), "ogg".to_string()]);
    assert!(s.library.include_hidden);
    assert!(!s.library.create_missing);
    assert_eq!(s.backing.default_volume, 0.25);
    assert_eq!(s.backing.volume_step, 0.1);
    assert_eq!(s.ui.header_text, "hello");
    assert_eq!(s.ui.time_fields, vec![TimeField::Remaining, TimeField::Total]);
    assert_eq!(s.ui.time_separator, " | ");
    assert_eq!(s.controls.seek_step_percent, 10);
    assert_eq!(s.logging.level, "debug");
    assert_eq!(s.logging.file.as_deref(), Some("/tmp/breathsync.log"));
    assert!(s.validate().is_ok());
}

#[test]
fn settings_env_overrides_config_file() {
    let _lock = env_lock();

    let dir = tempfile::tempdir().unwrap();
    let cfg_path = dir.path().join("config.toml");
    std::fs::write(
        &cfg_path,
        r#"
[audio]
fade_seconds = 3
"#,
    )
    .unwrap();

    let _g1 = EnvGuard::set("BREATHSYNC_CONFIG_PATH", cfg_path.to_str().unwrap());
    let _g2 = EnvGuard::set("BREATHSYNC__AUDIO__FADE_SECONDS", "5");

    let s = Settings::load().unwrap();
    assert_eq!(s.audio.fade_seconds, 5);
}
