use std::env;
use std::fs::OpenOptions;
use std::path::PathBuf;

use crate::config::LoggingSettings;

pub const LOG_FILE_ENV: &str = "BREATHSYNC_LOG_FILE";

/// Where log records go. The TUI owns stdout, so stderr is only used when
/// explicitly asked for through `RUST_LOG`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LogTarget {
    File(PathBuf),
    Stderr,
    Off,
}

pub fn log_target(file_env: Option<String>, settings: &LoggingSettings, rust_log_set: bool) -> LogTarget {
    let file = file_env
        .filter(|s| !s.trim().is_empty())
        .or_else(|| settings.file.clone().filter(|s| !s.trim().is_empty()));
    match file {
        Some(path) => LogTarget::File(PathBuf::from(path)),
        None if rust_log_set => LogTarget::Stderr,
        None => LogTarget::Off,
    }
}

/// Install `env_logger`. The filter is `RUST_LOG` when set, else `logging.level`.
pub fn init(settings: &LoggingSettings) -> std::io::Result<()> {
    let rust_log = env::var("RUST_LOG").ok();
    let target = log_target(env::var(LOG_FILE_ENV).ok(), settings, rust_log.is_some());

    let mut builder = env_logger::Builder::new();
    builder.parse_filters(rust_log.as_deref().unwrap_or(&settings.level));

    match target {
        LogTarget::Off => return Ok(()),
        LogTarget::Stderr => {}
        LogTarget::File(path) => {
            let file = OpenOptions::new().create(true).append(true).open(path)?;
            builder.target(env_logger::Target::Pipe(Box::new(file)));
        }
    }

    // A logger may already be installed (tests); keep the first one.
    let _ = builder.try_init();
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn settings(file: Option<&str>) -> LoggingSettings {
        LoggingSettings {
            level: "warn".to_string(),
            file: file.map(str::to_string),
        }
    }

    #[test]
    fn env_file_wins_over_config_file() {
        let t = log_target(Some("/tmp/env.log".into()), &settings(Some("/tmp/cfg.log")), false);
        assert_eq!(t, LogTarget::File(PathBuf::from("/tmp/env.log")));
    }

    #[test]
    fn config_file_is_used_when_env_is_blank() {
        let t = log_target(Some("  ".into()), &settings(Some("/tmp/cfg.log")), true);
        assert_eq!(t, LogTarget::File(PathBuf::from("/tmp/cfg.log")));
    }

    #[test]
    fn no_file_logs_to_stderr_only_with_rust_log() {
        assert_eq!(log_target(None, &settings(None), true), LogTarget::Stderr);
        assert_eq!(log_target(None, &settings(None), false), LogTarget::Off);
    }
}
