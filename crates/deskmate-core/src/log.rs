//! Console and file logging on top of `tracing-subscriber`.
//!
//! Logs go to stderr and, when enabled, are appended to
//! `~/.config/deskmate/logs/deskmate.log`. A log file larger than the
//! configured size is rotated to `deskmate.log.1` at startup (one backup
//! kept).

use std::fs::{self, File, OpenOptions};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use serde::{Deserialize, Serialize};
use tracing::level_filters::LevelFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, fmt};

const LOG_FILE_NAME: &str = "deskmate.log";
const BACKUP_SUFFIX: &str = ".1";

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LogConfig {
    /// Whether file logging is enabled. Defaults to `true`.
    pub enabled: bool,
    /// Minimum log level: "debug", "info", "warn", or "error".
    pub level: String,
    /// Maximum log file size in megabytes before rotation.
    pub max_file_mb: u64,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            level: "info".into(),
            max_file_mb: 10,
        }
    }
}

/// Maps a level name to a filter, defaulting to INFO.
pub fn parse_level(level: &str) -> LevelFilter {
    match level.to_ascii_lowercase().as_str() {
        "trace" => LevelFilter::TRACE,
        "debug" => LevelFilter::DEBUG,
        "warn" => LevelFilter::WARN,
        "error" => LevelFilter::ERROR,
        "off" => LevelFilter::OFF,
        _ => LevelFilter::INFO,
    }
}

/// Installs the global subscriber. Call once at startup.
///
/// `RUST_LOG` overrides the configured level. Returns the path of the
/// log file, or `None` when file logging is disabled or the file could
/// not be opened.
pub fn init(config: &LogConfig) -> Option<PathBuf> {
    let filter = EnvFilter::builder()
        .with_default_directive(parse_level(&config.level).into())
        .from_env_lossy();

    let file = if config.enabled {
        crate::config::log_dir().and_then(|dir| open_log_file(&dir, config.max_file_mb))
    } else {
        None
    };
    let path = file.as_ref().map(|(_, path)| path.clone());
    let file_layer = file.map(|(file, _)| {
        fmt::layer()
            .with_writer(Mutex::new(file))
            .with_ansi(false)
            .with_target(false)
    });

    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(std::io::stderr).with_target(false))
        .with(file_layer)
        .try_init();

    path
}

/// Opens `dir/deskmate.log` for appending, rotating it first if it is
/// over `max_file_mb`.
pub fn open_log_file(dir: &Path, max_file_mb: u64) -> Option<(File, PathBuf)> {
    fs::create_dir_all(dir).ok()?;
    let path = dir.join(LOG_FILE_NAME);
    rotate_if_needed(&path, max_file_mb.saturating_mul(1024 * 1024));

    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&path)
        .ok()?;
    Some((file, path))
}

/// Renames `path` to its `.1` backup when it is at least `max_bytes`.
///
/// A zero limit disables rotation. Returns whether a rotation happened.
pub fn rotate_if_needed(path: &Path, max_bytes: u64) -> bool {
    if max_bytes == 0 {
        return false;
    }
    let size = fs::metadata(path).map(|m| m.len()).unwrap_or(0);
    if size < max_bytes {
        return false;
    }
    let mut backup = path.as_os_str().to_owned();
    backup.push(BACKUP_SUFFIX);
    fs::rename(path, PathBuf::from(backup)).is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_level_accepts_known_names() {
        assert_eq!(parse_level("debug"), LevelFilter::DEBUG);
        assert_eq!(parse_level("WARN"), LevelFilter::WARN);
        assert_eq!(parse_level("error"), LevelFilter::ERROR);
    }

    #[test]
    fn parse_level_defaults_to_info() {
        assert_eq!(parse_level("verbose"), LevelFilter::INFO);
        assert_eq!(parse_level(""), LevelFilter::INFO);
    }

    #[test]
    fn rotate_moves_oversized_file_to_backup() {
        // Arrange
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(LOG_FILE_NAME);
        fs::write(&path, vec![b'x'; 2048]).unwrap();

        // Act
        let rotated = rotate_if_needed(&path, 1024);

        // Assert
        assert!(rotated);
        assert!(!path.exists());
        assert!(dir.path().join("deskmate.log.1").exists());
    }

    #[test]
    fn rotate_keeps_small_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(LOG_FILE_NAME);
        fs::write(&path, b"hello").unwrap();

        assert!(!rotate_if_needed(&path, 1024));
        assert!(!rotate_if_needed(&path, 0));
        assert!(path.exists());
    }

    #[test]
    fn open_log_file_accepts_huge_size_limit() {
        let dir = tempfile::tempdir().unwrap();

        let opened = open_log_file(dir.path(), u64::MAX / 1000);

        assert!(opened.is_some());
    }

    #[test]
    fn open_log_file_creates_directory_and_appends() {
        let dir = tempfile::tempdir().unwrap();
        let logs = dir.path().join("logs");

        let (_, path) = open_log_file(&logs, 10).unwrap();
        fs::write(&path, b"first\n").unwrap();
        let (mut file, again) = open_log_file(&logs, 10).unwrap();
        std::io::Write::write_all(&mut file, b"second\n").unwrap();

        assert_eq!(path, again);
        assert_eq!(fs::read_to_string(&path).unwrap(), "first\nsecond\n");
    }
}
