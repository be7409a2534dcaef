use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use tracing::warn;

use super::Config;

/// Returns the config directory: `~/.config/deskmate/`.
pub fn config_dir() -> Option<PathBuf> {
    dirs::home_dir().map(|h| h.join(".config").join("deskmate"))
}

/// Returns the config file path: `~/.config/deskmate/config.toml`.
pub fn config_path() -> Option<PathBuf> {
    config_dir().map(|d| d.join("config.toml"))
}

/// Returns the log directory: `~/.config/deskmate/logs/`.
pub fn log_dir() -> Option<PathBuf> {
    config_dir().map(|d| d.join("logs"))
}

/// Tries to load and parse a config file.
///
/// Returns `Ok(None)` if the file does not exist, or an error string
/// describing what went wrong (IO error, parse error, etc.).
pub fn try_load_from(path: &Path) -> Result<Option<Config>, String> {
    let content = match std::fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
        Err(e) => return Err(format!("{}: {e}", path.display())),
    };
    let mut config: Config =
        toml::from_str(&content).map_err(|e| format!("{}: {e}", path.display()))?;
    config.validate();
    Ok(Some(config))
}

/// Loads a config file, falling back to defaults.
///
/// Missing files silently return defaults; unreadable or invalid files
/// are reported as a warning.
pub fn load_from(path: &Path) -> Config {
    match try_load_from(path) {
        Ok(Some(config)) => config,
        Ok(None) => Config::default(),
        Err(e) => {
            warn!("Ignoring config: {e}");
            Config::default()
        }
    }
}

/// Loads `~/.config/deskmate/config.toml`, falling back to defaults.
pub fn load() -> Config {
    match config_path() {
        Some(path) => load_from(&path),
        None => Config::default(),
    }
}

/// Renders the default configuration as TOML.
pub fn render_default() -> Result<String, String> {
    toml::to_string_pretty(&Config::default()).map_err(|e| e.to_string())
}

/// Writes the default configuration to `path`, creating parent
/// directories as needed.
pub fn write_default(path: &Path) -> Result<(), String> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(|e| format!("{}: {e}", parent.display()))?;
    }
    let content = render_default()?;
    std::fs::write(path, content).map_err(|e| format!("{}: {e}", path.display()))
}
