use std::path::PathBuf;

use anyhow::Result;
use deskmate_core::{Config, config, log};
use tracing::warn;

/// Loads the config, installs logging, then supervises DesktopMate until
/// the tray loop ends.
///
/// Every supervision outcome exits with status 0. On restart a fresh
/// detached controller is started before this one returns.
pub fn execute() -> Result<()> {
    let (config, problem) = load_config();
    let log_file = log::init(&config.log);
    if let Some(problem) = problem {
        warn!("Ignoring config: {problem}");
    }

    supervise(config, log_file)
}

/// Reads the config file without logging, so a problem can be reported
/// once the subscriber is installed.
fn load_config() -> (Config, Option<String>) {
    let Some(path) = config::config_path() else {
        return (Config::default(), None);
    };
    match config::try_load_from(&path) {
        Ok(config) => (config.unwrap_or_default(), None),
        Err(e) => (Config::default(), Some(e)),
    }
}

#[cfg(windows)]
fn supervise(config: Config, log_file: Option<PathBuf>) -> Result<()> {
    use std::sync::Arc;

    use anyhow::Context;
    use deskmate_core::{
        OpenLauncher, Platform, Shutdown, Supervisor, SystemClock, SystemProcesses,
    };
    use deskmate_windows::{Tray, Win32Windows, relaunch};
    use tracing::info;

    let platform = Platform {
        processes: Arc::new(SystemProcesses::new()),
        windows: Arc::new(Win32Windows::new()),
        launcher: Arc::new(OpenLauncher),
        clock: Arc::new(SystemClock),
    };
    let tray_config = config.tray.clone();
    let supervisor = Supervisor::new(config, platform).with_log_file(log_file);

    // The icon is built on this thread, which then runs its message pump.
    let shutdown = supervisor
        .run(|| Tray::new(&tray_config))
        .context("failed to create tray icon")?;
    match shutdown {
        Shutdown::Restart => {
            relaunch::spawn_self().context("failed to start a new controller")?;
        }
        Shutdown::Exit | Shutdown::TargetExited => {}
    }

    info!("Controller exiting");
    Ok(())
}

#[cfg(not(windows))]
fn supervise(_config: Config, _log_file: Option<PathBuf>) -> Result<()> {
    Err(deskmate_core::OsError::Unsupported.into())
}
