mod loader;

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::log::LogConfig;
use crate::process::WaitPolicy;
use crate::reconcile::{ReconcilePacing, RetryPolicy};

pub use loader::{
    config_dir, config_path, load, load_from, log_dir, render_default, try_load_from,
    write_default,
};

/// Top-level configuration for DeskMate.
///
/// Loaded from `~/.config/deskmate/config.toml`. Missing sections
/// fall back to defaults thanks to `#[serde(default)]`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// The application being launched and supervised.
    pub target: TargetConfig,
    /// Window selection and desktop reparenting.
    pub window: WindowConfig,
    /// Polling intervals, timeouts and pauses.
    pub timing: TimingConfig,
    /// Tray icon appearance.
    pub tray: TrayConfig,
    /// File logging.
    pub log: LogConfig,
}

/// Identity of the supervised application.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TargetConfig {
    /// Steam application id.
    pub app_id: String,
    /// Process image name, matched case-insensitively.
    pub executable: String,
    /// Overrides the `steam://run/{app_id}` launch URI.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub launch_uri: Option<String>,
}

/// Window selection settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WindowConfig {
    /// Class name substring that identifies the engine's main window
    /// when the process owns several.
    pub engine_class_marker: String,
    /// Desktop background container classes, tried in order.
    pub desktop_classes: Vec<String>,
}

/// Timings, all in milliseconds.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TimingConfig {
    /// How long to wait for the process to appear after launch.
    pub wait_timeout_ms: u64,
    /// Pause between process table scans while waiting.
    pub process_poll_ms: u64,
    /// Pause after the process first appears.
    pub settle_ms: u64,
    /// Interval of the liveness monitor.
    pub liveness_ms: u64,
    /// Locate + reconcile attempts.
    pub reconcile_attempts: u32,
    /// Pause between failed attempts.
    pub retry_backoff_ms: u64,
    /// Grace period between the close request and force kill on exit.
    pub exit_grace_ms: u64,
    /// Grace period between the close request and force kill on restart.
    pub restart_grace_ms: u64,
    /// Pause after force killing on restart.
    pub post_kill_ms: u64,
    pub restore_pause_ms: u64,
    pub show_pause_ms: u64,
    pub style_pause_ms: u64,
}

/// Tray icon settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TrayConfig {
    /// Tooltip shown on hover.
    pub title: String,
    /// Icon file, relative to the executable's directory.
    pub icon: String,
}

impl Default for TargetConfig {
    fn default() -> Self {
        Self {
            app_id: "3301060".into(),
            executable: "DesktopMate.exe".into(),
            launch_uri: None,
        }
    }
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            engine_class_marker: "Unity".into(),
            desktop_classes: default_desktop_classes(),
        }
    }
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self {
            wait_timeout_ms: 60_000,
            process_poll_ms: 500,
            settle_ms: 3_000,
            liveness_ms: 2_000,
            reconcile_attempts: 3,
            retry_backoff_ms: 2_000,
            exit_grace_ms: 3_000,
            restart_grace_ms: 2_000,
            post_kill_ms: 1_000,
            restore_pause_ms: 300,
            show_pause_ms: 100,
            style_pause_ms: 200,
        }
    }
}

impl Default for TrayConfig {
    fn default() -> Self {
        Self {
            title: "DesktopMate Controller".into(),
            icon: "deskmate.ico".into(),
        }
    }
}

fn default_desktop_classes() -> Vec<String> {
    vec!["Progman".into(), "WorkerW".into()]
}

impl TargetConfig {
    /// Returns the store-protocol URI used to launch the target.
    pub fn launch_uri(&self) -> String {
        match &self.launch_uri {
            Some(uri) => uri.clone(),
            None => format!("steam://run/{}", self.app_id),
        }
    }
}

impl TimingConfig {
    pub fn wait_policy(&self) -> WaitPolicy {
        WaitPolicy {
            timeout: ms(self.wait_timeout_ms),
            poll: ms(self.process_poll_ms),
            settle: ms(self.settle_ms),
        }
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy {
            attempts: self.reconcile_attempts,
            backoff: ms(self.retry_backoff_ms),
        }
    }

    pub fn pacing(&self) -> ReconcilePacing {
        ReconcilePacing {
            restore: ms(self.restore_pause_ms),
            show: ms(self.show_pause_ms),
            style: ms(self.style_pause_ms),
        }
    }

    pub fn liveness(&self) -> Duration {
        ms(self.liveness_ms)
    }

    pub fn exit_grace(&self) -> Duration {
        ms(self.exit_grace_ms)
    }

    pub fn restart_grace(&self) -> Duration {
        ms(self.restart_grace_ms)
    }

    pub fn post_kill(&self) -> Duration {
        ms(self.post_kill_ms)
    }
}

fn ms(value: u64) -> Duration {
    Duration::from_millis(value)
}

impl Config {
    /// Clamps values to safe ranges and restores required defaults.
    ///
    /// Prevents busy-looping polls, unbounded waits and empty names that
    /// would match nothing.
    pub fn validate(&mut self) {
        let defaults = Self::default();

        if self.target.executable.trim().is_empty() {
            self.target.executable = defaults.target.executable;
        }
        if self.target.app_id.trim().is_empty() {
            self.target.app_id = defaults.target.app_id;
        }
        self.window.desktop_classes.retain(|c| !c.trim().is_empty());
        if self.window.desktop_classes.is_empty() {
            self.window.desktop_classes = default_desktop_classes();
        }

        let t = &mut self.timing;
        t.wait_timeout_ms = t.wait_timeout_ms.clamp(1_000, 600_000);
        t.process_poll_ms = t.process_poll_ms.clamp(50, 10_000);
        t.liveness_ms = t.liveness_ms.clamp(100, 60_000);
        t.reconcile_attempts = t.reconcile_attempts.clamp(1, 10);
        t.settle_ms = t.settle_ms.min(60_000);
        t.retry_backoff_ms = t.retry_backoff_ms.min(60_000);
        t.exit_grace_ms = t.exit_grace_ms.min(60_000);
        t.restart_grace_ms = t.restart_grace_ms.min(60_000);
        t.post_kill_ms = t.post_kill_ms.min(60_000);
        t.restore_pause_ms = t.restore_pause_ms.min(5_000);
        t.show_pause_ms = t.show_pause_ms.min(5_000);
        t.style_pause_ms = t.style_pause_ms.min(5_000);

        self.log.max_file_mb = self.log.max_file_mb.min(1_024);
    }
}
