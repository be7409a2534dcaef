//! Launch → wait → locate → reconcile, then supervise from the tray.
//!
//! The tray loop runs on the calling thread. A background liveness
//! monitor polls the process table and stops the tray when the target
//! exits. Restart and exit are tray commands handled on the tray thread.

use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, OnceLock};
use std::thread;

use tracing::{error, info, warn};

use crate::OsResult;
use crate::clock::Clock;
use crate::config::Config;
use crate::launch::Launcher;
use crate::locate::WindowLocator;
use crate::process::{self, ProcessTable};
use crate::reconcile::{self, WindowReconciler};
use crate::window::{WindowHandle, WindowSystem};

/// Actions offered by the tray menu.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrayCommand {
    Restart,
    ViewLogs,
    Exit,
}

/// Why the tray loop ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Shutdown {
    /// The user chose Exit.
    Exit,
    /// The user chose Restart; the caller should start a fresh instance.
    Restart,
    /// The liveness monitor found no target process.
    TargetExited,
}

/// Stops a running tray loop from any thread.
///
/// Implementations must be idempotent: a second `stop` is a no-op.
pub trait TrayControl: Send + Sync {
    fn stop(&self);
}

/// The blocking tray icon event loop.
pub trait TrayLoop {
    /// Returns a handle that can stop this loop from another thread.
    fn control(&self) -> Arc<dyn TrayControl>;

    /// Runs until stopped. Each menu click is passed to `dispatch`; a
    /// `Some` result ends the loop with that outcome. Returns `None` when
    /// stopped through [`TrayControl::stop`].
    fn run(
        &mut self,
        dispatch: &mut dyn FnMut(TrayCommand) -> Option<Shutdown>,
    ) -> Option<Shutdown>;
}

/// OS collaborators the supervisor drives.
#[derive(Clone)]
pub struct Platform {
    pub processes: Arc<dyn ProcessTable>,
    pub windows: Arc<dyn WindowSystem>,
    pub launcher: Arc<dyn Launcher>,
    pub clock: Arc<dyn Clock>,
}

/// State shared between the startup thread, the tray thread and the
/// liveness monitor.
pub struct SupervisionContext {
    running: AtomicBool,
    window: OnceLock<WindowHandle>,
    tray: OnceLock<Arc<dyn TrayControl>>,
}

impl SupervisionContext {
    fn new() -> Self {
        Self {
            running: AtomicBool::new(true),
            window: OnceLock::new(),
            tray: OnceLock::new(),
        }
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    /// Clears the running flag. Returns `true` only for the caller that
    /// actually made the transition, so teardown runs once.
    pub fn stop(&self) -> bool {
        self.running.swap(false, Ordering::SeqCst)
    }

    /// The window selected during startup, if any.
    pub fn window(&self) -> Option<WindowHandle> {
        self.window.get().copied()
    }

    fn set_window(&self, window: WindowHandle) {
        let _ = self.window.set(window);
    }

    fn attach_tray(&self, tray: Arc<dyn TrayControl>) {
        let _ = self.tray.set(tray);
    }

    fn stop_tray(&self) {
        if let Some(tray) = self.tray.get() {
            tray.stop();
        }
    }
}

/// Orchestrates one supervision run.
///
/// Cheap to clone: all state lives behind `Arc`s, so the liveness
/// monitor gets its own handle.
#[derive(Clone)]
pub struct Supervisor {
    config: Arc<Config>,
    platform: Platform,
    ctx: Arc<SupervisionContext>,
    log_file: Option<PathBuf>,
}

impl Supervisor {
    pub fn new(config: Config, platform: Platform) -> Self {
        Self {
            config: Arc::new(config),
            platform,
            ctx: Arc::new(SupervisionContext::new()),
            log_file: None,
        }
    }

    /// Sets the file opened by the "View Logs" action.
    pub fn with_log_file(mut self, path: Option<PathBuf>) -> Self {
        self.log_file = path;
        self
    }

    pub fn context(&self) -> &SupervisionContext {
        &self.ctx
    }

    fn executable(&self) -> &str {
        &self.config.target.executable
    }

    /// Runs startup, then builds the tray with `make_tray` and runs the
    /// liveness monitor and the tray loop.
    ///
    /// Startup failures are logged and supervision continues degraded.
    /// The tray is built on the calling thread once startup is done.
    /// Blocks until the tray loop ends; fails only if the tray cannot be
    /// built.
    pub fn run<T: TrayLoop>(
        &self,
        make_tray: impl FnOnce() -> OsResult<T>,
    ) -> OsResult<Shutdown> {
        info!("Starting DesktopMate Controller");
        if !self.startup() {
            error!("Failed to detect {}", self.executable());
        }

        let mut tray = make_tray()?;
        self.ctx.attach_tray(tray.control());
        self.spawn_monitor();

        info!("Running system tray icon");
        let shutdown = tray
            .run(&mut |command| self.dispatch(command))
            .unwrap_or(Shutdown::TargetExited);
        info!(?shutdown, "Tray loop ended");
        Ok(shutdown)
    }

    /// Launches the target, waits for its process and configures its
    /// window.
    ///
    /// Returns `false` if the process never appeared. A window that could
    /// not be configured is only a warning.
    pub fn startup(&self) -> bool {
        self.launch();

        let p = &self.platform;
        let timing = &self.config.timing;
        if !process::wait_for_process(
            &*p.processes,
            &*p.clock,
            self.executable(),
            &timing.wait_policy(),
        ) {
            return false;
        }

        info!("Searching for {} window...", self.executable());
        let locator = WindowLocator::new(
            &*p.windows,
            &*p.processes,
            &self.config.window.engine_class_marker,
        );
        let reconciler = WindowReconciler::new(
            &*p.windows,
            &*p.clock,
            &self.config.window.desktop_classes,
            timing.pacing(),
        );
        let acquired = reconcile::acquire_window(
            &locator,
            &reconciler,
            &*p.clock,
            &timing.retry_policy(),
            self.executable(),
        );

        if let Some(window) = acquired.window {
            self.ctx.set_window(window);
        }
        if !acquired.configured {
            warn!("Could not fully configure window, but will continue");
        }
        true
    }

    fn launch(&self) {
        let uri = self.config.target.launch_uri();
        info!("Launching {uri}");
        if let Err(e) = self.platform.launcher.launch(&uri) {
            error!("Failed to launch {uri}: {e}");
        }
    }

    /// Starts the liveness monitor on a background thread.
    ///
    /// The thread is never joined; it ends on its own once the running
    /// flag is cleared.
    pub fn spawn_monitor(&self) -> thread::JoinHandle<()> {
        let supervisor = self.clone();
        info!("Process monitoring started");
        thread::spawn(move || supervisor.watch())
    }

    /// Polls for the target process until it is gone or supervision
    /// stops. When the target is gone, clears the running flag and stops
    /// the tray.
    pub fn watch(&self) {
        let p = &self.platform;
        while self.ctx.is_running() {
            if process::find_first(&*p.processes, self.executable()).is_none() {
                info!("{} process ended, exiting controller", self.executable());
                if self.ctx.stop() {
                    self.ctx.stop_tray();
                }
                break;
            }
            p.clock.sleep(self.config.timing.liveness());
        }
    }

    /// Handles one tray menu command on the tray thread.
    pub fn dispatch(&self, command: TrayCommand) -> Option<Shutdown> {
        match command {
            TrayCommand::Restart => {
                self.restart();
                Some(Shutdown::Restart)
            }
            TrayCommand::Exit => {
                self.exit();
                Some(Shutdown::Exit)
            }
            TrayCommand::ViewLogs => {
                self.view_logs();
                None
            }
        }
    }

    /// Closes the target and stops the tray so the caller can start a
    /// fresh instance.
    pub fn restart(&self) {
        info!("Restarting {}", self.executable());
        self.ctx.stop();
        self.close_target(self.config.timing.restart_grace());
        self.platform.clock.sleep(self.config.timing.post_kill());
        self.ctx.stop_tray();
    }

    /// Closes the target and stops the tray for good.
    pub fn exit(&self) {
        info!("Exiting {} and controller", self.executable());
        self.ctx.stop();
        self.close_target(self.config.timing.exit_grace());
        self.ctx.stop_tray();
    }

    /// Posts a close request to the tracked window, waits `grace`, then
    /// force-kills whatever matching process survived.
    fn close_target(&self, grace: std::time::Duration) {
        let p = &self.platform;
        if let Some(window) = self.ctx.window()
            && p.windows.is_window(window)
            && let Err(e) = p.windows.post_close(window)
        {
            warn!("Could not close window {window}: {e}");
        }

        p.clock.sleep(grace);

        process::kill_matching(&*p.processes, self.executable());
    }

    fn view_logs(&self) {
        let Some(path) = &self.log_file else {
            warn!("File logging is disabled, no log to show");
            return;
        };
        if let Err(e) = self.platform.launcher.launch(&path.to_string_lossy()) {
            error!("Failed to open {}: {e}", path.display());
        }
    }
}

#[cfg(test)]
#[path = "supervisor_tests.rs"]
mod tests;
