//! Turns a located window into a desktop overlay.

use std::time::Duration;

use tracing::{error, info, warn};

use crate::OsResult;
use crate::clock::Clock;
use crate::locate::WindowLocator;
use crate::window::{WindowHandle, WindowSystem, ex_style};

/// Pauses between OS calls, giving the window manager time to process
/// each change asynchronously.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReconcilePacing {
    /// After restoring a minimized window.
    pub restore: Duration,
    /// After the first non-activating show.
    pub show: Duration,
    /// After writing the new extended style.
    pub style: Duration,
}

/// How many locate + reconcile attempts to make, and how long to wait
/// between them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub attempts: u32,
    pub backoff: Duration,
}

/// Outcome of [`acquire_window`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Acquisition {
    /// The last window the locator selected, whether or not it was
    /// reconciled. Used later to post a graceful close.
    pub window: Option<WindowHandle>,
    /// Whether a reconcile attempt succeeded.
    pub configured: bool,
    /// Number of attempts made.
    pub attempts: u32,
}

/// Applies the taskbar-hiding, no-activate and desktop-reparenting
/// changes to a window.
pub struct WindowReconciler<'a> {
    windows: &'a dyn WindowSystem,
    clock: &'a dyn Clock,
    desktop_classes: &'a [String],
    pacing: ReconcilePacing,
}

impl<'a> WindowReconciler<'a> {
    pub fn new(
        windows: &'a dyn WindowSystem,
        clock: &'a dyn Clock,
        desktop_classes: &'a [String],
        pacing: ReconcilePacing,
    ) -> Self {
        Self {
            windows,
            clock,
            desktop_classes,
            pacing,
        }
    }

    /// Reconciles `window` into an overlay.
    ///
    /// Returns `false` if no window is given or an OS call fails. A failed
    /// desktop reparent is logged but does not fail the reconcile: the
    /// style changes still apply.
    pub fn reconcile(&self, window: Option<WindowHandle>) -> bool {
        let Some(window) = window else {
            error!("No window handle available");
            return false;
        };

        match self.apply(window) {
            Ok(()) => {
                info!("Successfully modified window {window}");
                true
            }
            Err(e) => {
                error!("Error modifying window {window}: {e}");
                false
            }
        }
    }

    fn apply(&self, window: WindowHandle) -> OsResult<()> {
        if self.windows.is_minimized(window) {
            self.windows.restore(window)?;
            self.clock.sleep(self.pacing.restore);
        }

        self.windows.show_no_activate(window)?;
        self.clock.sleep(self.pacing.show);

        let current = self.windows.ex_style(window)?;
        let overlay = ex_style::overlay(current);
        self.windows.set_ex_style(window, overlay)?;
        self.clock.sleep(self.pacing.style);

        self.reparent_to_desktop(window);

        self.windows.show_no_activate(window)
    }

    /// Makes the desktop background container the window's parent.
    ///
    /// Tries each configured container class in order and uses the first
    /// one found. Returns `false` (after logging) if no container exists
    /// or the OS rejects the reparent.
    pub fn reparent_to_desktop(&self, window: WindowHandle) -> bool {
        let container = self
            .desktop_classes
            .iter()
            .find_map(|class| self.windows.find_by_class(class));

        let Some(container) = container else {
            warn!("Could not find desktop window");
            return false;
        };

        match self.windows.set_parent(window, container) {
            Ok(()) => {
                info!("Set parent to desktop: {container}");
                true
            }
            Err(e) => {
                warn!("Error setting parent: {e}");
                false
            }
        }
    }
}

/// Locates and reconciles the target window with bounded retries.
///
/// Each attempt runs a fresh [`WindowLocator::locate`] followed by
/// [`WindowReconciler::reconcile`]; the first successful reconcile ends
/// the loop. Failed attempts are separated by `policy.backoff`.
pub fn acquire_window(
    locator: &WindowLocator<'_>,
    reconciler: &WindowReconciler<'_>,
    clock: &dyn Clock,
    policy: &RetryPolicy,
    process_name: &str,
) -> Acquisition {
    let mut window = None;
    let mut attempts = 0;

    while attempts < policy.attempts {
        attempts += 1;

        if let Some(found) = locator.locate(process_name) {
            window = Some(found);
            if reconciler.reconcile(Some(found)) {
                return Acquisition {
                    window,
                    configured: true,
                    attempts,
                };
            }
        }

        if attempts < policy.attempts {
            info!("Retry attempt {attempts}...");
            clock.sleep(policy.backoff);
        }
    }

    Acquisition {
        window,
        configured: false,
        attempts,
    }
}

#[cfg(test)]
#[path = "reconcile_tests.rs"]
mod tests;
