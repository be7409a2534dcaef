//! Finds the target application's top-level window.
//!
//! Enumeration order comes from the OS and is not stable between calls,
//! so "first candidate" is a best-effort tie-break. The engine-class
//! preference is the only deterministic part of the selection.

use tracing::{debug, info, warn};

use crate::process::{ProcessTable, names_match};
use crate::window::{WindowHandle, WindowSystem};

/// A visible top-level window owned by the target process.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WindowCandidate {
    pub handle: WindowHandle,
    pub pid: u32,
    pub class: String,
    pub title: String,
}

/// Picks one window from an ordered candidate list.
///
/// With several candidates, the first whose class name contains
/// `engine_marker` wins; otherwise (or with a single candidate) the first
/// candidate is returned.
pub fn select<'a>(
    candidates: &'a [WindowCandidate],
    engine_marker: &str,
) -> Option<&'a WindowCandidate> {
    if candidates.len() > 1 {
        warn!(
            "Multiple windows found ({}), preferring a '{engine_marker}' class",
            candidates.len()
        );
        if let Some(engine) = candidates.iter().find(|c| c.class.contains(engine_marker)) {
            return Some(engine);
        }
    }
    candidates.first()
}

/// Enumerates top-level windows and filters them down to the target
/// process.
pub struct WindowLocator<'a> {
    windows: &'a dyn WindowSystem,
    processes: &'a dyn ProcessTable,
    engine_marker: &'a str,
}

impl<'a> WindowLocator<'a> {
    pub fn new(
        windows: &'a dyn WindowSystem,
        processes: &'a dyn ProcessTable,
        engine_marker: &'a str,
    ) -> Self {
        Self {
            windows,
            processes,
            engine_marker,
        }
    }

    /// Collects the visible windows whose owning process is named
    /// `process_name`, in enumeration order.
    ///
    /// Windows whose owner has already exited are skipped silently. A
    /// failed enumeration yields an empty list.
    pub fn candidates(&self, process_name: &str) -> Vec<WindowCandidate> {
        let handles = match self.windows.top_level_windows() {
            Ok(handles) => handles,
            Err(e) => {
                warn!("Window enumeration failed: {e}");
                return Vec::new();
            }
        };

        let mut candidates = Vec::new();
        for handle in handles {
            if !self.windows.is_visible(handle) {
                continue;
            }
            let pid = match self.windows.owner_pid(handle) {
                Ok(pid) => pid,
                Err(e) => {
                    debug!("Skipping window {handle}: {e}");
                    continue;
                }
            };
            let Some(name) = self.processes.name_of(pid) else {
                debug!(pid, "Skipping window {handle}: owner exited");
                continue;
            };
            if !names_match(&name, process_name) {
                continue;
            }

            let class = self.windows.class_name(handle).unwrap_or_default();
            let title = self.windows.title(handle).unwrap_or_default();
            info!(pid, "Found window {handle} class='{class}' title='{title}'");
            candidates.push(WindowCandidate {
                handle,
                pid,
                class,
                title,
            });
        }
        candidates
    }

    /// Runs one enumeration pass and selects the target window.
    ///
    /// Returns `None` when the process owns no visible window yet; the
    /// caller decides whether to retry.
    pub fn locate(&self, process_name: &str) -> Option<WindowHandle> {
        let candidates = self.candidates(process_name);
        if candidates.is_empty() {
            warn!("No windows found for {process_name}");
            return None;
        }
        let selected = select(&candidates, self.engine_marker)?;
        info!("Selected window {}", selected.handle);
        Some(selected.handle)
    }
}

#[cfg(test)]
#[path = "locate_tests.rs"]
mod tests;
