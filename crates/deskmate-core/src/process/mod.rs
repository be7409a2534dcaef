//! Process table access and the wait-for-launch poll.

mod system;

use std::time::Duration;

use tracing::{debug, info};

use crate::clock::Clock;

pub use system::SystemProcesses;

/// One row of the OS process table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessEntry {
    pub pid: u32,
    /// Image name, e.g. `DesktopMate.exe`.
    pub name: String,
}

/// Read and kill access to the OS process table.
///
/// Implementations must tolerate processes that exit between listing and
/// inspection: a vanished PID is reported as `None`/`false`, never as an
/// error.
pub trait ProcessTable: Send + Sync {
    /// Lists every live process.
    fn snapshot(&self) -> Vec<ProcessEntry>;

    /// Resolves a PID to its image name, or `None` if it is gone.
    fn name_of(&self, pid: u32) -> Option<String>;

    /// Force-terminates a process. Returns `false` if it was already gone
    /// or could not be killed.
    fn kill(&self, pid: u32) -> bool;
}

/// Compares two image names exactly, ignoring case.
///
/// `DesktopMate.exe` matches `desktopmate.exe` but not
/// `DesktopMateUpdater.exe`.
pub fn names_match(actual: &str, expected: &str) -> bool {
    actual
        .chars()
        .flat_map(char::to_lowercase)
        .eq(expected.chars().flat_map(char::to_lowercase))
}

/// Returns every live process whose image name matches `name`.
pub fn find_matching(table: &dyn ProcessTable, name: &str) -> Vec<ProcessEntry> {
    table
        .snapshot()
        .into_iter()
        .filter(|p| names_match(&p.name, name))
        .collect()
}

/// Returns the first live process whose image name matches `name`.
pub fn find_first(table: &dyn ProcessTable, name: &str) -> Option<ProcessEntry> {
    table
        .snapshot()
        .into_iter()
        .find(|p| names_match(&p.name, name))
}

/// Force-terminates every process matching `name`.
///
/// Returns how many processes were killed. Processes that exit on their
/// own in the meantime are skipped.
pub fn kill_matching(table: &dyn ProcessTable, name: &str) -> usize {
    let mut killed = 0;
    for entry in find_matching(table, name) {
        if table.kill(entry.pid) {
            info!(pid = entry.pid, "Force killed {}", entry.name);
            killed += 1;
        } else {
            debug!(pid = entry.pid, "{} was already gone", entry.name);
        }
    }
    killed
}

/// Timing for [`wait_for_process`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WaitPolicy {
    /// Give up after this long without a match.
    pub timeout: Duration,
    /// Pause between process table scans.
    pub poll: Duration,
    /// Extra pause after the first match so the process can create its
    /// window.
    pub settle: Duration,
}

/// Polls the process table until a process named `name` appears.
///
/// Returns `true` once a match is seen, after sleeping for the settle
/// delay. Returns `false` if `policy.timeout` elapses first.
pub fn wait_for_process(
    table: &dyn ProcessTable,
    clock: &dyn Clock,
    name: &str,
    policy: &WaitPolicy,
) -> bool {
    info!("Waiting for {name} to launch...");
    let start = clock.now();

    while clock.now().duration_since(start) < policy.timeout {
        if let Some(found) = find_first(table, name) {
            info!(pid = found.pid, "{name} process found");
            clock.sleep(policy.settle);
            return true;
        }
        clock.sleep(policy.poll);
    }

    false
}
