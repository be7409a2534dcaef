use std::sync::{Mutex, MutexGuard, PoisonError};

use sysinfo::{Pid, ProcessesToUpdate, System};

use super::{ProcessEntry, ProcessTable};

/// [`ProcessTable`] backed by `sysinfo`.
///
/// Keeps one `System` instance around so repeated refreshes reuse its
/// allocations.
#[derive(Debug, Default)]
pub struct SystemProcesses {
    system: Mutex<System>,
}

impl SystemProcesses {
    pub fn new() -> Self {
        Self::default()
    }

    fn system(&self) -> MutexGuard<'_, System> {
        self.system.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Refreshes a single PID and returns the locked system.
    fn refreshed(&self, pid: Pid) -> MutexGuard<'_, System> {
        let mut system = self.system();
        system.refresh_processes(ProcessesToUpdate::Some(&[pid]), true);
        system
    }
}

impl ProcessTable for SystemProcesses {
    fn snapshot(&self) -> Vec<ProcessEntry> {
        let mut system = self.system();
        system.refresh_processes(ProcessesToUpdate::All, true);
        system
            .processes()
            .iter()
            .map(|(pid, process)| ProcessEntry {
                pid: pid.as_u32(),
                name: process.name().to_string_lossy().into_owned(),
            })
            .collect()
    }

    fn name_of(&self, pid: u32) -> Option<String> {
        let pid = Pid::from_u32(pid);
        self.refreshed(pid)
            .process(pid)
            .map(|p| p.name().to_string_lossy().into_owned())
    }

    fn kill(&self, pid: u32) -> bool {
        let pid = Pid::from_u32(pid);
        self.refreshed(pid).process(pid).is_some_and(|p| p.kill())
    }
}
