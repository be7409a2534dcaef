use std::os::windows::process::CommandExt;
use std::process::{Command, Stdio};

use deskmate_core::OsResult;
use tracing::info;

/// `CREATE_NO_WINDOW | CREATE_NEW_PROCESS_GROUP`: the new controller has
/// no console and does not share ours, so this process can exit at once.
const DETACH_FLAGS: u32 = 0x0800_0000 | 0x0000_0200;

/// Starts a fresh, fully detached copy of the running executable with
/// the same arguments. Returns the new process id.
pub fn spawn_self() -> OsResult<u32> {
    let exe = std::env::current_exe()?;
    let child = Command::new(&exe)
        .args(std::env::args_os().skip(1))
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .creation_flags(DETACH_FLAGS)
        .spawn()?;

    let pid = child.id();
    info!(pid, "Started new controller instance");
    Ok(pid)
}
