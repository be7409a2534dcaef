use anyhow::Result;

/// Prints every visible window owned by the target process, marking the
/// one the locator would pick.
#[cfg(windows)]
pub fn execute() -> Result<()> {
    use deskmate_core::{SystemProcesses, WindowLocator, config, locate};
    use deskmate_windows::Win32Windows;

    let config = config::load();
    let marker = &config.window.engine_class_marker;
    let executable = &config.target.executable;

    let windows = Win32Windows::new();
    let processes = SystemProcesses::new();
    let locator = WindowLocator::new(&windows, &processes, marker);

    let candidates = locator.candidates(executable);
    let selected = locate::select(&candidates, marker).map(|c| c.handle);

    for candidate in &candidates {
        let mark = if Some(candidate.handle) == selected { "*" } else { " " };
        println!(
            "{mark} {}  pid={}  class='{}'  title='{}'",
            candidate.handle, candidate.pid, candidate.class, candidate.title
        );
    }
    println!("\n{} {executable} windows found", candidates.len());
    Ok(())
}

#[cfg(not(windows))]
pub fn execute() -> Result<()> {
    Err(deskmate_core::OsError::Unsupported.into())
}
