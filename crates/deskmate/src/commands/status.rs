use anyhow::Result;
use deskmate_core::{SystemProcesses, config, process};

pub fn execute() -> Result<()> {
    let config = config::load();
    let executable = &config.target.executable;

    let running = process::find_matching(&SystemProcesses::new(), executable);
    if running.is_empty() {
        println!("{executable} is not running.");
        return Ok(());
    }

    for entry in running {
        println!("{} is running (PID: {}).", entry.name, entry.pid);
    }
    Ok(())
}
