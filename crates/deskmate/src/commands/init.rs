use anyhow::{Context, Result, anyhow};
use deskmate_core::config;

/// Creates `~/.config/deskmate/config.toml` with default values.
///
/// An existing file is left alone unless `force` is set.
pub fn execute(force: bool) -> Result<()> {
    let path = config::config_path().context("could not determine home directory")?;

    if path.exists() && !force {
        println!("Already exists: {}", path.display());
        return Ok(());
    }

    config::write_default(&path).map_err(|e| anyhow!(e))?;
    println!("Created {}", path.display());
    Ok(())
}
