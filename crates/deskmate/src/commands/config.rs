use anyhow::{Context, Result, anyhow};
use deskmate_core::{Config, config};

/// Prints the configuration the controller would run with.
///
/// Unlike `run`, an invalid config file is an error here.
pub fn execute() -> Result<()> {
    let path = config::config_path().context("could not determine home directory")?;
    let loaded = config::try_load_from(&path).map_err(|e| anyhow!(e))?;

    match &loaded {
        Some(_) => println!("# {}", path.display()),
        None => println!("# {} (not found, using defaults)", path.display()),
    }
    let config = loaded.unwrap_or_else(|| {
        let mut config = Config::default();
        config.validate();
        config
    });
    print!("{}", toml::to_string_pretty(&config)?);
    Ok(())
}
