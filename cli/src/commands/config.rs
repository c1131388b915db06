//! Config commands

use crate::config::Config;
use crate::ConfigCommands;
use anyhow::{bail, Result};
use std::path::Path;

pub fn handle(action: ConfigCommands, config: &Config, path: &Path) -> Result<()> {
    match action {
        ConfigCommands::Init { force } => {
            if path.exists() && !force {
                bail!("{} already exists (use --force to overwrite)", path.display());
            }
            Config::sample().save(path)?;
            println!("Configuration initialized at {}", path.display());
        }
        ConfigCommands::List => {
            print!("{}", toml::to_string_pretty(config)?);
        }
        ConfigCommands::Path => {
            println!("{}", path.display());
        }
        ConfigCommands::Fabrics => {
            if config.fabrics.is_empty() {
                println!("No fabric configured. Run `aci-contracts config init`.");
            }
            for (idx, fabric) in config.fabrics.iter().enumerate() {
                println!("{}. {} ({})", idx + 1, fabric.name, fabric.apic);
            }
        }
    }
    Ok(())
}
