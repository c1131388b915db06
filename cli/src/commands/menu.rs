//! Main menu
//!
//! Started when no subcommand is given: pick a mode, a fabric, log in,
//! run. A failed login comes back here instead of ending the program.

use super::browse::{self, Exit};
use super::prompt::Prompt;
use super::{connect, report, Credentials};
use crate::config::{Config, FabricConfig};
use anyhow::{bail, Result};
use colored::Colorize;
use std::io::{BufRead, Write};
use tracing::warn;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mode {
    Report,
    Browse,
    Quit,
}

pub async fn run<R: BufRead, W: Write>(
    config: &Config,
    credentials: &Credentials,
    adhoc: Option<&FabricConfig>,
    prompt: &mut Prompt<R, W>,
) -> Result<()> {
    writeln!(prompt.out(), "🚀 ACI Contract Visualizer")?;

    loop {
        let mode = select_mode(prompt)?;
        if mode == Mode::Quit {
            writeln!(prompt.out(), "👋 Goodbye.")?;
            return Ok(());
        }

        let fabric = select_fabric(config, adhoc, prompt)?;
        let (username, password) = credentials.resolve(&fabric, prompt)?;

        let analyzer = match connect(&fabric, &username, &password, config).await {
            Ok(analyzer) => analyzer,
            Err(e) => {
                writeln!(prompt.out(), "{} {}", "❌".red(), e)?;
                continue;
            }
        };

        if mode == Mode::Browse {
            if browse::run(&analyzer, prompt).await? == Exit::Quit {
                return Ok(());
            }
            continue;
        }

        let format = config.report.format;
        if let Err(e) = report::run(&analyzer, &fabric.name, config, format, &config.output_dir).await {
            warn!("Report for {} failed: {:#}", fabric.name, e);
            writeln!(prompt.out(), "{} Report failed: {:#}", "❌".red(), e)?;
        }
    }
}

fn select_mode<R: BufRead, W: Write>(prompt: &mut Prompt<R, W>) -> Result<Mode> {
    let out = prompt.out();
    writeln!(out, "\n=== Main Menu ===")?;
    writeln!(out, "1. Full contract report per fabric")?;
    writeln!(out, "2. Interactive browsing")?;
    writeln!(out, "3. Quit")?;

    Ok(match prompt.number("\nYour choice: ", 3)? {
        1 => Mode::Report,
        2 => Mode::Browse,
        _ => Mode::Quit,
    })
}

fn select_fabric<R: BufRead, W: Write>(
    config: &Config,
    adhoc: Option<&FabricConfig>,
    prompt: &mut Prompt<R, W>,
) -> Result<FabricConfig> {
    if let Some(fabric) = adhoc {
        return Ok(fabric.clone());
    }
    if config.fabrics.is_empty() {
        bail!("No fabric configured. Run `aci-contracts config init` or pass --apic.");
    }

    let labels: Vec<_> = config
        .fabrics
        .iter()
        .map(|f| format!("{} ({})", f.name, f.apic))
        .collect();
    let idx = prompt.choose("Select a fabric", &labels)?;
    Ok(config.fabrics[idx].clone())
}
