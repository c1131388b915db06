//! ACI Contract Visualizer
//!
//! Reports and browses the contracts of Cisco ACI fabrics through the
//! APIC REST API.
//!
//! # Usage
//!
//! ```bash
//! aci-contracts                                  # main menu
//! aci-contracts --fabric DC1 report --format csv
//! aci-contracts --apic 10.1.1.1 browse
//! aci-contracts --fabric DC1 contracts --tenant prod -o json
//! aci-contracts --fabric DC1 show --tenant prod --contract web-to-db
//! aci-contracts config init
//! ```

use anyhow::{bail, Result};
use clap::{Parser, Subcommand};
use commands::prompt::Prompt;
use commands::Credentials;
use config::{Config, FabricConfig};
use output::{OutputFormat, ReportFormat};
use std::io;
use std::path::PathBuf;

mod commands;
mod config;
mod layout;
mod logging;
mod output;

#[derive(Parser)]
#[command(name = "aci-contracts")]
#[command(version)]
#[command(about = "Cisco ACI contract visualizer", long_about = None)]
struct Cli {
    /// Config file (default: ~/.aci-contracts/config.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Profile name, reads ~/.aci-contracts/config.<profile>.toml
    #[arg(long, short, global = true)]
    profile: Option<String>,

    /// Fabric name from the config file
    #[arg(long, short, global = true)]
    fabric: Option<String>,

    /// APIC address, bypasses the configured fabrics
    #[arg(long, global = true)]
    apic: Option<String>,

    /// APIC username
    #[arg(long, short, env = "ACI_USERNAME", global = true)]
    username: Option<String>,

    /// APIC password
    #[arg(long, env = "ACI_PASSWORD", hide_env_values = true, global = true)]
    password: Option<String>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Write the full contract report of a fabric
    Report {
        /// Report format (default from config)
        #[arg(long)]
        format: Option<ReportFormat>,
        /// Output directory (default from config)
        #[arg(long)]
        output_dir: Option<PathBuf>,
    },
    /// Browse tenants and contracts interactively
    Browse,
    /// List tenants and their VRFs
    Tenants {
        #[arg(long, short, default_value = "table")]
        output: OutputFormat,
    },
    /// List the contracts of a tenant
    Contracts {
        #[arg(long, short)]
        tenant: String,
        #[arg(long, short, default_value = "table")]
        output: OutputFormat,
    },
    /// Show providers and consumers of a contract
    Show {
        #[arg(long, short)]
        tenant: String,
        #[arg(long, short)]
        contract: String,
        #[arg(long, short, default_value = "table")]
        output: OutputFormat,
    },
    /// Configure CLI
    Config {
        #[command(subcommand)]
        action: ConfigCommands,
    },
}

#[derive(Subcommand)]
pub enum ConfigCommands {
    /// Write a sample configuration
    Init {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
    /// Print the configuration in use
    List,
    /// Print the configuration file path
    Path,
    /// List configured fabrics
    Fabrics,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let result = match Config::load(cli.config.as_deref(), cli.profile.as_deref()) {
        Ok(config) => run(cli, config).await,
        Err(e) => Err(e),
    };

    match result {
        Ok(()) => {}
        Err(e) if ended_by_eof(&e) => println!(),
        Err(e) => {
            eprintln!("Error: {:#}", e);
            std::process::exit(1);
        }
    }
}

async fn run(cli: Cli, config: Config) -> Result<()> {
    // Config commands never touch a fabric
    if let Some(Commands::Config { action }) = cli.command {
        let path = match cli.config {
            Some(path) => path,
            None => Config::config_path(cli.profile.as_deref())?,
        };
        return commands::config::handle(action, &config, &path);
    }

    logging::init(&config.logging)?;

    let credentials = Credentials {
        username: cli.username.clone(),
        password: cli.password.clone(),
    };
    let chosen = chosen_fabric(&cli, &config)?;
    let mut prompt = Prompt::console();

    let Some(command) = cli.command else {
        return commands::menu::run(&config, &credentials, chosen.as_ref(), &mut prompt).await;
    };

    let fabric = match chosen {
        Some(fabric) => fabric,
        None => single_fabric(&config)?,
    };
    let (username, password) = credentials.resolve(&fabric, &mut prompt)?;
    let analyzer = commands::connect(&fabric, &username, &password, &config).await?;

    match command {
        Commands::Report { format, output_dir } => {
            let format = format.unwrap_or(config.report.format);
            let output_dir = output_dir.unwrap_or_else(|| config.output_dir.clone());
            commands::report::run(&analyzer, &fabric.name, &config, format, &output_dir).await
        }
        Commands::Browse => {
            commands::browse::run(&analyzer, &mut prompt).await?;
            Ok(())
        }
        Commands::Tenants { output } => commands::inspect::tenants(&analyzer, output).await,
        Commands::Contracts { tenant, output } => {
            commands::inspect::contracts(&analyzer, &tenant, output).await
        }
        Commands::Show {
            tenant,
            contract,
            output,
        } => commands::inspect::show(&analyzer, &tenant, &contract, output).await,
        Commands::Config { .. } => Ok(()),
    }
}

/// Fabric named by `--apic` or `--fabric`
fn chosen_fabric(cli: &Cli, config: &Config) -> Result<Option<FabricConfig>> {
    if let Some(apic) = &cli.apic {
        return Ok(Some(FabricConfig::adhoc(apic, cli.fabric.as_deref())));
    }
    match &cli.fabric {
        Some(name) => match config.fabric(name) {
            Some(fabric) => Ok(Some(fabric.clone())),
            None => bail!("Fabric '{}' is not configured", name),
        },
        None => Ok(None),
    }
}

fn single_fabric(config: &Config) -> Result<FabricConfig> {
    match config.fabrics.as_slice() {
        [fabric] => Ok(fabric.clone()),
        [] => bail!("No fabric configured. Run `aci-contracts config init` or pass --apic."),
        _ => bail!("Several fabrics configured, pick one with --fabric"),
    }
}

/// Console closed while a prompt was waiting
fn ended_by_eof(err: &anyhow::Error) -> bool {
    err.downcast_ref::<io::Error>()
        .is_some_and(|e| e.kind() == io::ErrorKind::UnexpectedEof)
}
