//! CLI Commands

pub mod browse;
pub mod config;
pub mod inspect;
pub mod menu;
pub mod prompt;
pub mod report;

#[cfg(test)]
pub(crate) mod fixtures;

use crate::config::{Config, FabricConfig};
use aci_contracts::{ApicSession, ContractAnalyzer};
use colored::Colorize;
use prompt::Prompt;
use std::io::{self, BufRead, Write};
use tracing::info;

/// Credentials given on the command line or in the environment
#[derive(Debug, Clone, Default)]
pub struct Credentials {
    pub username: Option<String>,
    pub password: Option<String>,
}

impl Credentials {
    /// Fill whatever is missing from the fabric config, then the console
    pub fn resolve<R: BufRead, W: Write>(
        &self,
        fabric: &FabricConfig,
        prompt: &mut Prompt<R, W>,
    ) -> io::Result<(String, String)> {
        let username = match self.username.clone().or_else(|| fabric.username.clone()) {
            Some(u) => u,
            None => prompt.ask("Username: ")?,
        };
        let password = match self.password.clone() {
            Some(p) => p,
            None => prompt.secret("Password: ")?,
        };
        Ok((username, password))
    }
}

/// Log in to a fabric and wrap the session in an analyzer
pub async fn connect(
    fabric: &FabricConfig,
    username: &str,
    password: &str,
    config: &Config,
) -> aci_contracts::Result<ContractAnalyzer<ApicSession>> {
    info!("Connecting to fabric {} ({})", fabric.name, fabric.apic);
    let session = ApicSession::authenticate(&fabric.session_config(), username, password).await?;
    println!("{} Connected to {}", "✅".green(), fabric.name);
    Ok(ContractAnalyzer::new(session, config.excluded_tenants.iter().cloned()))
}
