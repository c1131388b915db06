//! Interactive contract browsing
//!
//! tenant menu → contract menu → providers/consumers → continue?

use super::prompt::Prompt;
use crate::layout::ellipsize;
use aci_contracts::{Contract, ContractAnalyzer, Epg, ObjectSource, Tenant};
use colored::Colorize;
use std::io::{self, BufRead, Write};

/// Description limits of the console view
const EXTERNAL_DESCRIPTION_MAX: usize = 50;
const INTERNAL_DESCRIPTION_MAX: usize = 60;

/// How a browsing session ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Exit {
    /// Back to the main menu
    MainMenu,
    /// Leave the program
    Quit,
}

pub async fn run<S, R, W>(analyzer: &ContractAnalyzer<S>, prompt: &mut Prompt<R, W>) -> io::Result<Exit>
where
    S: ObjectSource,
    R: BufRead,
    W: Write,
{
    loop {
        let tenants = analyzer.tenants().await;
        if tenants.is_empty() {
            writeln!(prompt.out(), "{} No tenant available.", "❌".red())?;
            return Ok(Exit::MainMenu);
        }

        let names: Vec<_> = tenants.iter().map(|t| t.name.as_str()).collect();
        let tenant = &tenants[prompt.choose("Select a tenant", &names)?];

        let mut contracts = analyzer.contracts(&tenant.dn).await;
        if contracts.is_empty() {
            match no_contracts(tenant, prompt)? {
                1 => continue,
                2 => return Ok(Exit::MainMenu),
                _ => return Ok(Exit::Quit),
            }
        }

        contracts.sort_by(|a, b| a.name.cmp(&b.name));
        let names: Vec<_> = contracts.iter().map(|c| c.name.as_str()).collect();
        let contract = &contracts[prompt.choose("Select a contract", &names)?];

        show_contract(analyzer, tenant, contract, prompt.out()).await?;

        if !prompt.confirm("\nBrowse another contract/tenant? (yes/no): ")? {
            return Ok(Exit::MainMenu);
        }
    }
}

fn no_contracts<R: BufRead, W: Write>(tenant: &Tenant, prompt: &mut Prompt<R, W>) -> io::Result<usize> {
    let out = prompt.out();
    writeln!(out, "\n{}  No contract found in tenant '{}'.", "⚠️".yellow(), tenant.name)?;
    writeln!(out, "Options:")?;
    writeln!(out, "1. Select another tenant")?;
    writeln!(out, "2. Return to main menu")?;
    writeln!(out, "3. Quit")?;
    prompt.number("\nYour choice: ", 3)
}

/// Providers then consumers of one contract
pub async fn show_contract<S: ObjectSource, W: Write>(
    analyzer: &ContractAnalyzer<S>,
    tenant: &Tenant,
    contract: &Contract,
    out: &mut W,
) -> io::Result<()> {
    writeln!(out, "\nTenant: {}  |  Contract: {}\n", tenant.name, contract.name)?;

    let relationships = analyzer.relationships(&contract.dn).await;

    if !relationships.providers.is_empty() {
        writeln!(out, "Providers:")?;
        write_epgs(&relationships.providers, "├──", out)?;
    }
    if !relationships.consumers.is_empty() {
        writeln!(out, "Consumers:")?;
        write_epgs(&relationships.consumers, "└──", out)?;
    }
    if relationships.is_empty() {
        writeln!(out, "{} No provider/consumer EPG bound.", "❌".red())?;
    }
    Ok(())
}

fn write_epgs<W: Write>(epgs: &[Epg], branch: &str, out: &mut W) -> io::Result<()> {
    for epg in epgs {
        writeln!(out, "{} {}-{}", branch, epg.kind.label(), epg.name)?;

        let max = if epg.is_external() {
            EXTERNAL_DESCRIPTION_MAX
        } else {
            INTERNAL_DESCRIPTION_MAX
        };
        for subnet in &epg.subnets {
            let mut line = subnet.ip.clone();
            if let Some(scope) = subnet.scope {
                line.push_str(&format!(" ({})", scope.short()));
            }
            if !subnet.description.is_empty() {
                line.push(' ');
                line.push_str(&ellipsize(&subnet.description, max));
            }
            writeln!(out, "    ├── {}", line)?;
        }
    }
    Ok(())
}
