//! Batch contract report
//!
//! Walks every non-excluded tenant, keeps contracts that resolve to at
//! least one provider or consumer, and writes the result to a single file
//! as a two-column text layout, JSON or CSV.

use crate::config::{Config, ReportConfig};
use crate::layout::{cell, ellipsize, rule};
use crate::output::ReportFormat;
use aci_contracts::{Contract, ContractAnalyzer, Epg, ObjectSource, Relationships, Role, Tenant};
use anyhow::{Context, Result};
use chrono::{DateTime, Local};
use colored::Colorize;
use serde::Serialize;
use std::fs::{self, File};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};
use tracing::info;

pub const REPORT_WIDTH: usize = 140;
pub const PROVIDER_COLUMN_WIDTH: usize = 65;
pub const CONSUMER_COLUMN_WIDTH: usize = 65;

/// Everything one report run collected
#[derive(Debug, Serialize)]
pub struct FabricReport {
    pub fabric: String,
    pub generated_at: DateTime<Local>,
    pub tenants: Vec<TenantSection>,
    pub totals: ReportTotals,
}

#[derive(Debug, Serialize)]
pub struct TenantSection {
    #[serde(flatten)]
    pub tenant: Tenant,
    pub contracts: Vec<ContractSection>,
}

#[derive(Debug, Serialize)]
pub struct ContractSection {
    #[serde(flatten)]
    pub contract: Contract,
    #[serde(flatten)]
    pub relationships: Relationships,
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ReportTotals {
    /// Tenants owning at least one contract
    pub tenants: usize,
    /// Every contract of those tenants, rendered or not
    pub contracts: usize,
    pub providers: usize,
    pub consumers: usize,
}

/// Walk the fabric once and build the report body
pub async fn collect<S: ObjectSource>(
    analyzer: &ContractAnalyzer<S>,
    fabric: &str,
    options: &ReportConfig,
) -> FabricReport {
    let mut totals = ReportTotals::default();
    let mut sections = Vec::new();

    for tenant in analyzer.tenants().await {
        let mut contracts = analyzer.contracts(&tenant.dn).await;
        if contracts.is_empty() {
            continue;
        }
        totals.tenants += 1;
        totals.contracts += contracts.len();
        contracts.sort_by(|a, b| a.name.cmp(&b.name));

        let mut rendered = Vec::new();
        for contract in contracts {
            let mut relationships = analyzer.relationships(&contract.dn).await;
            if !options.include_external_epgs {
                relationships = relationships.without_external();
            }
            if relationships.is_empty() {
                continue;
            }
            totals.providers += relationships.providers.len();
            totals.consumers += relationships.consumers.len();
            rendered.push(ContractSection {
                contract,
                relationships,
            });
        }

        info!("Tenant {}: {} contract(s) rendered", tenant.name, rendered.len());
        sections.push(TenantSection {
            tenant,
            contracts: rendered,
        });
    }

    FabricReport {
        fabric: fabric.to_string(),
        generated_at: Local::now(),
        tenants: sections,
        totals,
    }
}

/// `contracts_report_<fabric>_<YYYYmmdd_HHMMSS>.<ext>`
pub fn report_filename(fabric: &str, format: ReportFormat, at: &DateTime<Local>) -> String {
    let fabric: String = fabric
        .chars()
        .map(|c| if c.is_alphanumeric() || c == '-' || c == '_' { c } else { '_' })
        .collect();
    format!(
        "contracts_report_{}_{}.{}",
        fabric,
        at.format("%Y%m%d_%H%M%S"),
        format.extension()
    )
}

/// Collect, write the file and return its path
pub async fn generate<S: ObjectSource>(
    analyzer: &ContractAnalyzer<S>,
    fabric: &str,
    options: &ReportConfig,
    format: ReportFormat,
    output_dir: &Path,
) -> Result<(PathBuf, ReportTotals)> {
    let report = collect(analyzer, fabric, options).await;

    fs::create_dir_all(output_dir)
        .with_context(|| format!("creating {}", output_dir.display()))?;
    let path = output_dir.join(report_filename(fabric, format, &report.generated_at));
    let file = File::create(&path).with_context(|| format!("creating {}", path.display()))?;
    let mut out = BufWriter::new(file);

    match format {
        ReportFormat::Text => write_text(&report, options, &mut out)?,
        ReportFormat::Json => serde_json::to_writer_pretty(&mut out, &report)?,
        ReportFormat::Csv => write_csv(&report, &mut out)?,
    }
    out.flush()?;

    info!("Report for {} written to {}", fabric, path.display());
    Ok((path, report.totals))
}

/// Report command entry point
pub async fn run<S: ObjectSource>(
    analyzer: &ContractAnalyzer<S>,
    fabric: &str,
    config: &Config,
    format: ReportFormat,
    output_dir: &Path,
) -> Result<()> {
    println!("🔍 Collecting data from {}...", fabric);
    let (path, totals) = generate(analyzer, fabric, &config.report, format, output_dir).await?;
    println!("\n{} Report written: {}", "✅".green(), path.display());
    println!("📊 {} contract(s) analyzed.", totals.contracts);
    Ok(())
}

// ==========================================
// Text layout
// ==========================================

pub fn write_text<W: Write>(report: &FabricReport, options: &ReportConfig, out: &mut W) -> io::Result<()> {
    writeln!(out, "{}", rule('=', REPORT_WIDTH))?;
    writeln!(out, "ACI CONTRACT REPORT - FABRIC: {}", report.fabric.to_uppercase())?;
    writeln!(out, "Generated: {}", report.generated_at.format("%d/%m/%Y %H:%M:%S"))?;
    writeln!(out, "{}", rule('=', REPORT_WIDTH))?;
    writeln!(out)?;

    for section in &report.tenants {
        write_tenant_header(&section.tenant, out)?;
        for contract in &section.contracts {
            write_contract(contract, options, out)?;
        }
    }

    write_summary(report, out)
}

fn write_tenant_header<W: Write>(tenant: &Tenant, out: &mut W) -> io::Result<()> {
    let tenant_part = format!("TENANT: {}", tenant.name);
    let vrf_list = if tenant.vrfs.is_empty() {
        "none".to_string()
    } else {
        tenant
            .vrfs
            .iter()
            .map(|v| v.name.as_str())
            .collect::<Vec<_>>()
            .join(", ")
    };

    // "VRFs:" lines up with the consumer column
    let spacing = (PROVIDER_COLUMN_WIDTH + 1)
        .saturating_sub(tenant_part.chars().count())
        .max(1);

    writeln!(out, "{}{}VRFs: {}", tenant_part, " ".repeat(spacing), vrf_list)?;
    writeln!(out, "{}", rule('━', REPORT_WIDTH))?;
    writeln!(out)
}

fn write_contract<W: Write>(section: &ContractSection, options: &ReportConfig, out: &mut W) -> io::Result<()> {
    writeln!(out, "CONTRACT: {}", section.contract.name)?;
    writeln!(out, "  {} CONSUMERS", cell("PROVIDERS", PROVIDER_COLUMN_WIDTH))?;
    writeln!(
        out,
        "  {} {}",
        rule('─', PROVIDER_COLUMN_WIDTH),
        rule('─', CONSUMER_COLUMN_WIDTH)
    )?;

    let providers = epg_lines(&section.relationships.providers, options.include_subnets, PROVIDER_COLUMN_WIDTH);
    let consumers = epg_lines(&section.relationships.consumers, options.include_subnets, CONSUMER_COLUMN_WIDTH);

    for i in 0..providers.len().max(consumers.len()) {
        let left = providers.get(i).map(String::as_str).unwrap_or("");
        let right = consumers.get(i).map(String::as_str).unwrap_or("");
        let row = format!(
            "  {} {}",
            cell(left, PROVIDER_COLUMN_WIDTH),
            ellipsize(right, CONSUMER_COLUMN_WIDTH)
        );
        writeln!(out, "{}", row.trim_end())?;
    }

    writeln!(out)
}

/// Lines of one column: an EPG header, then its subnets as a tree
pub fn epg_lines(epgs: &[Epg], include_subnets: bool, width: usize) -> Vec<String> {
    let mut lines = Vec::new();

    for (idx, epg) in epgs.iter().enumerate() {
        lines.push(format!("{}: {}", epg.kind.label(), epg.name));

        if include_subnets {
            if epg.subnets.is_empty() {
                lines.push("  └─ no subnet".to_string());
            }
            for (subnet_idx, subnet) in epg.subnets.iter().enumerate() {
                let suffix = subnet
                    .scope
                    .map(|scope| format!(" ({})", scope.short()))
                    .unwrap_or_default();

                // Room left after the branch glyph, the address and the scope tag
                let room = width.saturating_sub(6 + subnet.ip.chars().count() + suffix.chars().count() + 2);
                let description = if subnet.description.is_empty() || room < 4 {
                    String::new()
                } else {
                    format!(" {}", ellipsize(&subnet.description, room))
                };

                let branch = if subnet_idx == epg.subnets.len() - 1 { "  └─" } else { "  ├─" };
                lines.push(format!("{} {}{}{}", branch, subnet.ip, suffix, description));
            }
        }

        if idx < epgs.len() - 1 {
            lines.push(String::new());
        }
    }

    lines
}

fn write_summary<W: Write>(report: &FabricReport, out: &mut W) -> io::Result<()> {
    let totals = &report.totals;

    writeln!(out, "{}", rule('━', REPORT_WIDTH))?;
    writeln!(out)?;
    writeln!(out, "{}", rule('═', REPORT_WIDTH))?;
    writeln!(out, "SUMMARY")?;
    writeln!(out, "{}", rule('═', REPORT_WIDTH))?;
    writeln!(out, "Tenants analyzed: {}", totals.tenants)?;
    writeln!(out, "Contracts: {}", totals.contracts)?;
    writeln!(out, "Provider EPGs: {}", totals.providers)?;
    writeln!(out, "Consumer EPGs: {}", totals.consumers)?;
    writeln!(out, "Fabric: {}", report.fabric)?;
    writeln!(out, "{}", rule('═', REPORT_WIDTH))
}

// ==========================================
// CSV
// ==========================================

#[derive(Debug, Serialize)]
struct CsvRow<'a> {
    tenant: &'a str,
    contract: &'a str,
    role: Role,
    epg: &'a str,
    epg_type: &'static str,
    subnet: &'a str,
    scope: &'static str,
    description: &'a str,
}

/// One row per EPG/subnet pair; an EPG without subnets still gets a row
pub fn write_csv<W: Write>(report: &FabricReport, out: W) -> Result<()> {
    let mut writer = csv::Writer::from_writer(out);

    for section in &report.tenants {
        for contract in &section.contracts {
            let sides = [
                (Role::Provider, &contract.relationships.providers),
                (Role::Consumer, &contract.relationships.consumers),
            ];
            for (role, epgs) in sides {
                for epg in epgs {
                    let base = CsvRow {
                        tenant: &section.tenant.name,
                        contract: &contract.contract.name,
                        role,
                        epg: &epg.name,
                        epg_type: if epg.is_external() { "external" } else { "internal" },
                        subnet: "",
                        scope: "",
                        description: "",
                    };
                    if epg.subnets.is_empty() {
                        writer.serialize(&base)?;
                    }
                    for subnet in &epg.subnets {
                        writer.serialize(CsvRow {
                            subnet: &subnet.ip,
                            scope: subnet.scope.map(|s| s.short()).unwrap_or(""),
                            description: &subnet.description,
                            ..base
                        })?;
                    }
                }
            }
        }
    }

    writer.flush()?;
    Ok(())
}
