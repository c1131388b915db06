//! Non-interactive listing commands

use crate::output::OutputFormat;
use aci_contracts::{ContractAnalyzer, ObjectSource, Relationships, Role, Tenant};
use anyhow::{anyhow, Result};
use serde::Serialize;
use tabled::Tabled;

#[derive(Debug, Tabled)]
pub struct TenantRow {
    pub name: String,
    pub vrfs: String,
}

#[derive(Debug, Tabled)]
pub struct ContractRow {
    pub name: String,
    pub dn: String,
}

#[derive(Debug, Tabled)]
pub struct EpgRow {
    pub role: String,
    pub epg: String,
    #[tabled(rename = "type")]
    pub kind: String,
    pub subnet: String,
    pub scope: String,
    pub description: String,
}

#[derive(Debug, Serialize)]
pub struct ContractView {
    pub tenant: String,
    pub contract: String,
    #[serde(flatten)]
    pub relationships: Relationships,
}

pub fn tenant_rows(tenants: &[Tenant]) -> Vec<TenantRow> {
    tenants
        .iter()
        .map(|t| TenantRow {
            name: t.name.clone(),
            vrfs: t.vrfs.iter().map(|v| v.name.as_str()).collect::<Vec<_>>().join(", "),
        })
        .collect()
}

pub fn epg_rows(view: &ContractView) -> Vec<EpgRow> {
    let sides = [
        (Role::Provider, &view.relationships.providers),
        (Role::Consumer, &view.relationships.consumers),
    ];

    let mut rows = Vec::new();
    for (role, epgs) in sides {
        let role = match role {
            Role::Provider => "provider",
            Role::Consumer => "consumer",
        };
        for epg in epgs {
            let kind = if epg.is_external() { "external" } else { "internal" };
            if epg.subnets.is_empty() {
                rows.push(EpgRow {
                    role: role.into(),
                    epg: epg.name.clone(),
                    kind: kind.into(),
                    subnet: String::new(),
                    scope: String::new(),
                    description: String::new(),
                });
            }
            for subnet in &epg.subnets {
                rows.push(EpgRow {
                    role: role.into(),
                    epg: epg.name.clone(),
                    kind: kind.into(),
                    subnet: subnet.ip.clone(),
                    scope: subnet.scope.map(|s| s.short()).unwrap_or_default().into(),
                    description: subnet.description.clone(),
                });
            }
        }
    }
    rows
}

async fn find_tenant<S: ObjectSource>(analyzer: &ContractAnalyzer<S>, name: &str) -> Result<Tenant> {
    if analyzer.is_excluded(name) {
        return Err(anyhow!("Tenant '{}' is excluded by configuration", name));
    }
    analyzer
        .tenants()
        .await
        .into_iter()
        .find(|t| t.name == name)
        .ok_or_else(|| anyhow!("Tenant '{}' not found", name))
}

pub async fn tenants<S: ObjectSource>(analyzer: &ContractAnalyzer<S>, format: OutputFormat) -> Result<()> {
    let tenants = analyzer.tenants().await;
    format.print(&tenants, |tenants| tenant_rows(tenants))
}

pub async fn contracts<S: ObjectSource>(
    analyzer: &ContractAnalyzer<S>,
    tenant: &str,
    format: OutputFormat,
) -> Result<()> {
    let tenant = find_tenant(analyzer, tenant).await?;
    let mut contracts = analyzer.contracts(&tenant.dn).await;
    contracts.sort_by(|a, b| a.name.cmp(&b.name));

    format.print(&contracts, |contracts| {
        contracts
            .iter()
            .map(|c| ContractRow {
                name: c.name.clone(),
                dn: c.dn.clone(),
            })
            .collect()
    })
}

/// Resolve one contract of one tenant
pub async fn contract_view<S: ObjectSource>(
    analyzer: &ContractAnalyzer<S>,
    tenant: &str,
    contract: &str,
) -> Result<ContractView> {
    let tenant = find_tenant(analyzer, tenant).await?;
    let found = analyzer
        .contracts(&tenant.dn)
        .await
        .into_iter()
        .find(|c| c.name == contract)
        .ok_or_else(|| anyhow!("Contract '{}' not found in tenant '{}'", contract, tenant.name))?;

    Ok(ContractView {
        tenant: tenant.name,
        contract: found.name,
        relationships: analyzer.relationships(&found.dn).await,
    })
}

pub async fn show<S: ObjectSource>(
    analyzer: &ContractAnalyzer<S>,
    tenant: &str,
    contract: &str,
    format: OutputFormat,
) -> Result<()> {
    let view = contract_view(analyzer, tenant, contract).await?;
    format.print(&view, epg_rows)
}
