//! CLI Configuration
//!
//! Loaded once at startup from `~/.aci-contracts/config.toml` (or
//! `config.<profile>.toml`) and never modified during a run.

use crate::output::ReportFormat;
use aci_contracts::SessionConfig;
use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Tenants never shown nor traversed
    pub excluded_tenants: Vec<String>,
    /// Directory batch reports are written to
    pub output_dir: PathBuf,
    pub fabrics: Vec<FabricConfig>,
    pub report: ReportConfig,
    pub logging: LoggingConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            excluded_tenants: vec!["mgmt".into(), "infra".into(), "common".into()],
            output_dir: PathBuf::from("."),
            fabrics: Vec::new(),
            report: ReportConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

/// One APIC cluster
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FabricConfig {
    pub name: String,
    /// APIC host, IP or URL
    pub apic: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(default)]
    pub verify_tls: bool,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_timeout_secs() -> u64 {
    SessionConfig::DEFAULT_TIMEOUT.as_secs()
}

impl FabricConfig {
    /// Fabric given on the command line rather than in the config file
    pub fn adhoc(apic: &str, name: Option<&str>) -> Self {
        Self {
            name: name.unwrap_or(apic).to_string(),
            apic: apic.to_string(),
            username: None,
            verify_tls: false,
            timeout_secs: default_timeout_secs(),
        }
    }

    pub fn session_config(&self) -> SessionConfig {
        SessionConfig::new(&self.apic)
            .verify_tls(self.verify_tls)
            .timeout(Duration::from_secs(self.timeout_secs))
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(default)]
pub struct ReportConfig {
    pub format: ReportFormat,
    pub include_subnets: bool,
    pub include_external_epgs: bool,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            format: ReportFormat::Text,
            include_subnets: true,
            include_external_epgs: true,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Filter used when `RUST_LOG` is unset
    pub level: String,
    /// Log to this file instead of stderr
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file: Option<PathBuf>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "warn".into(),
            file: None,
        }
    }
}

impl Config {
    /// Load from `path`, or from the default location for `profile`.
    /// A missing file yields the defaults.
    pub fn load(path: Option<&Path>, profile: Option<&str>) -> Result<Self> {
        let path = match path {
            Some(p) => p.to_path_buf(),
            None => Self::config_path(profile)?,
        };
        if path.exists() {
            let content = fs::read_to_string(&path)
                .with_context(|| format!("reading {}", path.display()))?;
            Self::parse(&content).with_context(|| format!("parsing {}", path.display()))
        } else {
            Ok(Self::default())
        }
    }

    pub fn parse(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)?;
        fs::write(path, content).with_context(|| format!("writing {}", path.display()))
    }

    pub fn config_path(profile: Option<&str>) -> Result<PathBuf> {
        let home = dirs::home_dir().ok_or_else(|| anyhow!("Cannot find home directory"))?;
        let filename = match profile {
            Some(p) => format!("config.{}.toml", p),
            None => "config.toml".to_string(),
        };
        Ok(home.join(".aci-contracts").join(filename))
    }

    /// Starting point written by `config init`
    pub fn sample() -> Self {
        Self {
            fabrics: vec![FabricConfig {
                name: "Lab-Fabric".into(),
                apic: "192.168.100.50".into(),
                username: Some("admin".into()),
                verify_tls: false,
                timeout_secs: default_timeout_secs(),
            }],
            ..Self::default()
        }
    }

    /// Fabric by name, ignoring case
    pub fn fabric(&self, name: &str) -> Option<&FabricConfig> {
        self.fabrics.iter().find(|f| f.name.eq_ignore_ascii_case(name))
    }
}
