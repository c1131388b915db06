//! ACI Contract Graph
//!
//! Read-only APIC REST client and the traversal that rebuilds the
//! provider/consumer graph of every contract in a fabric.
//!
//! ## Features
//!
//! - **Session**: single login, cookie-authenticated object reads
//! - **Analyzer**: tenants, contracts, relationships and EPG detail
//! - **Models**: `imdata` envelope decoding and the normalized object graph
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────────┐
//! │                        ContractAnalyzer                          │
//! │   tenants ──► contracts ──► relationships ──► EPG ──► subnets    │
//! │                              │                                   │
//! │                      ┌───────▼────────┐      ┌───────────────┐   │
//! │                      │  ObjectSource  │◄─────│  ApicSession  │   │
//! │                      └────────────────┘      └───────┬───────┘   │
//! └──────────────────────────────────────────────────────┼───────────┘
//!                                                        ▼
//!                                                 APIC REST API
//! ```

pub mod analyzer;
pub mod models;
pub mod query;
pub mod session;

pub use analyzer::ContractAnalyzer;
pub use models::{
    Contract, Epg, EpgKind, ImData, ManagedObject, Relationships, Role, Subnet, SubnetScope,
    Tenant, Vrf,
};
pub use session::{ApicSession, ObjectSource, SessionConfig};

use thiserror::Error;

/// ACI client errors
#[derive(Error, Debug)]
pub enum AciError {
    #[error("Authentication failed: {0}")]
    Auth(String),

    #[error("APIC API error: {0}")]
    Api(String),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
}

pub type Result<T> = std::result::Result<T, AciError>;
