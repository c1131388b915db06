//! APIC Models
//!
//! The `imdata` response envelope and the normalized contract graph
//! built from it.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::HashMap;
use tracing::warn;

/// Path segment that marks an L3Out external EPG (`uni/tn-x/out-y/instP-z`)
pub const EXTERNAL_MARKER: &str = "/out-";

/// Scope flag that marks an external subnet as exported
pub const EXPORT_SCOPE: &str = "export-rtctrl";

// ==========================================
// Wire envelope
// ==========================================

/// Response envelope returned by every APIC read
#[derive(Debug, Clone, Default)]
pub struct ImData {
    pub imdata: Vec<ManagedObject>,
}

impl ImData {
    /// Decode an envelope item by item. A missing `imdata` is empty; a
    /// malformed item is skipped without touching its siblings.
    pub fn from_value(value: Value) -> Self {
        let items = match value {
            Value::Object(mut envelope) => match envelope.remove("imdata") {
                Some(Value::Array(items)) => items,
                None | Some(Value::Null) => Vec::new(),
                Some(other) => {
                    warn!("Discarding non-list imdata: {}", other);
                    Vec::new()
                }
            },
            other => {
                warn!("Discarding malformed imdata envelope: {}", other);
                Vec::new()
            }
        };

        let imdata = items
            .into_iter()
            .filter_map(|item| match serde_json::from_value::<ManagedObject>(item) {
                Ok(mo) => Some(mo),
                Err(e) => {
                    warn!("Skipping malformed imdata item: {}", e);
                    None
                }
            })
            .collect();

        Self { imdata }
    }

    pub fn is_empty(&self) -> bool {
        self.imdata.is_empty()
    }

    /// Attributes of every object of `class`, in API order
    pub fn of_class<'a, 'c: 'a>(&'a self, class: &'c str) -> impl Iterator<Item = &'a Attributes> + 'a {
        self.imdata.iter().filter_map(move |mo| mo.attributes_of(class))
    }

    /// Attributes of the first object of `class`
    pub fn first_of(&self, class: &str) -> Option<&Attributes> {
        self.imdata.iter().find_map(|mo| mo.attributes_of(class))
    }
}

/// A single `{ "<class>": { "attributes": { .. } } }` entry
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(transparent)]
pub struct ManagedObject(HashMap<String, ObjectBody>);

impl ManagedObject {
    /// Class name of the object
    pub fn class(&self) -> Option<&str> {
        self.0.keys().next().map(String::as_str)
    }

    pub fn attributes_of(&self, class: &str) -> Option<&Attributes> {
        self.0.get(class).map(|body| &body.attributes)
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
struct ObjectBody {
    #[serde(default)]
    attributes: Attributes,
}

/// Object attributes; only string values are visible
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(transparent)]
pub struct Attributes(Map<String, Value>);

impl Attributes {
    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).and_then(Value::as_str)
    }

    /// Attribute value, or empty when absent
    pub fn get_or_empty(&self, key: &str) -> String {
        self.get(key).unwrap_or_default().to_string()
    }

    /// `name` and `dn` pair shared by tenants, VRFs and contracts
    fn named(&self) -> Option<(String, String)> {
        Some((self.get("name")?.to_string(), self.get("dn")?.to_string()))
    }
}

// ==========================================
// Contract graph
// ==========================================

/// Tenant with its VRFs
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Tenant {
    pub name: String,
    pub dn: String,
    pub vrfs: Vec<Vrf>,
}

impl Tenant {
    pub fn from_attributes(attrs: &Attributes) -> Option<Self> {
        let (name, dn) = attrs.named()?;
        Some(Self { name, dn, vrfs: Vec::new() })
    }
}

/// VRF (fvCtx)
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Vrf {
    pub name: String,
    pub dn: String,
}

impl Vrf {
    pub fn from_attributes(attrs: &Attributes) -> Option<Self> {
        let (name, dn) = attrs.named()?;
        Some(Self { name, dn })
    }
}

/// Contract (vzBrCP)
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Contract {
    pub name: String,
    pub dn: String,
}

impl Contract {
    pub fn from_attributes(attrs: &Attributes) -> Option<Self> {
        let (name, dn) = attrs.named()?;
        Some(Self { name, dn })
    }
}

/// EPG variant
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum EpgKind {
    /// Application EPG (fvAEPg), subnets come from its bridge domain
    Internal,
    /// L3Out external EPG (l3extInstP), subnets are its own children
    External,
}

impl EpgKind {
    pub fn from_dn(dn: &str) -> Self {
        if dn.contains(EXTERNAL_MARKER) {
            EpgKind::External
        } else {
            EpgKind::Internal
        }
    }

    /// Managed-object class holding the EPG's own attributes
    pub fn class(&self) -> &'static str {
        match self {
            EpgKind::Internal => crate::query::EPG,
            EpgKind::External => crate::query::EXTERNAL_EPG,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            EpgKind::Internal => "EPG",
            EpgKind::External => "Ext-EPG",
        }
    }
}

/// Endpoint group reached through a contract
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Epg {
    pub name: String,
    #[serde(rename = "type")]
    pub kind: EpgKind,
    pub dn: String,
    pub subnets: Vec<Subnet>,
}

impl Epg {
    pub fn is_external(&self) -> bool {
        self.kind == EpgKind::External
    }
}

/// External subnet classification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SubnetScope {
    Exported,
    External,
}

impl SubnetScope {
    pub fn from_scope(scope: &str) -> Self {
        if scope.contains(EXPORT_SCOPE) {
            SubnetScope::Exported
        } else {
            SubnetScope::External
        }
    }

    pub fn short(&self) -> &'static str {
        match self {
            SubnetScope::Exported => "exp",
            SubnetScope::External => "ext",
        }
    }
}

/// Subnet of an EPG
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Subnet {
    pub ip: String,
    pub description: String,
    /// Only set for external EPG subnets
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scope: Option<SubnetScope>,
}

impl Subnet {
    /// Bridge-domain subnet (fvSubnet); description comes from `descr`
    pub fn internal(attrs: &Attributes) -> Option<Self> {
        Some(Self {
            ip: attrs.get("ip")?.to_string(),
            description: attrs.get_or_empty("descr"),
            scope: None,
        })
    }

    /// L3Out subnet (l3extSubnet); description comes from `name`
    pub fn external(attrs: &Attributes) -> Option<Self> {
        Some(Self {
            ip: attrs.get("ip")?.to_string(),
            description: attrs.get_or_empty("name"),
            scope: Some(SubnetScope::from_scope(attrs.get("scope").unwrap_or_default())),
        })
    }
}

/// Side of a contract an EPG is bound on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Provider,
    Consumer,
}

impl Role {
    /// Relation class the APIC reports this role under
    pub fn relation_class(&self) -> &'static str {
        match self {
            Role::Provider => crate::query::PROVIDER_RELATION,
            Role::Consumer => crate::query::CONSUMER_RELATION,
        }
    }

    pub fn from_class(class: &str) -> Option<Self> {
        match class {
            crate::query::PROVIDER_RELATION => Some(Role::Provider),
            crate::query::CONSUMER_RELATION => Some(Role::Consumer),
            _ => None,
        }
    }
}

/// Resolved provider and consumer EPGs of one contract
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Relationships {
    pub providers: Vec<Epg>,
    pub consumers: Vec<Epg>,
}

impl Relationships {
    pub fn is_empty(&self) -> bool {
        self.providers.is_empty() && self.consumers.is_empty()
    }

    pub fn push(&mut self, role: Role, epg: Epg) {
        match role {
            Role::Provider => self.providers.push(epg),
            Role::Consumer => self.consumers.push(epg),
        }
    }

    /// Drop external EPGs from both sides
    pub fn without_external(mut self) -> Self {
        self.providers.retain(|epg| !epg.is_external());
        self.consumers.retain(|epg| !epg.is_external());
        self
    }
}
