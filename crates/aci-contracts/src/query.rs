//! APIC object paths
//!
//! Class names and the `/node/...` paths used by the traversal. All
//! paths are relative to `<base>/api`.

pub const TENANT: &str = "fvTenant";
pub const VRF: &str = "fvCtx";
pub const CONTRACT: &str = "vzBrCP";
pub const PROVIDER_RELATION: &str = "vzRtProv";
pub const CONSUMER_RELATION: &str = "vzRtCons";
pub const EPG: &str = "fvAEPg";
pub const EXTERNAL_EPG: &str = "l3extInstP";
pub const BRIDGE_DOMAIN_RELATION: &str = "fvRsBd";
pub const BRIDGE_DOMAIN_SUBNET: &str = "fvSubnet";
pub const EXTERNAL_SUBNET: &str = "l3extSubnet";

/// Every object of a class, fabric-wide
pub fn class(class: &str) -> String {
    format!("/node/class/{}.json", class)
}

/// A single managed object
pub fn object(dn: &str) -> String {
    format!("/node/mo/{}.json", dn)
}

/// Direct children of `dn` restricted to `classes`
pub fn children(dn: &str, classes: &[&str]) -> String {
    format!(
        "/node/mo/{}.json?query-target=children&target-subtree-class={}",
        dn,
        classes.join(",")
    )
}
