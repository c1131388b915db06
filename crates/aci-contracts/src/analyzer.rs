//! Contract Analyzer
//!
//! Rebuilds the contract graph from dependent APIC reads:
//!
//! ```text
//! tenant ──► VRFs
//!   └──► contracts ──► vzRtProv / vzRtCons ──► EPG
//!                                               ├─ internal: fvRsBd ──► BD ──► fvSubnet
//!                                               └─ external: l3extSubnet
//! ```
//!
//! Every step awaits one read before issuing the next. A read that yields
//! no data shrinks the result (empty list, dropped EPG) and never aborts
//! the surrounding traversal.

use crate::models::{Contract, Epg, EpgKind, Relationships, Role, Subnet, Tenant, Vrf};
use crate::query;
use crate::session::ObjectSource;
use std::collections::BTreeSet;
use tracing::debug;

/// Read-only traversal over an [`ObjectSource`]
pub struct ContractAnalyzer<S> {
    source: S,
    excluded: BTreeSet<String>,
}

impl<S: ObjectSource> ContractAnalyzer<S> {
    pub fn new<I, T>(source: S, excluded_tenants: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<String>,
    {
        Self {
            source,
            excluded: excluded_tenants.into_iter().map(Into::into).collect(),
        }
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    pub fn is_excluded(&self, tenant: &str) -> bool {
        self.excluded.contains(tenant)
    }

    /// Non-excluded tenants with their VRFs, sorted by name
    pub async fn tenants(&self) -> Vec<Tenant> {
        let Some(data) = self.source.fetch(&query::class(query::TENANT)).await else {
            return Vec::new();
        };

        let mut tenants = Vec::new();
        for attrs in data.of_class(query::TENANT) {
            let Some(mut tenant) = Tenant::from_attributes(attrs) else {
                continue;
            };
            if self.is_excluded(&tenant.name) {
                debug!("Skipping excluded tenant {}", tenant.name);
                continue;
            }
            tenant.vrfs = self.tenant_vrfs(&tenant.dn).await;
            tenants.push(tenant);
        }

        tenants.sort_by(|a, b| a.name.cmp(&b.name));
        tenants
    }

    async fn tenant_vrfs(&self, tenant_dn: &str) -> Vec<Vrf> {
        let Some(data) = self.source.fetch(&query::children(tenant_dn, &[query::VRF])).await else {
            return Vec::new();
        };

        data.of_class(query::VRF).filter_map(Vrf::from_attributes).collect()
    }

    /// Contracts directly under a tenant, in API order
    pub async fn contracts(&self, tenant_dn: &str) -> Vec<Contract> {
        let Some(data) = self
            .source
            .fetch(&query::children(tenant_dn, &[query::CONTRACT]))
            .await
        else {
            return Vec::new();
        };

        data.of_class(query::CONTRACT)
            .filter_map(Contract::from_attributes)
            .collect()
    }

    /// Provider and consumer EPGs bound to a contract
    pub async fn relationships(&self, contract_dn: &str) -> Relationships {
        let mut relationships = Relationships::default();

        let path = query::children(
            contract_dn,
            &[
                Role::Provider.relation_class(),
                Role::Consumer.relation_class(),
            ],
        );
        let Some(data) = self.source.fetch(&path).await else {
            return relationships;
        };

        for mo in &data.imdata {
            let Some((role, class)) = mo
                .class()
                .and_then(|class| Role::from_class(class).map(|role| (role, class)))
            else {
                continue;
            };
            let Some(target) = mo.attributes_of(class).and_then(|attrs| attrs.get("tDn")) else {
                continue;
            };

            match self.epg(target).await {
                Some(epg) => relationships.push(role, epg),
                None => debug!("Dropping unresolved {:?} {}", role, target),
            }
        }

        relationships
    }

    /// Full EPG detail for a relation target; `None` when the EPG itself
    /// cannot be read
    pub async fn epg(&self, dn: &str) -> Option<Epg> {
        let kind = EpgKind::from_dn(dn);

        let data = self.source.fetch(&query::object(dn)).await?;
        let name = data.first_of(kind.class())?.get("name")?.to_string();

        let subnets = match kind {
            EpgKind::Internal => self.bridge_domain_subnets(dn).await,
            EpgKind::External => self.external_subnets(dn).await,
        };

        Some(Epg {
            name,
            kind,
            dn: dn.to_string(),
            subnets,
        })
    }

    async fn bridge_domain_subnets(&self, epg_dn: &str) -> Vec<Subnet> {
        let bd_dn = match self
            .source
            .fetch(&query::children(epg_dn, &[query::BRIDGE_DOMAIN_RELATION]))
            .await
        {
            Some(data) => data
                .first_of(query::BRIDGE_DOMAIN_RELATION)
                .and_then(|attrs| attrs.get("tDn"))
                .map(String::from),
            None => None,
        };
        let Some(bd_dn) = bd_dn else {
            return Vec::new();
        };

        let Some(data) = self
            .source
            .fetch(&query::children(&bd_dn, &[query::BRIDGE_DOMAIN_SUBNET]))
            .await
        else {
            return Vec::new();
        };

        data.of_class(query::BRIDGE_DOMAIN_SUBNET)
            .filter_map(Subnet::internal)
            .collect()
    }

    async fn external_subnets(&self, epg_dn: &str) -> Vec<Subnet> {
        let Some(data) = self
            .source
            .fetch(&query::children(epg_dn, &[query::EXTERNAL_SUBNET]))
            .await
        else {
            return Vec::new();
        };

        data.of_class(query::EXTERNAL_SUBNET)
            .filter_map(Subnet::external)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ImData, SubnetScope};
    use async_trait::async_trait;
    use serde_json::{json, Value};
    use std::collections::HashMap;
    use std::sync::Mutex;

    /// Canned responses keyed by object path; unknown paths yield no data
    #[derive(Default)]
    struct FakeApic {
        responses: HashMap<String, Value>,
        calls: Mutex<Vec<String>>,
    }

    impl FakeApic {
        fn with(mut self, path: String, body: Value) -> Self {
            self.responses.insert(path, body);
            self
        }

        fn calls(&self) -> Vec<String> {
            self.calls.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl ObjectSource for FakeApic {
        async fn fetch(&self, path: &str) -> Option<ImData> {
            self.calls.lock().unwrap().push(path.to_string());
            self.responses.get(path).cloned().map(ImData::from_value)
        }
    }

    fn mo(class: &str, attributes: Value) -> Value {
        let mut object = serde_json::Map::new();
        object.insert(class.to_string(), json!({ "attributes": attributes }));
        Value::Object(object)
    }

    fn imdata(items: Vec<Value>) -> Value {
        json!({ "totalCount": items.len().to_string(), "imdata": items })
    }

    fn tenant_list(names: &[&str]) -> FakeApic {
        let items = names
            .iter()
            .map(|n| mo(query::TENANT, json!({ "name": n, "dn": format!("uni/tn-{}", n) })))
            .collect();
        FakeApic::default().with(query::class(query::TENANT), imdata(items))
    }

    /// Fabric from the provider/consumer walkthrough: T1 / C1 / EPG-A / EPG-B
    fn scenario() -> FakeApic {
        let contract = "uni/tn-T1/brc-C1";
        let epg_a = "uni/tn-T1/ap-app/epg-EPG-A";
        let epg_b = "uni/tn-T1/out-WAN/instP-EPG-B";

        tenant_list(&["T1"])
            .with(
                query::children("uni/tn-T1", &[query::CONTRACT]),
                imdata(vec![mo(query::CONTRACT, json!({ "name": "C1", "dn": contract }))]),
            )
            .with(
                query::children(contract, &[query::PROVIDER_RELATION, query::CONSUMER_RELATION]),
                imdata(vec![
                    mo(query::PROVIDER_RELATION, json!({ "tDn": epg_a })),
                    mo(query::CONSUMER_RELATION, json!({ "tDn": epg_b })),
                ]),
            )
            .with(
                query::object(epg_a),
                imdata(vec![mo(query::EPG, json!({ "name": "EPG-A", "dn": epg_a }))]),
            )
            .with(
                query::children(epg_a, &[query::BRIDGE_DOMAIN_RELATION]),
                imdata(vec![mo(query::BRIDGE_DOMAIN_RELATION, json!({ "tDn": "uni/tn-T1/BD-BD1" }))]),
            )
            .with(
                query::children("uni/tn-T1/BD-BD1", &[query::BRIDGE_DOMAIN_SUBNET]),
                imdata(vec![mo(
                    query::BRIDGE_DOMAIN_SUBNET,
                    json!({ "ip": "10.0.0.0/24", "descr": "servers" }),
                )]),
            )
            .with(
                query::object(epg_b),
                imdata(vec![mo(query::EXTERNAL_EPG, json!({ "name": "EPG-B", "dn": epg_b }))]),
            )
            .with(
                query::children(epg_b, &[query::EXTERNAL_SUBNET]),
                imdata(vec![mo(
                    query::EXTERNAL_SUBNET,
                    json!({ "ip": "20.0.0.0/24", "scope": "export-rtctrl", "name": "partner", "descr": "" }),
                )]),
            )
    }

    #[tokio::test]
    async fn test_tenants_are_filtered_and_sorted() {
        let apic = tenant_list(&["zeta", "infra", "alpha", "common", "mgmt", "T1"]).with(
            query::children("uni/tn-alpha", &[query::VRF]),
            imdata(vec![
                mo(query::VRF, json!({ "name": "prod", "dn": "uni/tn-alpha/ctx-prod" })),
                mo(query::VRF, json!({ "name": "dev", "dn": "uni/tn-alpha/ctx-dev" })),
            ]),
        );
        let analyzer = ContractAnalyzer::new(apic, ["mgmt", "infra", "common"]);

        let tenants = analyzer.tenants().await;
        let names: Vec<_> = tenants.iter().map(|t| t.name.as_str()).collect();
        assert_eq!(names, vec!["T1", "alpha", "zeta"]);

        // VRFs keep API order; a tenant without VRFs still appears
        let vrfs: Vec<_> = tenants[1].vrfs.iter().map(|v| v.name.as_str()).collect();
        assert_eq!(vrfs, vec!["prod", "dev"]);
        assert!(tenants[2].vrfs.is_empty());

        // Excluded tenants are never expanded
        assert!(!analyzer.source().calls().iter().any(|p| p.contains("tn-infra")));
    }

    #[tokio::test]
    async fn test_tenants_is_repeatable() {
        let analyzer = ContractAnalyzer::new(tenant_list(&["b", "a", "c"]), ["infra"]);
        assert_eq!(analyzer.tenants().await, analyzer.tenants().await);
    }

    #[tokio::test]
    async fn test_no_tenant_data_is_empty() {
        let analyzer = ContractAnalyzer::new(FakeApic::default(), Vec::<String>::new());
        assert!(analyzer.tenants().await.is_empty());
        assert!(analyzer.contracts("uni/tn-T1").await.is_empty());
        assert!(analyzer.relationships("uni/tn-T1/brc-C1").await.is_empty());
    }

    #[tokio::test]
    async fn test_contracts_keep_api_order() {
        let apic = FakeApic::default().with(
            query::children("uni/tn-T1", &[query::CONTRACT]),
            imdata(vec![
                mo(query::CONTRACT, json!({ "name": "web", "dn": "uni/tn-T1/brc-web" })),
                mo(query::CONTRACT, json!({ "name": "app", "dn": "uni/tn-T1/brc-app" })),
                mo(query::CONTRACT, json!({ "dn": "uni/tn-T1/brc-nameless" })),
            ]),
        );
        let analyzer = ContractAnalyzer::new(apic, Vec::<String>::new());

        let names: Vec<_> = analyzer
            .contracts("uni/tn-T1")
            .await
            .into_iter()
            .map(|c| c.name)
            .collect();
        assert_eq!(names, vec!["web", "app"]);
    }

    #[tokio::test]
    async fn test_provider_consumer_scenario() {
        let analyzer = ContractAnalyzer::new(scenario(), ["infra"]);

        let tenants = analyzer.tenants().await;
        assert_eq!(tenants.len(), 1);
        let contracts = analyzer.contracts(&tenants[0].dn).await;
        assert_eq!(contracts[0].name, "C1");

        let relationships = analyzer.relationships(&contracts[0].dn).await;
        assert_eq!(
            relationships.providers,
            vec![Epg {
                name: "EPG-A".into(),
                kind: EpgKind::Internal,
                dn: "uni/tn-T1/ap-app/epg-EPG-A".into(),
                subnets: vec![Subnet {
                    ip: "10.0.0.0/24".into(),
                    description: "servers".into(),
                    scope: None,
                }],
            }]
        );
        assert_eq!(
            relationships.consumers,
            vec![Epg {
                name: "EPG-B".into(),
                kind: EpgKind::External,
                dn: "uni/tn-T1/out-WAN/instP-EPG-B".into(),
                subnets: vec![Subnet {
                    ip: "20.0.0.0/24".into(),
                    description: "partner".into(),
                    scope: Some(SubnetScope::Exported),
                }],
            }]
        );
    }

    #[tokio::test]
    async fn test_internal_epg_reads_exactly_one_bridge_domain() {
        let analyzer = ContractAnalyzer::new(scenario(), Vec::<String>::new());

        analyzer.epg("uni/tn-T1/ap-app/epg-EPG-A").await.unwrap();

        let calls = analyzer.source().calls();
        let bd_lookups = calls
            .iter()
            .filter(|p| p.contains(query::BRIDGE_DOMAIN_RELATION))
            .count();
        assert_eq!(bd_lookups, 1);
        assert!(calls.iter().any(|p| p.contains("BD-BD1") && p.contains(query::BRIDGE_DOMAIN_SUBNET)));
        assert!(!calls.iter().any(|p| p.contains(query::EXTERNAL_SUBNET)));
    }

    #[tokio::test]
    async fn test_external_epg_skips_bridge_domain() {
        let analyzer = ContractAnalyzer::new(scenario(), Vec::<String>::new());

        let epg = analyzer.epg("uni/tn-T1/out-WAN/instP-EPG-B").await.unwrap();
        assert!(epg.is_external());

        let calls = analyzer.source().calls();
        assert!(!calls.iter().any(|p| p.contains(query::BRIDGE_DOMAIN_RELATION)));
    }

    #[tokio::test]
    async fn test_unreadable_epg_is_none() {
        let analyzer = ContractAnalyzer::new(FakeApic::default(), Vec::<String>::new());
        assert!(analyzer.epg("uni/tn-T1/ap-app/epg-gone").await.is_none());

        // Object exists but under an unexpected class
        let apic = FakeApic::default().with(
            query::object("uni/tn-T1/ap-app/epg-odd"),
            imdata(vec![mo(query::EXTERNAL_EPG, json!({ "name": "odd" }))]),
        );
        let analyzer = ContractAnalyzer::new(apic, Vec::<String>::new());
        assert!(analyzer.epg("uni/tn-T1/ap-app/epg-odd").await.is_none());
    }

    #[tokio::test]
    async fn test_missing_bridge_domain_gives_no_subnets() {
        let dn = "uni/tn-T1/ap-app/epg-lonely";
        let apic = FakeApic::default().with(
            query::object(dn),
            imdata(vec![mo(query::EPG, json!({ "name": "lonely", "dn": dn }))]),
        );
        let analyzer = ContractAnalyzer::new(apic, Vec::<String>::new());

        let epg = analyzer.epg(dn).await.unwrap();
        assert_eq!(epg.name, "lonely");
        assert!(epg.subnets.is_empty());
    }

    #[tokio::test]
    async fn test_unresolved_target_is_dropped_alone() {
        let contract = "uni/tn-T1/brc-C1";
        let apic = scenario().with(
            query::children(contract, &[query::PROVIDER_RELATION, query::CONSUMER_RELATION]),
            imdata(vec![
                mo(query::PROVIDER_RELATION, json!({ "tDn": "uni/tn-T1/ap-app/epg-gone" })),
                mo(query::PROVIDER_RELATION, json!({ "tDn": "uni/tn-T1/ap-app/epg-EPG-A" })),
                mo(query::CONSUMER_RELATION, json!({ "tDn": "uni/tn-T1/out-WAN/instP-gone" })),
                mo(query::CONSUMER_RELATION, json!({ "tDn": "uni/tn-T1/out-WAN/instP-EPG-B" })),
                mo(query::CONSUMER_RELATION, json!({})),
            ]),
        );
        let analyzer = ContractAnalyzer::new(apic, Vec::<String>::new());

        let relationships = analyzer.relationships(contract).await;
        let providers: Vec<_> = relationships.providers.iter().map(|e| e.name.as_str()).collect();
        let consumers: Vec<_> = relationships.consumers.iter().map(|e| e.name.as_str()).collect();
        assert_eq!(providers, vec!["EPG-A"]);
        assert_eq!(consumers, vec!["EPG-B"]);
    }

    #[tokio::test]
    async fn test_malformed_relation_is_dropped_alone() {
        let contract = "uni/tn-T1/brc-C1";
        let apic = scenario().with(
            query::children(contract, &[query::PROVIDER_RELATION, query::CONSUMER_RELATION]),
            imdata(vec![
                mo(query::PROVIDER_RELATION, json!({ "tDn": "uni/tn-T1/ap-app/epg-EPG-A" })),
                json!({ "vzRtCons": { "attributes": null } }),
                mo(query::CONSUMER_RELATION, json!({ "tDn": "uni/tn-T1/out-WAN/instP-EPG-B" })),
            ]),
        );
        let analyzer = ContractAnalyzer::new(apic, Vec::<String>::new());

        let relationships = analyzer.relationships(contract).await;
        assert_eq!(relationships.providers.len(), 1);
        assert_eq!(relationships.providers[0].name, "EPG-A");
        assert_eq!(relationships.consumers.len(), 1);
        assert_eq!(relationships.consumers[0].name, "EPG-B");
    }

    #[tokio::test]
    async fn test_relation_order_is_preserved() {
        let contract = "uni/tn-T1/brc-C1";
        let mut apic = FakeApic::default().with(
            query::children(contract, &[query::PROVIDER_RELATION, query::CONSUMER_RELATION]),
            imdata(
                ["z", "a", "m"]
                    .iter()
                    .map(|n| mo(query::PROVIDER_RELATION, json!({ "tDn": format!("uni/tn-T1/ap-x/epg-{}", n) })))
                    .collect(),
            ),
        );
        for n in ["z", "a", "m"] {
            let dn = format!("uni/tn-T1/ap-x/epg-{}", n);
            apic = apic.with(query::object(&dn), imdata(vec![mo(query::EPG, json!({ "name": n }))]));
        }
        let analyzer = ContractAnalyzer::new(apic, Vec::<String>::new());

        let names: Vec<_> = analyzer
            .relationships(contract)
            .await
            .providers
            .into_iter()
            .map(|e| e.name)
            .collect();
        assert_eq!(names, vec!["z", "a", "m"]);
    }
}
