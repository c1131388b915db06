//! In-memory APIC used by the command tests
//!
//! Tenants: `T1` (contract `C1`: internal `EPG-A` provides, external
//! `EPG-B` consumes), `quiet` (contracts `C2`, `C3` with no bindings),
//! `empty` (no contracts) and the excluded `infra`.

use aci_contracts::{query, ContractAnalyzer, ImData, ObjectSource};
use async_trait::async_trait;
use serde_json::{json, Map, Value};
use std::collections::HashMap;

#[derive(Default)]
pub struct FakeApic {
    responses: HashMap<String, Value>,
}

impl FakeApic {
    pub fn with(mut self, path: String, body: Value) -> Self {
        self.responses.insert(path, body);
        self
    }
}

#[async_trait]
impl ObjectSource for FakeApic {
    async fn fetch(&self, path: &str) -> Option<ImData> {
        self.responses.get(path).cloned().map(ImData::from_value)
    }
}

pub fn mo(class: &str, attributes: Value) -> Value {
    let mut object = Map::new();
    object.insert(class.to_string(), json!({ "attributes": attributes }));
    Value::Object(object)
}

pub fn imdata(items: Vec<Value>) -> Value {
    json!({ "imdata": items })
}

fn named(class: &str, name: &str, dn: &str) -> Value {
    mo(class, json!({ "name": name, "dn": dn }))
}

pub fn fabric() -> FakeApic {
    let epg_a = "uni/tn-T1/ap-app/epg-EPG-A";
    let epg_b = "uni/tn-T1/out-WAN/instP-EPG-B";
    let relations = [query::PROVIDER_RELATION, query::CONSUMER_RELATION];

    FakeApic::default()
        .with(
            query::class(query::TENANT),
            imdata(vec![
                named(query::TENANT, "quiet", "uni/tn-quiet"),
                named(query::TENANT, "infra", "uni/tn-infra"),
                named(query::TENANT, "T1", "uni/tn-T1"),
                named(query::TENANT, "empty", "uni/tn-empty"),
            ]),
        )
        .with(
            query::children("uni/tn-T1", &[query::VRF]),
            imdata(vec![named(query::VRF, "prod", "uni/tn-T1/ctx-prod")]),
        )
        .with(
            query::children("uni/tn-T1", &[query::CONTRACT]),
            imdata(vec![named(query::CONTRACT, "C1", "uni/tn-T1/brc-C1")]),
        )
        .with(
            query::children("uni/tn-quiet", &[query::CONTRACT]),
            imdata(vec![
                named(query::CONTRACT, "C3", "uni/tn-quiet/brc-C3"),
                named(query::CONTRACT, "C2", "uni/tn-quiet/brc-C2"),
            ]),
        )
        .with(
            query::children("uni/tn-quiet/brc-C2", &relations),
            imdata(vec![]),
        )
        .with(
            query::children("uni/tn-T1/brc-C1", &relations),
            imdata(vec![
                mo(query::PROVIDER_RELATION, json!({ "tDn": epg_a })),
                mo(query::CONSUMER_RELATION, json!({ "tDn": epg_b })),
            ]),
        )
        .with(query::object(epg_a), imdata(vec![named(query::EPG, "EPG-A", epg_a)]))
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
        .with(query::object(epg_b), imdata(vec![named(query::EXTERNAL_EPG, "EPG-B", epg_b)]))
        .with(
            query::children(epg_b, &[query::EXTERNAL_SUBNET]),
            imdata(vec![mo(
                query::EXTERNAL_SUBNET,
                json!({ "ip": "20.0.0.0/24", "scope": "export-rtctrl", "name": "partner" }),
            )]),
        )
}

pub fn analyzer() -> ContractAnalyzer<FakeApic> {
    ContractAnalyzer::new(fabric(), ["infra", "mgmt", "common"])
}
