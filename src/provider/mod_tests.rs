// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Unit tests for the provider facade.

#[cfg(test)]
mod tests {
    use crate::config::ProviderConfig;
    use crate::provider::InfobloxProvider;
    use crate::record_types::RecordType;
    use crate::records::{CanonicalRecord, Change, RecordValue, Zone};
    use crate::store::memory::{MemoryStore, StoreCall};
    use crate::wapi::types::{Fields, PageRequest};
    use serde_json::{json, Value};
    use std::collections::BTreeMap;

    fn config() -> ProviderConfig {
        ProviderConfig::new("grid.example.com", "admin")
    }

    fn unit_tests_store() -> MemoryStore {
        MemoryStore::new()
            .with_zone("unit.tests", 28800)
            .with_entity(
                RecordType::A,
                json!({"name": "xyz.unit.tests", "ipv4addr": "192.168.0.1", "use_ttl": false, "ttl": 0}),
            )
            .with_entity(
                RecordType::A,
                json!({"name": "www.unit.tests", "ipv4addr": "192.168.0.2", "use_ttl": false, "ttl": 0}),
            )
            .with_entity(
                RecordType::Cname,
                json!({"name": "cname.unit.tests", "canonical": "example.unit.tests", "use_ttl": false, "ttl": 0}),
            )
    }

    async fn provider(store: MemoryStore) -> InfobloxProvider<MemoryStore> {
        InfobloxProvider::initialize("infoblox", config(), store)
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn test_initialize_negotiates_version() {
        let provider = provider(MemoryStore::new()).await;
        assert_eq!(provider.capabilities().api_version, "2.12");
        assert_eq!(provider.store().api_version, "2.12");
        assert_eq!(provider.capabilities().record_types.len(), RecordType::ALL.len());
        assert_eq!(provider.id(), "infoblox");
    }

    #[tokio::test]
    async fn test_initialize_rejects_invalid_config() {
        let mut config = config();
        config.alias_types.clear();
        let result = InfobloxProvider::initialize("infoblox", config, MemoryStore::new()).await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_populate_unit_tests_zone() {
        let provider = provider(unit_tests_store()).await;
        let mut zone = Zone::new("unit.tests.");

        let exists = provider.populate(&mut zone, false, false).await.unwrap();

        assert!(exists);
        assert_eq!(zone.records().len(), 3);
        assert!(zone.records().iter().all(|r| r.ttl == 28800));
        assert_eq!(
            zone.find("xyz", RecordType::A).unwrap().values,
            vec![RecordValue::from("192.168.0.1")]
        );
        assert_eq!(
            zone.find("www", RecordType::A).unwrap().values,
            vec![RecordValue::from("192.168.0.2")]
        );
        assert_eq!(
            zone.find("cname", RecordType::Cname).unwrap().value(),
            Some(&RecordValue::from("example.unit.tests."))
        );
    }

    #[tokio::test]
    async fn test_populate_absent_zone() {
        let provider = provider(MemoryStore::new()).await;
        let mut zone = Zone::new("absent.tests.");

        assert!(!provider.populate(&mut zone, true, false).await.unwrap());
        assert!(zone.records().is_empty());
        assert!(provider.store().page_requests.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_populate_reads_only_supported_types() {
        let mut store = unit_tests_store();
        store.schema.supported_objects = vec!["record:a".to_string(), "record:txt".to_string()];
        let provider = provider(store).await;
        let mut zone = Zone::new("unit.tests.");

        provider.populate(&mut zone, false, false).await.unwrap();

        assert_eq!(zone.records().len(), 2);
        let requested: Vec<RecordType> = provider
            .store()
            .page_requests
            .lock()
            .unwrap()
            .iter()
            .map(|(t, request)| {
                assert!(matches!(request, PageRequest::First { zone, .. } if zone == "unit.tests"));
                *t
            })
            .collect();
        assert_eq!(requested, vec![RecordType::A, RecordType::Txt]);
    }

    #[tokio::test]
    async fn test_populate_reports_alias_desync_only_for_target() {
        let store = MemoryStore::new().with_zone("unit.tests", 3600).with_entity(
            RecordType::Alias,
            json!({"name": "unit.tests", "target_name": "lb.example.com", "target_type": "A"}),
        );
        let provider = provider(store).await;

        let mut current = Zone::new("unit.tests.");
        provider.populate(&mut current, true, false).await.unwrap();
        assert!(current.find("", RecordType::Alias).unwrap().is_desynchronized());

        let mut desired = Zone::new("unit.tests.");
        provider.populate(&mut desired, false, false).await.unwrap();
        assert!(!desired.find("", RecordType::Alias).unwrap().is_desynchronized());
    }

    #[tokio::test]
    async fn test_apply_rejects_unsupported_type_before_writing() {
        let mut store = MemoryStore::new().with_zone("unit.tests", 3600);
        store.schema.supported_objects = vec!["record:a".to_string()];
        let provider = provider(store).await;

        let changes = vec![
            Change::Create {
                new: CanonicalRecord::new("www", RecordType::A, 300, vec![RecordValue::from("10.0.0.1")]),
            },
            Change::Create {
                new: CanonicalRecord::new("", RecordType::Alias, 300, vec![RecordValue::from("lb.example.com.")]),
            },
        ];
        let err = provider.apply("unit.tests.", &changes).await.unwrap_err();

        assert_eq!(err.reason(), "UnsupportedType");
        assert!(provider.store().calls().is_empty());
    }

    #[tokio::test]
    async fn test_apply_to_missing_zone() {
        let provider = provider(MemoryStore::new()).await;
        let changes = vec![Change::Create {
            new: CanonicalRecord::new("www", RecordType::A, 300, vec![RecordValue::from("10.0.0.1")]),
        }];

        let err = provider.apply("absent.tests.", &changes).await.unwrap_err();
        assert_eq!(err.reason(), "ZoneNotFound");
    }

    #[tokio::test]
    async fn test_apply_creates_zone_then_records() {
        let mut config = config();
        config.create_zones = true;
        let provider = InfobloxProvider::initialize("infoblox", config, MemoryStore::new())
            .await
            .unwrap();
        let changes = vec![Change::Create {
            new: CanonicalRecord::new("www", RecordType::A, 28800, vec![RecordValue::from("10.0.0.1")]),
        }];

        let applied = provider.apply("new.tests.", &changes).await.unwrap();

        assert_eq!(applied, 1);
        let calls = provider.store().calls();
        assert!(matches!(calls[0], StoreCall::CreateZone(_)));
        match &calls[1] {
            StoreCall::Create(RecordType::A, body) => {
                assert_eq!(body.get("name"), Some(&json!("www.new.tests")));
                assert_eq!(body.get("use_ttl"), Some(&json!(false)));
            }
            other => panic!("unexpected call {other:?}"),
        }
    }

    fn structured(pairs: &[(&str, Value)]) -> RecordValue {
        RecordValue::Fields(
            pairs
                .iter()
                .map(|(name, value)| ((*name).to_string(), value.clone()))
                .collect::<BTreeMap<String, Value>>(),
        )
    }

    #[tokio::test]
    async fn test_applied_records_read_back_identically() {
        let text = |value: &str| RecordValue::from(value);
        let desired = vec![
            CanonicalRecord::new("www", RecordType::A, 300, vec![text("10.0.0.1"), text("10.0.0.2")]),
            CanonicalRecord::new("www", RecordType::Aaaa, 300, vec![text("2001:db8::1")]),
            CanonicalRecord::new("", RecordType::Alias, 600, vec![text("lb.example.com.")]),
            CanonicalRecord::new(
                "",
                RecordType::Caa,
                3600,
                vec![structured(&[
                    ("flags", json!(0)),
                    ("tag", json!("issue")),
                    ("value", json!("letsencrypt.org")),
                ])],
            ),
            CanonicalRecord::new("docs", RecordType::Cname, 3600, vec![text("www.unit.tests.")]),
            CanonicalRecord::new(
                "",
                RecordType::Mx,
                3600,
                vec![structured(&[
                    ("preference", json!(10)),
                    ("exchange", json!("mx1.unit.tests.")),
                ])],
            ),
            CanonicalRecord::new(
                "sip",
                RecordType::Naptr,
                900,
                vec![
                    structured(&[
                        ("order", json!(10)),
                        ("preference", json!(100)),
                        ("flags", json!("S")),
                        ("service", json!("SIP+D2U")),
                        ("regexp", json!("")),
                        ("replacement", json!("_sip._udp.unit.tests.")),
                    ]),
                    structured(&[
                        ("order", json!(20)),
                        ("preference", json!(100)),
                        ("flags", json!("U")),
                        ("service", json!("E2U+sip")),
                        ("regexp", json!("!^.*$!sip:info@unit.tests!")),
                        ("replacement", json!(".")),
                    ]),
                ],
            ),
            // NS entities carry no TTL of their own, so only the zone default survives
            CanonicalRecord::new(
                "",
                RecordType::Ns,
                3600,
                vec![text("ns1.unit.tests."), text("ns2.unit.tests.")],
            ),
            CanonicalRecord::new("ptr", RecordType::Ptr, 1800, vec![text("host.unit.tests.")]),
            CanonicalRecord::new(
                "_sip._tcp",
                RecordType::Srv,
                600,
                vec![
                    structured(&[
                        ("priority", json!(10)),
                        ("weight", json!(20)),
                        ("port", json!(5060)),
                        ("target", json!("sip.unit.tests.")),
                    ]),
                    structured(&[
                        ("priority", json!(0)),
                        ("weight", json!(0)),
                        ("port", json!(0)),
                        ("target", json!(".")),
                    ]),
                ],
            ),
            CanonicalRecord::new(
                "",
                RecordType::Txt,
                300,
                vec![text("v=spf1 -all"), text("hello world")],
            ),
        ];
        let covered: Vec<RecordType> = desired.iter().map(|r| r.record_type).collect();
        assert_eq!(covered, RecordType::ALL.to_vec());

        let changes: Vec<Change> = desired
            .iter()
            .cloned()
            .map(|new| Change::Create { new })
            .collect();

        let writer = provider(MemoryStore::new().with_zone("unit.tests", 3600)).await;
        writer.apply("unit.tests.", &changes).await.unwrap();

        let mut reader_store = MemoryStore::new().with_zone("unit.tests", 3600);
        for call in writer.store().calls() {
            if let StoreCall::Create(record_type, body) = call {
                reader_store = reader_store.with_entity(record_type, Value::Object(body));
            }
        }
        let reader = provider(reader_store).await;
        let mut zone = Zone::new("unit.tests.");
        reader.populate(&mut zone, true, false).await.unwrap();

        assert_eq!(zone.records().len(), desired.len());
        for expected in &desired {
            let actual = zone.find(&expected.name, expected.record_type).unwrap();
            assert_eq!(actual.ttl, expected.ttl, "{}", expected.record_type);
            assert_eq!(actual.values, expected.values, "{}", expected.record_type);
            assert!(!actual.is_desynchronized());
        }
        let ns_bodies: Vec<Fields> = writer
            .store()
            .calls()
            .into_iter()
            .filter_map(|call| match call {
                StoreCall::Create(RecordType::Ns, body) => Some(body),
                _ => None,
            })
            .collect();
        assert_eq!(ns_bodies.len(), 2);
        assert!(ns_bodies.iter().all(|body| !body.contains_key("ttl") && !body.contains_key("use_ttl")));
        assert_eq!(zone.find("", RecordType::Ns).unwrap().ttl, 3600);

        let no_op: Vec<Change> = zone
            .records()
            .iter()
            .filter(|existing| !existing.record_type.spec().is_single() || existing.record_type == RecordType::Alias)
            .map(|existing| Change::Update {
                existing: existing.clone(),
                new: desired
                    .iter()
                    .find(|d| d.name == existing.name && d.record_type == existing.record_type)
                    .cloned()
                    .unwrap(),
            })
            .collect();
        reader.apply("unit.tests.", &no_op).await.unwrap();
        assert!(reader.store().calls().is_empty());
    }
}
