// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Unit tests for WAPI wire types.

#[cfg(test)]
mod tests {
    use crate::record_types::RecordType;
    use crate::wapi::types::*;
    use serde_json::json;

    fn schema(versions: &[&str], objects: &[&str]) -> Schema {
        Schema {
            supported_versions: versions.iter().map(|v| (*v).to_string()).collect(),
            supported_objects: objects.iter().map(|o| (*o).to_string()).collect(),
        }
    }

    #[test]
    fn test_negotiate_picks_highest_version_numerically() {
        let caps = Capabilities::negotiate(&schema(&["1.4", "2.9", "2.12", "2.10.5"], &[]), None);
        assert_eq!(caps.api_version, "2.12");
    }

    #[test]
    fn test_negotiate_prefers_configured_version() {
        let caps = Capabilities::negotiate(&schema(&["2.12"], &[]), Some("2.7"));
        assert_eq!(caps.api_version, "2.7");
    }

    #[test]
    fn test_negotiate_defaults_when_no_versions() {
        let caps = Capabilities::negotiate(&Schema::default(), None);
        assert_eq!(caps.api_version, "1.0");
        assert!(caps.record_types.is_empty());
    }

    #[test]
    fn test_negotiate_intersects_record_objects() {
        let caps = Capabilities::negotiate(
            &schema(
                &["2.12"],
                &["record:a", "record:host", "zone_auth", "record:alias", "record:txt"],
            ),
            None,
        );
        let types: Vec<RecordType> = caps.record_types.iter().copied().collect();
        assert_eq!(types, vec![RecordType::A, RecordType::Alias, RecordType::Txt]);
        assert!(caps.supports(RecordType::A));
        assert!(!caps.supports(RecordType::Mx));
    }

    #[test]
    fn test_remote_entity_keeps_type_fields() {
        let entity: RemoteEntity = serde_json::from_value(json!({
            "_ref": "record:mx/ZG5z:unit.tests/default",
            "name": "unit.tests",
            "preference": 10,
            "mail_exchanger": "mx1.unit.tests",
            "use_ttl": true,
            "ttl": 300
        }))
        .unwrap();

        assert_eq!(entity.reference.as_str(), "record:mx/ZG5z:unit.tests/default");
        assert_eq!(entity.ttl, Some(300));
        assert_eq!(entity.use_ttl, Some(true));
        assert_eq!(entity.fields.get("preference"), Some(&json!(10)));
        assert!(!entity.fields.contains_key("_ref"));
        assert!(!entity.fields.contains_key("ttl"));
    }

    #[test]
    fn test_page_without_next_page_id() {
        let page: Page = serde_json::from_value(json!({ "result": [] })).unwrap();
        assert!(page.result.is_empty());
        assert!(page.next_page_id.is_none());
    }

    #[test]
    fn test_wapi_ref_is_transparent() {
        let reference = WapiRef::new("zone_auth/abc:unit.tests/default");
        assert_eq!(
            serde_json::to_value(&reference).unwrap(),
            json!("zone_auth/abc:unit.tests/default")
        );
        assert_eq!(reference.to_string(), "zone_auth/abc:unit.tests/default");
    }
}
