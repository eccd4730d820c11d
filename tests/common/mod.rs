// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

// Common test utilities for integration tests

#![allow(dead_code)]

use octoblox::config::ProviderConfig;
use serde_json::{json, Value};
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// WAPI version the mock grid advertises as its highest
pub const WAPI_VERSION: &str = "2.12";

/// Path of a WAPI object on the mock grid
pub fn wapi_path(object: &str) -> String {
    format!("/wapi/v{WAPI_VERSION}/{object}")
}

/// Provider configuration pointing at the mock grid, with retries disabled
pub fn mock_config(server: &MockServer) -> ProviderConfig {
    let mut config = ProviderConfig::new(server.uri(), "admin");
    config.password = Some("infoblox".to_string());
    config.retry_max_elapsed_secs = 0;
    config
}

/// Mount the schema answer: versions 1.0 and 2.12, every record type plus zone_auth
pub async fn mount_schema(server: &MockServer) {
    // Discovery starts at the default version before switching
    Mock::given(method("GET"))
        .and(path("/wapi/v1.0/"))
        .and(query_param("_schema", ""))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "supported_versions": ["1.0", "2.3", WAPI_VERSION],
            "supported_objects": [
                "record:a", "record:aaaa", "record:alias", "record:caa", "record:cname",
                "record:mx", "record:naptr", "record:ns", "record:ptr", "record:srv",
                "record:txt", "record:host", "zone_auth"
            ]
        })))
        .mount(server)
        .await;
}

/// Mount a zone lookup answering with one zone, or none when `soa_default_ttl` is None
pub async fn mount_zone(server: &MockServer, fqdn: &str, soa_default_ttl: Option<u32>) {
    let body = match soa_default_ttl {
        Some(ttl) => json!([{
            "_ref": format!("zone_auth/ZG5z:{fqdn}/default"),
            "fqdn": fqdn,
            "view": "default",
            "soa_default_ttl": ttl
        }]),
        None => json!([]),
    };
    Mock::given(method("GET"))
        .and(path(wapi_path("zone_auth")))
        .and(query_param("fqdn", fqdn))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
        .mount(server)
        .await;
}

/// Mount a single-page record read for `object` (`record:a`, ...)
pub async fn mount_records(server: &MockServer, object: &str, result: Value) {
    Mock::given(method("GET"))
        .and(path(wapi_path(object)))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "result": result })))
        .mount(server)
        .await;
}

/// Mount empty reads for every record object not in `except`
pub async fn mount_empty_records(server: &MockServer, except: &[&str]) {
    for object in [
        "record:a", "record:aaaa", "record:alias", "record:caa", "record:cname", "record:mx",
        "record:naptr", "record:ns", "record:ptr", "record:srv", "record:txt",
    ] {
        if !except.contains(&object) {
            mount_records(server, object, json!([])).await;
        }
    }
}
