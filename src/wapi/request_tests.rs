// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Unit tests for WAPI request retry behavior.

#[cfg(test)]
mod tests {
    use crate::dns_errors::{DnsError, RemoteError};
    use crate::wapi::request::{wapi_request, RequestFailure, Session, WapiRequest};
    use reqwest::{Method, StatusCode};
    use serde_json::{json, Value};
    use std::time::Duration;
    use wiremock::matchers::{header_exists, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn session(http: &reqwest::Client, budget: Duration) -> Session<'_> {
        Session {
            http,
            username: "admin",
            password: "infoblox",
            retry_max_elapsed: budget,
        }
    }

    fn get<'a>(url: &'a str, query: &'a [(String, String)]) -> WapiRequest<'a, Value> {
        WapiRequest {
            method: Method::GET,
            url,
            query,
            body: None,
        }
    }

    #[tokio::test]
    async fn test_get_sends_basic_auth_and_query() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/wapi/v2.12/zone_auth"))
            .and(query_param("fqdn", "unit.tests"))
            .and(header_exists("authorization"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
            .expect(1)
            .mount(&server)
            .await;

        let http = reqwest::Client::new();
        let url = format!("{}/wapi/v2.12/zone_auth", server.uri());
        let query = vec![("fqdn".to_string(), "unit.tests".to_string())];
        let body = wapi_request(&session(&http, Duration::from_secs(5)), &get(&url, &query))
            .await
            .unwrap();

        assert_eq!(body, "[]");
    }

    #[tokio::test]
    async fn test_get_is_retried_on_service_unavailable() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/wapi/v2.12/record:a"))
            .respond_with(ResponseTemplate::new(503))
            .up_to_n_times(2)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/wapi/v2.12/record:a"))
            .respond_with(ResponseTemplate::new(200).set_body_string("{\"result\":[]}"))
            .mount(&server)
            .await;

        let http = reqwest::Client::new();
        let url = format!("{}/wapi/v2.12/record:a", server.uri());
        let body = wapi_request(&session(&http, Duration::from_secs(5)), &get(&url, &[]))
            .await
            .unwrap();

        assert_eq!(body, "{\"result\":[]}");
    }

    #[tokio::test]
    async fn test_post_is_not_retried() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/wapi/v2.12/record:a"))
            .respond_with(ResponseTemplate::new(503))
            .expect(1)
            .mount(&server)
            .await;

        let http = reqwest::Client::new();
        let url = format!("{}/wapi/v2.12/record:a", server.uri());
        let payload = json!({"name": "www.unit.tests", "ipv4addr": "192.168.0.2"});
        let request = WapiRequest {
            method: Method::POST,
            url: &url,
            query: &[],
            body: Some(&payload),
        };
        let failure = wapi_request(&session(&http, Duration::from_secs(5)), &request)
            .await
            .unwrap_err();

        assert!(matches!(
            failure,
            RequestFailure::Status { status, .. } if status == StatusCode::SERVICE_UNAVAILABLE
        ));
    }

    #[tokio::test]
    async fn test_client_error_fails_fast() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/wapi/v2.12/record:mx"))
            .respond_with(ResponseTemplate::new(400).set_body_string("{\"Error\": \"bad field\"}"))
            .expect(1)
            .mount(&server)
            .await;

        let http = reqwest::Client::new();
        let url = format!("{}/wapi/v2.12/record:mx", server.uri());
        let failure = wapi_request(&session(&http, Duration::from_secs(5)), &get(&url, &[]))
            .await
            .unwrap_err();

        let err = failure.into_read_error("record:mx");
        match err {
            DnsError::Remote(RemoteError::RemoteReadError {
                object,
                status_code,
                reason,
            }) => {
                assert_eq!(object, "record:mx");
                assert_eq!(status_code, Some(400));
                assert!(reason.starts_with("WapiBadRequest"));
                assert!(reason.contains("bad field"));
            }
            other => panic!("unexpected error {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_zero_budget_disables_retries() {
        let server = MockServer::start().await;
        Mock::given(method("DELETE"))
            .respond_with(ResponseTemplate::new(500))
            .expect(1)
            .mount(&server)
            .await;

        let http = reqwest::Client::new();
        let url = format!("{}/wapi/v2.12/record:a/ZG5z:www.unit.tests/default", server.uri());
        let request: WapiRequest<'_, Value> = WapiRequest {
            method: Method::DELETE,
            url: &url,
            query: &[],
            body: None,
        };
        let failure = wapi_request(&session(&http, Duration::ZERO), &request)
            .await
            .unwrap_err();

        let err = failure.into_write_error("delete", "record:a/ZG5z:www.unit.tests/default");
        assert_eq!(err.reason(), "RemoteWriteError");
        assert!(err.is_transient());
    }

    #[test]
    fn test_connection_failure_has_no_status() {
        let err = RequestFailure::Connection("connection refused".to_string())
            .into_read_error("zone_auth");
        match err {
            DnsError::Remote(RemoteError::RemoteReadError {
                status_code, reason, ..
            }) => {
                assert_eq!(status_code, None);
                assert!(reason.contains("connection refused"));
            }
            other => panic!("unexpected error {other:?}"),
        }
    }
}
