// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! HTTP error code mapping to WAPI failure reasons.
//!
//! The grid answers failed calls with a status code and a JSON body (`{"Error": ...,
//! "text": ...}`). This module turns the status code into a short reason and a
//! human-readable message so read and write errors read the same everywhere.
//!
//! # Usage
//!
//! ```rust
//! use octoblox::http_errors::map_http_error_to_reason;
//!
//! let (reason, message) = map_http_error_to_reason(401);
//! assert_eq!(reason, "WapiAuthFailed");
//! assert!(message.contains("401"));
//! ```

/// Invalid request (bad field, bad value)
pub const REASON_WAPI_BAD_REQUEST: &str = "WapiBadRequest";

/// Authentication or authorization failure
pub const REASON_WAPI_AUTH_FAILED: &str = "WapiAuthFailed";

/// Object or reference does not exist
pub const REASON_WAPI_NOT_FOUND: &str = "WapiNotFound";

/// Grid rejected a write because the object already exists
pub const REASON_WAPI_CONFLICT: &str = "WapiConflict";

/// Grid is throttling requests
pub const REASON_WAPI_RATE_LIMITED: &str = "WapiRateLimited";

/// Internal grid error
pub const REASON_WAPI_INTERNAL_ERROR: &str = "WapiInternalError";

/// Proxy or load balancer in front of the grid failed
pub const REASON_GATEWAY_ERROR: &str = "GatewayError";

/// No response or an unexpected status
pub const REASON_WAPI_UNREACHABLE: &str = "WapiUnreachable";

/// Map HTTP status code to failure reason and message.
///
/// # HTTP Code Mapping
///
/// | HTTP Code | Reason | Meaning |
/// |-----------|--------|---------|
/// | 400 | `WapiBadRequest` | Invalid request format or field |
/// | 401 | `WapiAuthFailed` | Authentication required |
/// | 403 | `WapiAuthFailed` | Insufficient permissions |
/// | 404 | `WapiNotFound` | Object or reference not found |
/// | 409 | `WapiConflict` | Object already exists |
/// | 429 | `WapiRateLimited` | Too many requests |
/// | 500 | `WapiInternalError` | Internal grid error |
/// | 502-504 | `GatewayError` | Gateway failure |
/// | Other | `WapiUnreachable` | Unexpected status |
#[must_use]
pub fn map_http_error_to_reason(status_code: u16) -> (&'static str, String) {
    match status_code {
        400 => (
            REASON_WAPI_BAD_REQUEST,
            "Invalid request to WAPI (400)".into(),
        ),
        401 => (
            REASON_WAPI_AUTH_FAILED,
            "WAPI authentication required (401)".into(),
        ),
        403 => (
            REASON_WAPI_AUTH_FAILED,
            "WAPI authorization failed (403)".into(),
        ),
        404 => (
            REASON_WAPI_NOT_FOUND,
            "WAPI object not found (404)".into(),
        ),
        409 => (
            REASON_WAPI_CONFLICT,
            "WAPI object already exists (409)".into(),
        ),
        429 => (
            REASON_WAPI_RATE_LIMITED,
            "WAPI rate limit exceeded (429)".into(),
        ),
        500 => (
            REASON_WAPI_INTERNAL_ERROR,
            "WAPI internal error (500)".into(),
        ),
        502 => (
            REASON_GATEWAY_ERROR,
            "Bad gateway reaching WAPI (502)".into(),
        ),
        503 => (
            REASON_GATEWAY_ERROR,
            "WAPI service unavailable (503)".into(),
        ),
        504 => (
            REASON_GATEWAY_ERROR,
            "Gateway timeout reaching WAPI (504)".into(),
        ),
        _ => (
            REASON_WAPI_UNREACHABLE,
            format!("Unexpected HTTP error from WAPI ({status_code})"),
        ),
    }
}

/// Map a failure to reach the grid at all to a reason and message.
#[must_use]
pub fn map_connection_error(detail: &str) -> (&'static str, String) {
    (
        REASON_WAPI_UNREACHABLE,
        format!("Cannot reach WAPI: {detail}"),
    )
}

/// Build the reason text carried by remote errors: mapped message plus response body.
#[must_use]
pub fn describe_http_failure(status_code: u16, body: &str) -> String {
    let (reason, message) = map_http_error_to_reason(status_code);
    let body = body.trim();
    if body.is_empty() {
        format!("{reason}: {message}")
    } else {
        format!("{reason}: {message}: {body}")
    }
}

#[cfg(test)]
#[path = "http_errors_tests.rs"]
mod http_errors_tests;
