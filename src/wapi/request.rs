// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! HTTP request execution with retry for the WAPI.

use crate::dns_errors::{DnsError, RemoteError};
use crate::http_errors::{describe_http_failure, map_connection_error};
use crate::retry::{is_idempotent, is_retryable_http_status, ExponentialBackoff};
use reqwest::{Client as HttpClient, Method, StatusCode};
use serde::Serialize;
use std::time::{Duration, Instant};
use tracing::{debug, error, warn};

/// Why a single WAPI request failed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum RequestFailure {
    /// The grid answered with a non-success status
    Status { status: StatusCode, body: String },
    /// No usable response was received
    Connection(String),
}

impl RequestFailure {
    fn is_retryable(&self) -> bool {
        match self {
            Self::Status { status, .. } => is_retryable_http_status(*status),
            Self::Connection(_) => true,
        }
    }

    fn status_code(&self) -> Option<u16> {
        match self {
            Self::Status { status, .. } => Some(status.as_u16()),
            Self::Connection(_) => None,
        }
    }

    fn reason(&self) -> String {
        match self {
            Self::Status { status, body } => describe_http_failure(status.as_u16(), body),
            Self::Connection(detail) => {
                let (reason, message) = map_connection_error(detail);
                format!("{reason}: {message}")
            }
        }
    }

    /// Convert into the error returned for a failed read of `object`.
    pub(crate) fn into_read_error(self, object: &str) -> DnsError {
        RemoteError::RemoteReadError {
            object: object.to_string(),
            status_code: self.status_code(),
            reason: self.reason(),
        }
        .into()
    }

    /// Convert into the error returned for a failed `operation` on `object`.
    pub(crate) fn into_write_error(self, operation: &str, object: &str) -> DnsError {
        RemoteError::RemoteWriteError {
            operation: operation.to_string(),
            object: object.to_string(),
            status_code: self.status_code(),
            reason: self.reason(),
        }
        .into()
    }
}

impl std::fmt::Display for RequestFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.reason())
    }
}

/// Everything needed to issue one WAPI request.
pub(crate) struct WapiRequest<'a, T: Serialize> {
    pub method: Method,
    pub url: &'a str,
    pub query: &'a [(String, String)],
    pub body: Option<&'a T>,
}

/// Connection settings shared by every request.
pub(crate) struct Session<'a> {
    pub http: &'a HttpClient,
    pub username: &'a str,
    pub password: &'a str,
    pub retry_max_elapsed: Duration,
}

/// Execute a WAPI request, retrying idempotent methods on transient failures.
///
/// `GET`, `PUT` and `DELETE` are retried on 429/5xx and connection errors with
/// exponential backoff until `retry_max_elapsed` has passed. `POST` is issued
/// exactly once.
///
/// # Errors
///
/// Returns the last [`RequestFailure`] when the request fails permanently or the
/// retry budget is exhausted.
pub(crate) async fn wapi_request<T: Serialize>(
    session: &Session<'_>,
    request: &WapiRequest<'_, T>,
) -> Result<String, RequestFailure> {
    let mut backoff = ExponentialBackoff::new(session.retry_max_elapsed);
    let start_time = Instant::now();
    let retryable_method = is_idempotent(&request.method);
    let mut attempt = 0;

    loop {
        attempt += 1;

        let failure = match wapi_request_internal(session, request).await {
            Ok(body) => {
                if attempt > 1 {
                    debug!(
                        method = %request.method,
                        url = %request.url,
                        attempt = attempt,
                        elapsed = ?start_time.elapsed(),
                        "WAPI call succeeded after retries"
                    );
                }
                return Ok(body);
            }
            Err(failure) => failure,
        };

        if !retryable_method || !failure.is_retryable() {
            error!(
                method = %request.method,
                url = %request.url,
                error = %failure,
                "Non-retryable WAPI error, failing immediately"
            );
            return Err(failure);
        }

        let Some(duration) = backoff.next_backoff() else {
            error!(
                method = %request.method,
                url = %request.url,
                attempt = attempt,
                elapsed = ?start_time.elapsed(),
                error = %failure,
                "Backoff exhausted, giving up"
            );
            return Err(failure);
        };

        warn!(
            method = %request.method,
            url = %request.url,
            attempt = attempt,
            retry_after = ?duration,
            error = %failure,
            "Retryable WAPI error, will retry"
        );
        tokio::time::sleep(duration).await;
    }
}

/// Single attempt without retry; use [`wapi_request`].
async fn wapi_request_internal<T: Serialize>(
    session: &Session<'_>,
    request: &WapiRequest<'_, T>,
) -> Result<String, RequestFailure> {
    debug!(
        method = %request.method,
        url = %request.url,
        query = ?request.query,
        has_body = request.body.is_some(),
        "WAPI request"
    );

    let mut builder = session
        .http
        .request(request.method.clone(), request.url)
        .basic_auth(session.username, Some(session.password));
    if !request.query.is_empty() {
        builder = builder.query(request.query);
    }
    if let Some(body) = request.body {
        builder = builder.json(body);
    }

    let response = builder
        .send()
        .await
        .map_err(|e| RequestFailure::Connection(e.to_string()))?;

    let status = response.status();
    let text = response
        .text()
        .await
        .map_err(|e| RequestFailure::Connection(format!("failed to read response body: {e}")))?;

    if !status.is_success() {
        error!(
            method = %request.method,
            url = %request.url,
            status = %status,
            error = %text,
            "WAPI request failed"
        );
        return Err(RequestFailure::Status { status, body: text });
    }

    debug!(
        method = %request.method,
        url = %request.url,
        status = %status,
        body_len = text.len(),
        "WAPI request succeeded"
    );

    Ok(text)
}

#[cfg(test)]
#[path = "request_tests.rs"]
mod request_tests;
