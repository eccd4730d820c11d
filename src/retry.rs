// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Retry logic with exponential backoff for WAPI calls.
//!
//! Transient grid errors (429, 5xx, connection failures) are retried with exponential
//! backoff, while permanent errors (4xx client errors) fail fast. Only idempotent
//! requests are retried: a repeated `POST` would create a second entity because the
//! grid does not de-duplicate.

use rand::Rng;
use reqwest::{Method, StatusCode};
use std::time::{Duration, Instant};

/// Initial retry interval (50ms)
const INITIAL_INTERVAL_MILLIS: u64 = 50;

/// Maximum interval between retries (10 seconds)
const MAX_INTERVAL_SECS: u64 = 10;

/// Backoff multiplier (exponential growth factor)
const BACKOFF_MULTIPLIER: f64 = 2.0;

/// Randomization factor to prevent thundering herd (±10%)
const RANDOMIZATION_FACTOR: f64 = 0.1;

/// Exponential backoff for one WAPI request, bounded by a retry budget.
///
/// Intervals start at 50ms, double up to 10 seconds and carry ±10% jitter. Once the
/// budget has elapsed no further interval is handed out; a zero budget disables
/// retries entirely.
///
/// # Retry Schedule
///
/// 50ms, 100ms, 200ms, 400ms, 800ms, 1.6s, 3.2s, 6.4s, then 10s until the budget
/// runs out.
#[derive(Debug, Clone)]
pub struct ExponentialBackoff {
    next_interval: Duration,
    /// `None` when the budget does not fit in an `Instant`
    deadline: Option<Instant>,
}

impl ExponentialBackoff {
    /// Start a backoff that hands out intervals until `budget` has elapsed.
    #[must_use]
    pub fn new(budget: Duration) -> Self {
        Self {
            next_interval: Duration::from_millis(INITIAL_INTERVAL_MILLIS),
            deadline: Instant::now().checked_add(budget),
        }
    }

    /// Interval the next retry will wait before jitter.
    #[must_use]
    pub fn next_interval(&self) -> Duration {
        self.next_interval
    }

    /// Next jittered wait, or `None` once the budget is spent.
    pub fn next_backoff(&mut self) -> Option<Duration> {
        if self.deadline.is_some_and(|deadline| Instant::now() >= deadline) {
            return None;
        }

        let interval = self.next_interval;
        self.next_interval = interval
            .mul_f64(BACKOFF_MULTIPLIER)
            .min(Duration::from_secs(MAX_INTERVAL_SECS));

        Some(jitter(interval))
    }
}

fn jitter(interval: Duration) -> Duration {
    let factor =
        rand::rng().random_range(1.0 - RANDOMIZATION_FACTOR..=1.0 + RANDOMIZATION_FACTOR);
    interval.mul_f64(factor)
}

/// Determine if an HTTP status code is retryable.
///
/// # Retryable Status Codes
///
/// - **429** (Too Many Requests) - Rate limiting
/// - **500** (Internal Server Error) - Server error
/// - **502** (Bad Gateway) - Proxy/gateway error
/// - **503** (Service Unavailable) - Temporary unavailability
/// - **504** (Gateway Timeout) - Gateway timeout
#[must_use]
pub fn is_retryable_http_status(status: StatusCode) -> bool {
    matches!(
        status,
        StatusCode::TOO_MANY_REQUESTS
            | StatusCode::INTERNAL_SERVER_ERROR
            | StatusCode::BAD_GATEWAY
            | StatusCode::SERVICE_UNAVAILABLE
            | StatusCode::GATEWAY_TIMEOUT
    )
}

/// Whether repeating `method` leaves the grid in the same state.
#[must_use]
pub fn is_idempotent(method: &Method) -> bool {
    matches!(*method, Method::GET | Method::PUT | Method::DELETE)
}

#[cfg(test)]
#[path = "retry_tests.rs"]
mod retry_tests;
