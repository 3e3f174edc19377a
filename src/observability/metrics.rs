//! Metrics collection.
//!
//! # Responsibilities
//! - Define navigator metrics (requests, retries, token refreshes, cache size)
//! - Record them through the `metrics` facade
//!
//! # Metrics
//! - `navigator_requests_total` (counter): outbound requests by repository, method, status
//! - `navigator_request_duration_seconds` (histogram): latency per repository
//! - `navigator_retries_total` (counter): retries by reason (status or transport)
//! - `navigator_token_refresh_total` (counter): token refreshes by repository and outcome
//! - `navigator_cache_resources` (gauge): resources held by the last updated cache
//!
//! # Design Decisions
//! - The library never installs a recorder; without one every call is a no-op

use std::time::Instant;

/// Record a completed outbound request.
pub fn record_request(repository: &str, method: &str, status: u16, start: Instant) {
    metrics::counter!(
        "navigator_requests_total",
        "repository" => repository.to_string(),
        "method" => method.to_string(),
        "status" => status.to_string()
    )
    .increment(1);
    metrics::histogram!(
        "navigator_request_duration_seconds",
        "repository" => repository.to_string()
    )
    .record(start.elapsed().as_secs_f64());
}

/// Record a retry decision.
pub fn record_retry(reason: &str) {
    metrics::counter!("navigator_retries_total", "reason" => reason.to_string()).increment(1);
}

/// Record a token refresh attempt.
pub fn record_token_refresh(repository: &str, success: bool) {
    let outcome = if success { "success" } else { "failure" };
    metrics::counter!(
        "navigator_token_refresh_total",
        "repository" => repository.to_string(),
        "outcome" => outcome
    )
    .increment(1);
}

/// Record the number of resources in a cache.
pub fn record_cache_size(size: usize) {
    metrics::gauge!("navigator_cache_resources").set(size as f64);
}
