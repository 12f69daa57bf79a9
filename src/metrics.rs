//! Metrics for header rewriting outcomes.
//!
//! Recorded through the `metrics` facade; nothing is exported unless the
//! embedding application installs a recorder (e.g. a Prometheus exporter).
//!
//! # Available Metrics
//!
//! ## Counters
//! - `cloudfront_requests_total` - Requests seen by the middleware (label: outcome)
//!
//! Outcome labels: `rewritten`, `disabled`, `untrusted_peer`, `invalid_viewer_address`.

use metrics::{counter, describe_counter};

use crate::middleware::Outcome;

/// Metric names as constants for consistency.
pub mod names {
    pub const REQUESTS_TOTAL: &str = "cloudfront_requests_total";
}

/// Register metric descriptions with the installed recorder.
///
/// Call once after installing a recorder; safe to skip.
pub fn describe_metrics() {
    describe_counter!(
        names::REQUESTS_TOTAL,
        "Total number of requests processed by the CloudFront header rewriter"
    );
}

/// Record the outcome of processing one request.
pub fn record_outcome(outcome: Outcome) {
    counter!(names::REQUESTS_TOTAL, "outcome" => outcome.as_str()).increment(1);
}
