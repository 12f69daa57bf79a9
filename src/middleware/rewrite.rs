//! Rewriting of forwarding headers from the CloudFront viewer address.
//!
//! # Processing Steps
//!
//! ```text
//! ranges empty? ──yes──► Disabled
//!      │ no
//!      ▼
//! peer trusted? ──no───► UntrustedPeer
//!      │ yes
//!      ▼
//! viewer address parses? ──no──► InvalidViewerAddress
//!      │ yes
//!      ▼
//! overwrite every configured header ──► Rewritten
//! ```
//!
//! Every outcome leaves the request usable; the caller forwards it regardless.
//! An empty range set ("disabled") is different from `0.0.0.0/0` ("trust all"),
//! which still rewrites.

use std::fmt;

use axum::http::{HeaderMap, HeaderName, HeaderValue};
use tracing::{debug, info};

use super::trusted::TrustedRanges;
use super::viewer::viewer_address;
use crate::config::Config;
use crate::error::{CloudfrontError, CloudfrontResult};
use crate::metrics;

/// Result of processing one request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// The configured headers were overwritten with the client IP.
    Rewritten,
    /// No trusted ranges are configured.
    Disabled,
    /// The peer is not in any trusted range (or could not be parsed).
    UntrustedPeer,
    /// The viewer address header is missing or malformed.
    InvalidViewerAddress,
}

impl Outcome {
    /// Stable label for logs and metrics.
    pub fn as_str(&self) -> &'static str {
        match self {
            Outcome::Rewritten => "rewritten",
            Outcome::Disabled => "disabled",
            Outcome::UntrustedPeer => "untrusted_peer",
            Outcome::InvalidViewerAddress => "invalid_viewer_address",
        }
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Validated, immutable rewriting rules shared by every request.
#[derive(Debug, Clone)]
pub struct HeaderRewriter {
    headers: Vec<HeaderName>,
    trusted: TrustedRanges,
}

impl HeaderRewriter {
    /// Build a rewriter from configuration.
    ///
    /// # Errors
    ///
    /// - `CloudfrontError::Config` if the configuration fails validation
    /// - `CloudfrontError::InvalidHeaderName` if a header name is not a valid HTTP token
    /// - `CloudfrontError::InvalidCidr` naming the first trusted range that does not parse
    pub fn new(config: &Config) -> CloudfrontResult<Self> {
        config.validate()?;

        let headers = config
            .headers
            .iter()
            .map(|name| {
                HeaderName::from_bytes(name.trim().as_bytes()).map_err(|_| {
                    CloudfrontError::InvalidHeaderName {
                        name: name.clone(),
                    }
                })
            })
            .collect::<CloudfrontResult<Vec<_>>>()?;

        let trusted = TrustedRanges::new(&config.trusted_ips)?;

        if trusted.is_enabled() {
            info!(
                headers = ?config.headers,
                trusted_ranges = trusted.ranges().len(),
                "CloudFront header rewriting enabled"
            );
        } else {
            info!("CloudFront header rewriting disabled (no trusted ranges)");
        }

        Ok(Self { headers, trusted })
    }

    /// Headers overwritten on a successful rewrite, in order.
    pub fn headers(&self) -> &[HeaderName] {
        &self.headers
    }

    /// Trusted peer ranges.
    pub fn trusted(&self) -> &TrustedRanges {
        &self.trusted
    }

    /// Check if rewriting is enabled (any trusted ranges configured).
    pub fn is_enabled(&self) -> bool {
        self.trusted.is_enabled()
    }

    /// Apply the rewriting rules to one request's headers.
    ///
    /// `peer` is the immediate peer address as resolved from the transport.
    /// Never fails: every malformed input leaves `headers` untouched.
    pub fn process(&self, peer: &str, headers: &mut HeaderMap) -> Outcome {
        let outcome = self.apply(peer, headers);
        metrics::record_outcome(outcome);
        outcome
    }

    fn apply(&self, peer: &str, headers: &mut HeaderMap) -> Outcome {
        if !self.trusted.is_enabled() {
            return Outcome::Disabled;
        }

        if !self.trusted.is_trusted(peer) {
            debug!(peer = %peer, "Ignoring Cloudfront-Viewer-Address from untrusted peer");
            return Outcome::UntrustedPeer;
        }

        let Some(address) = viewer_address(headers) else {
            debug!(peer = %peer, "Missing or malformed Cloudfront-Viewer-Address");
            return Outcome::InvalidViewerAddress;
        };

        let Ok(value) = HeaderValue::from_bytes(address.as_bytes()) else {
            return Outcome::InvalidViewerAddress;
        };

        debug!(
            peer = %peer,
            client_ip = %address.ip(),
            family = address.family(),
            "Rewriting forwarding headers from Cloudfront-Viewer-Address"
        );

        for name in &self.headers {
            headers.insert(name.clone(), value.clone());
        }

        Outcome::Rewritten
    }
}
