//! Middleware configuration.
//!
//! # Sources
//!
//! Configuration can be built three ways:
//!
//! - `Config::default()`: rewrite `X-Forwarded-For` and `X-Real-IP`, no trusted
//!   ranges (the middleware is disabled until ranges are configured)
//! - Deserialized from the plugin document shape via serde:
//!   `{"headers": ["X-Real-IP"], "trustedIPs": ["10.0.0.0/8"]}`
//! - `Config::from_env()`: environment variables (or a `.env` file)
//!
//! # Environment Variables
//!
//! - `CLOUDFRONT_HEADERS`: Comma-separated header names to overwrite
//!   (default: `X-Forwarded-For,X-Real-IP`)
//! - `CLOUDFRONT_TRUSTED_IPS`: Comma-separated CIDR ranges of CloudFront edge
//!   nodes allowed to supply `Cloudfront-Viewer-Address` (default: empty = disabled)
//!
//! Use `0.0.0.0/0` as the first trusted range to accept the viewer address from
//! any peer. This is only safe when the service cannot be reached except through
//! CloudFront.

use std::env;

use serde::Deserialize;

use crate::error::{CloudfrontError, CloudfrontResult};

/// Headers rewritten when none are configured.
pub const DEFAULT_HEADERS: [&str; 2] = ["X-Forwarded-For", "X-Real-IP"];

/// Environment variable holding the header names to overwrite.
pub const HEADERS_ENV: &str = "CLOUDFRONT_HEADERS";

/// Environment variable holding the trusted CIDR ranges.
pub const TRUSTED_IPS_ENV: &str = "CLOUDFRONT_TRUSTED_IPS";

/// CloudFront middleware configuration.
///
/// The CIDR strings are kept as written; they are parsed (and rejected if
/// invalid) when a [`HeaderRewriter`](crate::middleware::HeaderRewriter) is built.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Header names overwritten with the client IP, in order.
    pub headers: Vec<String>,

    /// Trusted peer ranges in CIDR notation (e.g. `"10.0.0.0/8"`, `"10::/64"`).
    /// Empty disables the middleware.
    #[serde(rename = "trustedIPs", alias = "trusted_ips")]
    pub trusted_ips: Vec<String>,
}

impl Config {
    /// Load configuration from environment variables with the defaults above.
    ///
    /// # Errors
    ///
    /// Returns `CloudfrontError::Config` if the resulting configuration fails
    /// [`validate`](Self::validate).
    pub fn from_env() -> CloudfrontResult<Self> {
        // Load an .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        let config = Self {
            headers: parse_list(env::var(HEADERS_ENV).ok().as_deref())
                .unwrap_or_else(default_headers),
            trusted_ips: parse_list(env::var(TRUSTED_IPS_ENV).ok().as_deref()).unwrap_or_default(),
        };

        config.validate()?;

        Ok(config)
    }

    /// Validate configuration values for consistency.
    ///
    /// CIDR syntax is checked separately when the rewriter is constructed so
    /// the error can name the offending range.
    ///
    /// # Errors
    ///
    /// Returns `CloudfrontError::Config` if a header name is empty.
    pub fn validate(&self) -> CloudfrontResult<()> {
        if let Some(position) = self.headers.iter().position(|h| h.trim().is_empty()) {
            return Err(CloudfrontError::Config(format!(
                "header name at position {position} must not be empty"
            )));
        }

        Ok(())
    }

    /// Check if header rewriting is enabled (any trusted ranges configured).
    pub fn is_enabled(&self) -> bool {
        !self.trusted_ips.is_empty()
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            headers: default_headers(),
            trusted_ips: vec![], // Empty = disabled
        }
    }
}

fn default_headers() -> Vec<String> {
    DEFAULT_HEADERS.iter().map(|h| h.to_string()).collect()
}

/// Split a comma-separated variable, dropping blank entries.
///
/// Returns `None` when the variable is unset or contains no entries so the
/// caller can fall back to its default.
fn parse_list(raw: Option<&str>) -> Option<Vec<String>> {
    let items: Vec<String> = raw?
        .split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect();

    if items.is_empty() { None } else { Some(items) }
}
