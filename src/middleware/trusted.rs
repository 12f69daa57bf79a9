//! Trusted peer evaluation using CIDR ranges.
//!
//! CloudFront edge nodes connect to the origin from published address ranges.
//! Only requests whose immediate peer falls inside one of the configured ranges
//! may supply a `Cloudfront-Viewer-Address` header; anyone else could forge it.
//!
//! # Trust-All Sentinel
//!
//! When the *first* configured range is `0.0.0.0/0`, every peer is trusted and
//! the peer address is never parsed. Only the first entry is checked, and the
//! comparison uses the canonical (masked) form, so `1.2.3.4/0` is treated the
//! same as `0.0.0.0/0`.
//!
//! # Peer Address Format
//!
//! [`TrustedRanges::is_trusted`] expects a bare IP literal. A peer of the form
//! `ip:port` does not parse and is therefore untrusted; stripping the port is
//! the caller's decision (see [`super::peer`]).

use std::fmt;
use std::net::IpAddr;
use std::str::FromStr;

use tracing::{debug, warn};

use crate::error::{CidrParseError, CloudfrontError, CloudfrontResult};

/// Canonical form of the range that disables peer checks.
pub const TRUST_ALL: &str = "0.0.0.0/0";

// =============================================================================
// CIDR Matching
// =============================================================================

/// Parsed CIDR network range.
///
/// The network address is masked on parse, so `10::0/64` and `10::1/64`
/// describe the same range and both display as `10::/64`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CidrRange {
    /// Network address (host bits cleared)
    network: IpAddr,
    /// Prefix length (e.g., 24 for /24)
    prefix_len: u8,
}

impl CidrRange {
    /// Parse a CIDR notation string (e.g., "10.0.0.0/8" or "10::/64").
    ///
    /// The prefix length is mandatory; a bare IP address is rejected.
    pub fn parse(cidr: &str) -> Result<Self, CidrParseError> {
        let (addr, prefix) = cidr.split_once('/').ok_or(CidrParseError::MissingPrefix)?;

        let ip: IpAddr = addr.parse().map_err(|_| CidrParseError::InvalidAddress)?;

        // Digits only: rejects "+8", " 8" and an empty prefix
        if prefix.is_empty() || !prefix.bytes().all(|b| b.is_ascii_digit()) {
            return Err(CidrParseError::InvalidPrefixLength);
        }
        let prefix_len: u8 = prefix
            .parse()
            .map_err(|_| CidrParseError::InvalidPrefixLength)?;

        if prefix_len > max_prefix(&ip) {
            return Err(CidrParseError::InvalidPrefixLength);
        }

        Ok(Self {
            network: mask(ip, prefix_len),
            prefix_len,
        })
    }

    /// Network address with host bits cleared.
    pub fn network(&self) -> IpAddr {
        self.network
    }

    /// Prefix length in bits.
    pub fn prefix_len(&self) -> u8 {
        self.prefix_len
    }

    /// Check if an IP address is contained within this CIDR range.
    ///
    /// IPv4-mapped IPv6 addresses (`::ffff:a.b.c.d`) are compared as IPv4, so
    /// they match IPv4 ranges and never IPv6 ranges.
    pub fn contains(&self, ip: &IpAddr) -> bool {
        let ip = match ip {
            IpAddr::V6(v6) => v6.to_ipv4_mapped().map_or(*ip, IpAddr::V4),
            IpAddr::V4(_) => *ip,
        };

        match (&self.network, &ip) {
            (IpAddr::V4(_), IpAddr::V4(_)) | (IpAddr::V6(_), IpAddr::V6(_)) => {
                mask(ip, self.prefix_len) == self.network
            }
            // IPv4 and IPv6 don't match
            _ => false,
        }
    }

    /// Check if this is the `0.0.0.0/0` trust-all range.
    pub fn is_trust_all(&self) -> bool {
        matches!(self.network, IpAddr::V4(_)) && self.prefix_len == 0
    }
}

impl FromStr for CidrRange {
    type Err = CidrParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for CidrRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.network, self.prefix_len)
    }
}

fn max_prefix(ip: &IpAddr) -> u8 {
    match ip {
        IpAddr::V4(_) => 32,
        IpAddr::V6(_) => 128,
    }
}

/// Clear the host bits of `ip` beyond `prefix_len`.
fn mask(ip: IpAddr, prefix_len: u8) -> IpAddr {
    match ip {
        IpAddr::V4(v4) => {
            let mask = if prefix_len == 0 {
                0
            } else {
                u32::MAX << (32 - u32::from(prefix_len))
            };
            IpAddr::V4((u32::from(v4) & mask).into())
        }
        IpAddr::V6(v6) => {
            let mask = if prefix_len == 0 {
                0
            } else {
                u128::MAX << (128 - u32::from(prefix_len))
            };
            IpAddr::V6((u128::from(v6) & mask).into())
        }
    }
}

// =============================================================================
// Trusted Range Set
// =============================================================================

/// Ordered set of CIDR ranges allowed to supply the viewer address header.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TrustedRanges {
    ranges: Vec<CidrRange>,
}

impl TrustedRanges {
    /// Parse trusted ranges from CIDR strings.
    ///
    /// # Errors
    ///
    /// Returns `CloudfrontError::InvalidCidr` naming the first entry that is
    /// not valid CIDR notation. No partial set is produced.
    pub fn new<S: AsRef<str>>(cidrs: &[S]) -> CloudfrontResult<Self> {
        let ranges = cidrs
            .iter()
            .map(|cidr| {
                let cidr = cidr.as_ref();
                CidrRange::parse(cidr).map_err(|reason| CloudfrontError::InvalidCidr {
                    cidr: cidr.to_string(),
                    reason,
                })
            })
            .collect::<CloudfrontResult<Vec<_>>>()?;

        let trusted = Self { ranges };
        if trusted.trusts_all() {
            warn!("Trusting Cloudfront-Viewer-Address from any peer ({TRUST_ALL} configured first)");
        } else if trusted.is_enabled() {
            debug!(
                count = trusted.ranges.len(),
                "Trusted peer validation enabled with {} CIDR ranges",
                trusted.ranges.len()
            );
        }

        Ok(trusted)
    }

    /// Check if any ranges are configured.
    pub fn is_enabled(&self) -> bool {
        !self.ranges.is_empty()
    }

    /// Check if the first configured range is the trust-all sentinel.
    pub fn trusts_all(&self) -> bool {
        self.ranges.first().is_some_and(CidrRange::is_trust_all)
    }

    /// Configured ranges, in order.
    pub fn ranges(&self) -> &[CidrRange] {
        &self.ranges
    }

    /// Check if a peer address is allowed to supply the viewer address.
    ///
    /// `peer` must be a bare IP literal; anything else is not trusted unless
    /// the trust-all sentinel is configured. An empty set trusts nobody, but
    /// the rewriter short-circuits before asking.
    pub fn is_trusted(&self, peer: &str) -> bool {
        if self.trusts_all() {
            return true;
        }

        let ip: IpAddr = match peer.parse() {
            Ok(ip) => ip,
            Err(_) => {
                // Can't parse as IP, not trusted
                return false;
            }
        };

        self.ranges.iter().any(|range| range.contains(&ip))
    }
}
