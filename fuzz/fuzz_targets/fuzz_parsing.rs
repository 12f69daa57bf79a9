//! Fuzz testing for the CIDR and viewer address parsers.
//!
//! Both parsers see untrusted input: CIDR strings come from deployment
//! configuration and the viewer address comes straight off the wire. This
//! target checks that neither panics and that their results are consistent:
//!
//! - A parsed CIDR range contains its own network address, unless that
//!   address is IPv4-mapped
//! - Any peer is trusted when the first range is `0.0.0.0/0`
//! - An extracted client IP is the value with its last `:`-fragment removed
//!
//! # Running the Fuzz Tests
//!
//! ```bash
//! cargo +nightly install cargo-fuzz
//! cargo +nightly fuzz run fuzz_parsing -- -max_total_time=60
//! ```

#![no_main]

use std::net::IpAddr;

use libfuzzer_sys::fuzz_target;
use cloudfront_real_ip::middleware::{CidrRange, TrustedRanges, extract_client_ip};

fuzz_target!(|data: &[u8]| {
    match extract_client_ip(data) {
        Some(address) => {
            let ip = address.as_bytes();
            assert!(data.starts_with(ip));
            assert_eq!(data[ip.len()], b':');
            assert!(!data[ip.len() + 1..].contains(&b':'));
        }
        None => assert!(!data.contains(&b':')),
    }

    let Ok(s) = std::str::from_utf8(data) else {
        return;
    };

    if let Ok(range) = CidrRange::parse(s) {
        // Mapped networks compare as IPv4, so an IPv6 range can miss its own
        let mapped = matches!(range.network(), IpAddr::V6(v6) if v6.to_ipv4_mapped().is_some());
        assert_eq!(range.contains(&range.network()), !mapped);
    }

    if let Ok(trusted) = TrustedRanges::new(&["0.0.0.0/0"]) {
        assert!(trusted.is_trusted(s));
    }
});
