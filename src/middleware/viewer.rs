//! Parsing of CloudFront's `Cloudfront-Viewer-Address` header.
//!
//! CloudFront sends the viewer address as `IP:PORT`, without brackets around
//! IPv6 literals:
//!
//! ```text
//! 1.2.3.4:1585
//! 2001:db8:0:0:0:0:0:1:4242
//! 2001:db8::1:4242
//! ```
//!
//! That format cannot be split with a standard host/port parser because an
//! IPv6 literal's own colons are indistinguishable from the port separator.
//! The port is therefore always taken to be the last colon-delimited fragment
//! and everything before it is the client IP.
//!
//! The extracted IP is *not* validated; its bytes are copied as-is into the
//! rewritten headers, including bytes outside ASCII.

use std::borrow::Cow;

use axum::http::HeaderMap;

/// Request header added by CloudFront containing the client's IP address and port.
pub const VIEWER_ADDRESS_HEADER: &str = "cloudfront-viewer-address";

/// Client IP extracted from a viewer address, borrowed from the header value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewerAddress<'a> {
    /// `IP:PORT` with exactly one colon.
    Ipv4(&'a [u8]),
    /// Several colons: an IPv6 literal followed by the port.
    Ipv6(&'a [u8]),
}

impl<'a> ViewerAddress<'a> {
    /// Raw bytes of the client IP portion.
    pub fn as_bytes(&self) -> &'a [u8] {
        match self {
            ViewerAddress::Ipv4(ip) | ViewerAddress::Ipv6(ip) => ip,
        }
    }

    /// The client IP portion as text, with invalid UTF-8 replaced.
    pub fn ip(&self) -> Cow<'a, str> {
        String::from_utf8_lossy(self.as_bytes())
    }

    /// Address family label for logs and metrics.
    pub fn family(&self) -> &'static str {
        match self {
            ViewerAddress::Ipv4(_) => "ipv4",
            ViewerAddress::Ipv6(_) => "ipv6",
        }
    }
}

/// Extract the client IP from a `Cloudfront-Viewer-Address` value.
///
/// Returns `None` when the value has no `:` (including the empty string).
///
/// # Example
///
/// ```
/// use cloudfront_real_ip::middleware::extract_client_ip;
///
/// assert_eq!(extract_client_ip("1.2.3.4:1585").map(|a| a.as_bytes()), Some(&b"1.2.3.4"[..]));
/// assert_eq!(extract_client_ip("1::9:4242").map(|a| a.as_bytes()), Some(&b"1::9"[..]));
/// assert_eq!(extract_client_ip("1.2.3.4"), None);
/// ```
#[inline]
pub fn extract_client_ip<T>(value: &T) -> Option<ViewerAddress<'_>>
where
    T: AsRef<[u8]> + ?Sized,
{
    // rsplitn yields the port first, then everything before the last colon
    let mut parts = value.as_ref().rsplitn(2, |b| *b == b':');
    let _port = parts.next()?;
    let ip = parts.next()?;

    if ip.contains(&b':') {
        Some(ViewerAddress::Ipv6(ip))
    } else {
        Some(ViewerAddress::Ipv4(ip))
    }
}

/// Read and parse the viewer address header from a request's headers.
///
/// A missing header is treated the same as a malformed one. Only the first
/// value is considered when the header is repeated.
pub fn viewer_address(headers: &HeaderMap) -> Option<ViewerAddress<'_>> {
    extract_client_ip(headers.get(VIEWER_ADDRESS_HEADER)?.as_bytes())
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn client_ip(value: &str) -> Option<String> {
        extract_client_ip(value).map(|a| a.ip().into_owned())
    }

    #[test]
    fn test_extract_ipv4() {
        assert_eq!(
            extract_client_ip("1.2.3.4:1585"),
            Some(ViewerAddress::Ipv4(b"1.2.3.4"))
        );
    }

    #[test]
    fn test_extract_ipv6_full_length() {
        assert_eq!(
            extract_client_ip("1:2:3:4:5:6:7:8:9:4242"),
            Some(ViewerAddress::Ipv6(b"1:2:3:4:5:6:7:8:9"))
        );
    }

    #[test]
    fn test_extract_ipv6_compressed() {
        assert_eq!(client_ip("1::9:4242").as_deref(), Some("1::9"));
        assert_eq!(client_ip("2001:db8::1:443").as_deref(), Some("2001:db8::1"));
    }

    #[test]
    fn test_extract_no_delimiter() {
        assert_eq!(extract_client_ip(""), None);
        assert_eq!(extract_client_ip("1.2.3.4"), None);
    }

    #[test]
    fn test_extract_is_not_validated() {
        // Fragments are copied as-is, even when they are not IPs
        assert_eq!(client_ip("garbage:80").as_deref(), Some("garbage"));
        assert_eq!(client_ip("1.2.3.4:").as_deref(), Some("1.2.3.4"));
        assert_eq!(client_ip(":80").as_deref(), Some(""));
        assert_eq!(client_ip("::").as_deref(), Some(":"));
    }

    #[test]
    fn test_extract_keeps_high_bytes() {
        let address = extract_client_ip(b"1:2:3:\xe9:4242").unwrap();

        assert_eq!(address.as_bytes(), b"1:2:3:\xe9");
        assert_eq!(address.family(), "ipv6");
        assert_eq!(address.ip(), "1:2:3:\u{fffd}");
    }

    #[test]
    fn test_family_label() {
        assert_eq!(extract_client_ip("1.2.3.4:1").unwrap().family(), "ipv4");
        assert_eq!(extract_client_ip("::1:1").unwrap().family(), "ipv6");
    }

    #[test]
    fn test_viewer_address_from_headers() {
        let mut headers = HeaderMap::new();
        assert_eq!(viewer_address(&headers), None);

        headers.insert(
            "Cloudfront-Viewer-Address",
            HeaderValue::from_static("203.0.113.50:5000"),
        );
        assert_eq!(
            viewer_address(&headers),
            Some(ViewerAddress::Ipv4(b"203.0.113.50"))
        );
    }

    #[test]
    fn test_viewer_address_non_utf8() {
        let mut headers = HeaderMap::new();
        headers.insert(
            VIEWER_ADDRESS_HEADER,
            HeaderValue::from_bytes(b"1.2.3.\xff:443").unwrap(),
        );

        assert_eq!(
            viewer_address(&headers).map(|a| a.as_bytes()),
            Some(&b"1.2.3.\xff"[..])
        );
    }
}
