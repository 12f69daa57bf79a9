//! Resolution of the immediate peer address from a request.
//!
//! The trust check only accepts a bare IP literal. How the peer is presented
//! depends on the transport, so the form is chosen here rather than in the
//! trust check:
//!
//! 1. [`RemoteAddr`] extension: a raw transport string, used verbatim. If it
//!    carries a port (`10.0.0.1:443`) the peer will not be trusted.
//! 2. Axum's `ConnectInfo<SocketAddr>` extension: the transport already split
//!    host and port, so only the IP is used.
//! 3. Neither: no peer address, treated as an empty string.
//!
//! ```rust,ignore
//! // Populate ConnectInfo when serving with axum
//! axum::serve(listener, app.into_make_service_with_connect_info::<SocketAddr>()).await?;
//! ```

use std::borrow::Cow;
use std::net::SocketAddr;

use axum::extract::ConnectInfo;
use axum::http::Request;

/// Raw peer address as presented by a transport, inserted as a request extension.
///
/// The value is passed to the trust check unchanged, so it must be a bare IP
/// for the peer to be trusted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteAddr(pub String);

impl RemoteAddr {
    /// Wrap a raw transport peer address.
    pub fn new(addr: impl Into<String>) -> Self {
        Self(addr.into())
    }
}

/// Peer address of `req`, if the transport recorded one.
pub fn peer_address<B>(req: &Request<B>) -> Option<Cow<'_, str>> {
    if let Some(RemoteAddr(addr)) = req.extensions().get::<RemoteAddr>() {
        return Some(Cow::Borrowed(addr.as_str()));
    }

    req.extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| Cow::Owned(addr.ip().to_string()))
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use axum::body::Body;

    #[test]
    fn test_remote_addr_verbatim() {
        let mut req = Request::builder().body(Body::empty()).unwrap();
        req.extensions_mut().insert(RemoteAddr::new("10.0.0.1:443"));

        assert_eq!(peer_address(&req).as_deref(), Some("10.0.0.1:443"));
    }

    #[test]
    fn test_connect_info_strips_port() {
        let mut req = Request::builder().body(Body::empty()).unwrap();
        req.extensions_mut()
            .insert(ConnectInfo("10.0.0.1:443".parse::<SocketAddr>().unwrap()));

        assert_eq!(peer_address(&req).as_deref(), Some("10.0.0.1"));
    }

    #[test]
    fn test_connect_info_ipv6() {
        let mut req = Request::builder().body(Body::empty()).unwrap();
        req.extensions_mut()
            .insert(ConnectInfo("[10::1]:443".parse::<SocketAddr>().unwrap()));

        assert_eq!(peer_address(&req).as_deref(), Some("10::1"));
    }

    #[test]
    fn test_remote_addr_takes_priority() {
        let mut req = Request::builder().body(Body::empty()).unwrap();
        req.extensions_mut()
            .insert(ConnectInfo("10.0.0.1:443".parse::<SocketAddr>().unwrap()));
        req.extensions_mut().insert(RemoteAddr::new("192.168.0.1"));

        assert_eq!(peer_address(&req).as_deref(), Some("192.168.0.1"));
    }

    #[test]
    fn test_no_peer() {
        let req = Request::builder().body(Body::empty()).unwrap();
        assert_eq!(peer_address(&req), None);
    }
}
