//! Tower integration for the CloudFront header rewriter.
//!
//! # Usage
//!
//! ```rust,ignore
//! let layer = CloudfrontLayer::new(&Config::from_env()?)?;
//! let app = Router::new()
//!     .route("/", get(handler))
//!     .layer(layer);
//!
//! axum::serve(listener, app.into_make_service_with_connect_info::<SocketAddr>()).await?;
//! ```
//!
//! The service rewrites headers synchronously before calling the inner
//! service, then returns the inner future untouched. It never produces a
//! response of its own.

use std::sync::Arc;
use std::task::{Context, Poll};

use axum::http::Request;
use tower::{Layer, Service};
use tracing::trace;

use super::peer::peer_address;
use super::rewrite::HeaderRewriter;
use crate::config::Config;
use crate::error::CloudfrontResult;

/// Instance name used when none is given.
pub const DEFAULT_NAME: &str = "cloudfront";

/// CloudFront header rewriting layer for Tower middleware stack.
#[derive(Debug, Clone)]
pub struct CloudfrontLayer {
    rewriter: Arc<HeaderRewriter>,
    name: Arc<str>,
}

impl CloudfrontLayer {
    /// Create a layer from configuration.
    ///
    /// # Errors
    ///
    /// Returns the construction errors of [`HeaderRewriter::new`].
    pub fn new(config: &Config) -> CloudfrontResult<Self> {
        Ok(Self::from_rewriter(HeaderRewriter::new(config)?))
    }

    /// Create a layer around an already-built rewriter.
    pub fn from_rewriter(rewriter: HeaderRewriter) -> Self {
        Self {
            rewriter: Arc::new(rewriter),
            name: Arc::from(DEFAULT_NAME),
        }
    }

    /// Set the instance name reported in log events.
    pub fn with_name(mut self, name: impl AsRef<str>) -> Self {
        self.name = Arc::from(name.as_ref());
        self
    }

    /// Instance name reported in log events.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Shared rewriting rules applied by every service this layer creates.
    pub fn rewriter(&self) -> &HeaderRewriter {
        &self.rewriter
    }
}

impl<S> Layer<S> for CloudfrontLayer {
    type Service = CloudfrontService<S>;

    fn layer(&self, inner: S) -> Self::Service {
        CloudfrontService {
            inner,
            rewriter: self.rewriter.clone(),
            name: self.name.clone(),
        }
    }
}

/// CloudFront header rewriting service wrapper.
#[derive(Debug, Clone)]
pub struct CloudfrontService<S> {
    inner: S,
    rewriter: Arc<HeaderRewriter>,
    name: Arc<str>,
}

impl<S, B> Service<Request<B>> for CloudfrontService<S>
where
    S: Service<Request<B>>,
{
    type Response = S::Response;
    type Error = S::Error;
    type Future = S::Future;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, mut req: Request<B>) -> Self::Future {
        let peer = peer_address(&req).map(|p| p.into_owned()).unwrap_or_default();
        let outcome = self.rewriter.process(&peer, req.headers_mut());

        trace!(middleware = %self.name, outcome = %outcome, "Forwarding request");

        self.inner.call(req)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn test_layer_creation() {
        let layer = CloudfrontLayer::new(&Config::default()).unwrap();

        assert_eq!(layer.name(), DEFAULT_NAME);
        assert!(!layer.rewriter().is_enabled());
    }

    #[test]
    fn test_layer_with_name() {
        let layer = CloudfrontLayer::new(&Config::default())
            .unwrap()
            .with_name("edge-ip");

        assert_eq!(layer.name(), "edge-ip");
    }

    #[test]
    fn test_layer_invalid_config() {
        let config = Config {
            trusted_ips: vec!["10.0.0.0".to_string()],
            ..Config::default()
        };

        assert!(CloudfrontLayer::new(&config).is_err());
    }

    #[test]
    fn test_services_share_rewriter() {
        let layer = CloudfrontLayer::new(&Config::default()).unwrap();
        let a = layer.layer(());
        let b = layer.layer(());

        assert!(Arc::ptr_eq(&a.rewriter, &b.rewriter));
    }
}
