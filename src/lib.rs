//! # CloudFront Real IP
//!
//! Tower middleware that restores the real client IP for services behind
//! Amazon CloudFront:
//!
//! - **Trust**: only CloudFront edge peers (configured CIDR ranges) may supply
//!   the `Cloudfront-Viewer-Address` header
//! - **Parsing**: handles CloudFront's unbracketed `IPv6:PORT` notation
//! - **Rewriting**: overwrites `X-Forwarded-For` / `X-Real-IP` (configurable)
//!   so rate limiters, access logs and geo-IP filters see the client address
//! - **Pass-through**: requests are always forwarded; bad input is never rejected
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use std::net::SocketAddr;
//!
//! use axum::{Router, routing::get};
//! use cloudfront_real_ip::{CloudfrontLayer, Config};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = Config::from_env()?;
//!     let app = Router::new()
//!         .route("/", get(|| async { "ok" }))
//!         .layer(CloudfrontLayer::new(&config)?);
//!
//!     let listener = tokio::net::TcpListener::bind("0.0.0.0:3000").await?;
//!     axum::serve(listener, app.into_make_service_with_connect_info::<SocketAddr>()).await?;
//!     Ok(())
//! }
//! ```
//!
//! ## Configuration
//!
//! ```bash
//! CLOUDFRONT_TRUSTED_IPS=10.0.0.0/8,2600:9000::/28 CLOUDFRONT_HEADERS=X-Real-IP cargo run
//! ```

pub mod config;
pub mod error;
pub mod metrics;
pub mod middleware;

// Re-exports for convenience
pub use config::Config;
pub use error::{CidrParseError, CloudfrontError, CloudfrontResult};
pub use middleware::{CloudfrontLayer, CloudfrontService, HeaderRewriter, Outcome};
