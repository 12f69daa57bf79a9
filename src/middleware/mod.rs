//! HTTP middleware restoring the client IP behind CloudFront.
//!
//! # Components
//!
//! - **Trusted ranges** (`trusted`): CIDR check deciding whether the immediate
//!   peer is a CloudFront edge allowed to supply the viewer address
//! - **Viewer address** (`viewer`): extracts the client IP from
//!   `Cloudfront-Viewer-Address`, including unbracketed IPv6 literals
//! - **Peer resolution** (`peer`): reads the peer address from request extensions
//! - **Rewriter** (`rewrite`): overwrites the configured forwarding headers
//! - **Layer** (`layer`): Tower `Layer`/`Service` that always forwards the request
//!
//! # Architecture
//!
//! ```text
//! Request → CloudfrontService → (headers rewritten or untouched) → inner service
//! ```
//!
//! # Security Considerations
//!
//! - Only peers inside the trusted ranges may set the client IP
//! - Configured headers are overwritten, never appended to, so client-supplied
//!   `X-Forwarded-For` values cannot survive a successful rewrite
//! - When the peer is untrusted the original headers pass through unchanged;
//!   downstream components must not treat them as authoritative

pub mod layer;
pub mod peer;
pub mod rewrite;
pub mod trusted;
pub mod viewer;

pub use layer::{CloudfrontLayer, CloudfrontService, DEFAULT_NAME};
pub use peer::{RemoteAddr, peer_address};
pub use rewrite::{HeaderRewriter, Outcome};
pub use trusted::{CidrRange, TRUST_ALL, TrustedRanges};
pub use viewer::{VIEWER_ADDRESS_HEADER, ViewerAddress, extract_client_ip, viewer_address};
