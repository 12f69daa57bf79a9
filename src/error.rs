use thiserror::Error;

/// Reason a trusted-range entry could not be parsed as CIDR notation.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum CidrParseError {
    #[error("missing '/' prefix length")]
    MissingPrefix,

    #[error("invalid IP address")]
    InvalidAddress,

    #[error("invalid prefix length")]
    InvalidPrefixLength,
}

/// Errors raised while building the middleware from configuration.
///
/// Construction is the only fallible step: once a [`HeaderRewriter`] exists,
/// request processing never fails and malformed requests simply pass through.
///
/// [`HeaderRewriter`]: crate::middleware::HeaderRewriter
#[derive(Error, Debug)]
pub enum CloudfrontError {
    #[error("invalid CIDR {cidr}: {reason}")]
    InvalidCidr {
        cidr: String,
        #[source]
        reason: CidrParseError,
    },

    #[error("invalid header name {name:?}")]
    InvalidHeaderName { name: String },

    #[error("Configuration error: {0}")]
    Config(String),
}

/// Convenience type alias for Results with CloudfrontError.
pub type CloudfrontResult<T> = Result<T, CloudfrontError>;
