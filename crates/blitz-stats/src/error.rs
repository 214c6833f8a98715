//! Stats API error types.

use blitz_config::SecretError;

/// Stats API error.
#[derive(Debug, thiserror::Error)]
pub enum StatsError {
    /// Transport failure (connect, timeout, TLS).
    #[error("http: {0}")]
    Http(#[from] reqwest::Error),

    /// The API answered with a non-success status.
    #[error("{endpoint}: HTTP {status}")]
    Status { endpoint: &'static str, status: u16 },

    /// The response body did not match the expected shape.
    #[error("{endpoint}: invalid response: {source}")]
    Decode {
        endpoint: &'static str,
        #[source]
        source: serde_json::Error,
    },

    /// The API secret could not be read from the proxy config.
    #[error("secret: {0}")]
    Secret(#[from] SecretError),

    /// Backend error raised by non-HTTP implementations.
    #[error("backend error: {0}")]
    Backend(String),
}

impl StatsError {
    /// Create a backend error from any error type.
    #[inline]
    pub fn backend<E: std::fmt::Display>(err: E) -> Self {
        Self::Backend(err.to_string())
    }

    /// Whether the failure is the missing `trafficStats.secret`.
    pub fn is_secret_not_found(&self) -> bool {
        matches!(self, Self::Secret(SecretError::NotFound { .. }))
    }
}
