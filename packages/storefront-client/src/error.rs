//! Typed errors for the storefront client.
//!
//! Uses `thiserror` for library errors (not `anyhow`) so callers can branch
//! on the failure kind: re-login, prompt login, retry, or show the error.

use thiserror::Error;

/// Result type for storefront client operations.
pub type Result<T> = std::result::Result<T, ListingError>;

/// Page-level failures of a listing request.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ListingError {
    /// Transport failure (connection refused, reset, timeout)
    #[error("network error: {0}")]
    Network(String),

    /// The service rejected the supplied auth token
    #[error("unauthorized: the session token was rejected")]
    Unauthorized,

    /// The endpoint needs a token and none was available
    #[error("authentication required")]
    AuthRequired,

    /// The body matched neither a bare sequence nor a `{data, meta}` envelope
    #[error("malformed response: {reason}")]
    MalformedResponse { reason: String },

    /// Any other non-2xx response
    #[error("API error ({status}): {message}")]
    Api { status: u16, message: String },

    /// Query parameters violate their invariants
    #[error("invalid query: {reason}")]
    InvalidQuery { reason: String },

    /// Configuration error (missing API URL, invalid settings)
    #[error("configuration error: {0}")]
    Config(String),
}

impl ListingError {
    pub(crate) fn malformed(reason: impl Into<String>) -> Self {
        Self::MalformedResponse {
            reason: reason.into(),
        }
    }

    pub(crate) fn invalid_query(reason: impl Into<String>) -> Self {
        Self::InvalidQuery {
            reason: reason.into(),
        }
    }

    /// Only transport failures are worth retrying without user action.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Network(_))
    }

    /// Whether recovery goes through the login flow.
    pub fn requires_login(&self) -> bool {
        matches!(self, Self::Unauthorized | Self::AuthRequired)
    }
}

impl From<reqwest::Error> for ListingError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            return Self::malformed(err.to_string());
        }
        if err.is_timeout() {
            return Self::Network(format!("request timed out: {}", err));
        }
        Self::Network(err.to_string())
    }
}
