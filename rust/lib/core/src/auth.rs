//! Caller identity extraction.
//!
//! Modules do not know where the caller token comes from. They only know
//! this trait; the concrete implementation is injected at startup time.

use axum::http::HeaderMap;

use crate::ServiceError;

/// Pluggable authenticator. Maps request headers to the opaque caller
/// token that identifies a user by name.
pub trait Authenticator: Send + Sync + 'static {
    /// Return the caller token, or `ServiceError::Unauthorized` if the
    /// request carries none.
    fn identify(&self, headers: &HeaderMap) -> Result<String, ServiceError>;
}

/// Reads the token verbatim from a single request header.
pub struct ApiKeyHeader {
    header: String,
}

impl ApiKeyHeader {
    pub fn new(header: &str) -> Self {
        Self {
            header: header.to_ascii_lowercase(),
        }
    }
}

impl Default for ApiKeyHeader {
    fn default() -> Self {
        Self::new(crate::config::DEFAULT_IDENTITY_HEADER)
    }
}

impl Authenticator for ApiKeyHeader {
    fn identify(&self, headers: &HeaderMap) -> Result<String, ServiceError> {
        headers
            .get(self.header.as_str())
            .and_then(|v| v.to_str().ok())
            .filter(|v| !v.is_empty())
            .map(str::to_string)
            .ok_or_else(|| ServiceError::Unauthorized(format!("missing {} header", self.header)))
    }
}
