use thiserror::Error;

/// Maximum length for error response bodies in error messages
const MAX_ERROR_BODY_LENGTH: usize = 500;

#[derive(Error, Debug)]
pub enum Error {
    /// No credentials have been set. Non-retryable; requires the operator
    /// to call `set_credentials` first.
    #[error("no Kibana credentials configured - set credentials first")]
    NotConfigured,

    /// The login handshake failed: rejected credentials, a response without
    /// a usable sid cookie, or a network failure while logging in. Also
    /// raised when a proxied call is still unauthorized after the one
    /// permitted re-login.
    #[error("Kibana authentication failed: {0}")]
    Authentication(String),

    /// The proxied query failed for a non-authentication reason. The status
    /// and full body are carried verbatim so the caller can diagnose the
    /// downstream failure; display output truncates the body.
    #[error("Kibana request failed with status {status}: {}", truncate_body(.body))]
    Request { status: u16, body: String },

    /// Network-level failure (connect, TLS, timeout) on the proxied query
    /// path, before any HTTP status was received.
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),
}

/// Truncate a response body to avoid flooding error messages and logs
pub(crate) fn truncate_body(body: &str) -> String {
    if body.len() <= MAX_ERROR_BODY_LENGTH {
        body.to_string()
    } else {
        format!(
            "{}... (truncated, {} total bytes)",
            &body[..MAX_ERROR_BODY_LENGTH],
            body.len()
        )
    }
}
