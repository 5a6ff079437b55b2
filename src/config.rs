//! Client configuration.
//!
//! The Kibana base URL and protocol version string are fixed at process
//! start, read once from the environment. Neither is mutable per-request.

/// Default Kibana endpoint when KIBANA_URL is not set
const DEFAULT_BASE_URL: &str = "https://logs.example.com";

/// Default value for the kbn-version header when KIBANA_VERSION is not set
const DEFAULT_VERSION: &str = "8.17.1";

#[derive(Debug, Clone)]
pub struct Config {
    /// Base URL of the Kibana instance, without a trailing slash
    pub base_url: String,
    /// Version string sent in the kbn-version header
    pub version: String,
}

impl Config {
    pub fn new(base_url: impl Into<String>, version: impl Into<String>) -> Self {
        let mut base_url = base_url.into();
        // Trim trailing slashes so endpoint joins stay predictable
        while base_url.ends_with('/') {
            base_url.pop();
        }
        Self {
            base_url,
            version: version.into(),
        }
    }

    /// Read configuration from KIBANA_URL and KIBANA_VERSION, falling back
    /// to the defaults.
    pub fn from_env() -> Self {
        Self::new(
            std::env::var("KIBANA_URL").unwrap_or_else(|_| DEFAULT_BASE_URL.to_string()),
            std::env::var("KIBANA_VERSION").unwrap_or_else(|_| DEFAULT_VERSION.to_string()),
        )
    }
}
