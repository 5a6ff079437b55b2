//! Proxy client for forwarding Elasticsearch queries through Kibana.
//!
//! This module provides the `KibanaClient`, which owns the one shared
//! session, performs the login handshake when needed, and sends query
//! bodies to Kibana's console proxy endpoint with a single-retry policy
//! on stale or rejected session tokens.

use std::sync::Arc;
use std::time::Duration;

use reqwest::{header, Client, StatusCode};
use serde_json::Value;
use tokio::sync::{Mutex, RwLock};
use tracing::{debug, warn};

use crate::auth::{extract_sid_token, Clock, Credentials, SessionData, SystemClock};
use crate::config::Config;

use super::error::{truncate_body, Error};

// ============================================================================
// Constants
// ============================================================================

/// HTTP request timeout in seconds, applied to login and proxy calls alike.
/// 30s allows for slow searches while failing fast enough to be usable.
const REQUEST_TIMEOUT_SECS: u64 = 30;

/// Kibana login endpoint, relative to the base URL
const LOGIN_PATH: &str = "/internal/security/login";

/// Kibana console proxy endpoint, relative to the base URL
const PROXY_PATH: &str = "/api/console/proxy";

/// Value Kibana expects in the kbn-xsrf anti-forgery header
const XSRF_HEADER_VALUE: &str = "kibana";

/// Credentials and session live in one place: the session is absent or
/// bound to exactly the stored pair, and both are swapped under the same
/// write lock.
#[derive(Default)]
struct AuthState {
    credentials: Option<Credentials>,
    session: Option<SessionData>,
    /// Bumped on every credential swap. A request whose token predates the
    /// current generation must not be retried under the new identity.
    generation: u64,
}

/// Proxy client for Kibana.
/// Clone is cheap - reqwest::Client uses Arc internally for connection
/// pooling, and the session state is shared across clones.
#[derive(Clone)]
pub struct KibanaClient {
    http: Client,
    config: Config,
    clock: Arc<dyn Clock>,
    state: Arc<RwLock<AuthState>>,
    /// Serializes the login path so that concurrent expiry detection
    /// collapses into a single backend login call.
    login_gate: Arc<Mutex<()>>,
}

impl KibanaClient {
    /// Create a new client with the wall clock.
    pub fn new(config: Config) -> anyhow::Result<Self> {
        Self::with_clock(config, Arc::new(SystemClock))
    }

    /// Create a new client with an injected time source. Used by tests to
    /// force TTL expiry without real waits.
    pub fn with_clock(config: Config, clock: Arc<dyn Clock>) -> anyhow::Result<Self> {
        let http = Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()?;

        Ok(Self {
            http,
            config,
            clock,
            state: Arc::new(RwLock::new(AuthState::default())),
            login_gate: Arc::new(Mutex::new(())),
        })
    }

    /// Replace the active credentials, discarding any live session so the
    /// next request performs a fresh login as the new identity. In-flight
    /// requests holding the old token finish against the backend unchanged;
    /// they are never retried under the new pair.
    pub async fn set_credentials(
        &self,
        username: impl Into<String>,
        password: impl Into<String>,
    ) {
        let mut state = self.state.write().await;
        state.credentials = Some(Credentials::new(username, password));
        state.session = None;
        state.generation += 1;
        debug!("credentials replaced, session discarded");
    }

    /// Whether credentials have been set. Performs no network I/O.
    pub async fn is_configured(&self) -> bool {
        self.state.read().await.credentials.is_some()
    }

    /// Send one query body to the backend through Kibana's console proxy.
    ///
    /// A 401 from the proxy means the sid cookie is stale or revoked: the
    /// session is dropped, one fresh login runs, and the call is resent
    /// once with the new token. A second 401 after that is surfaced as an
    /// authentication failure rather than retried again, bounding each
    /// call to at most one login plus two proxied requests.
    pub async fn execute(&self, path: &str, body: &Value) -> Result<Value, Error> {
        let generation = self.state.read().await.generation;
        let token = self.ensure_valid().await?;

        let mut response = self.proxy_request(path, body, &token).await?;

        if response.status() == StatusCode::UNAUTHORIZED {
            // A credential swap mid-flight means this request belongs to the
            // old identity; it must not be resent as the new one
            if self.state.read().await.generation != generation {
                let body = response.text().await.unwrap_or_default();
                return Err(Error::Authentication(format!(
                    "token rejected after credentials were replaced mid-request: {}",
                    truncate_body(&body)
                )));
            }

            warn!(path, "proxy call rejected with 401, re-authenticating");
            self.invalidate().await;
            let token = self.login().await?;
            response = self.proxy_request(path, body, &token).await?;
        }

        let status = response.status();
        if status == StatusCode::UNAUTHORIZED {
            let body = response.text().await.unwrap_or_default();
            return Err(Error::Authentication(format!(
                "still unauthorized after re-login: {}",
                truncate_body(&body)
            )));
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(Error::Request {
                status: status.as_u16(),
                body,
            });
        }

        debug!(path, status = %status, "proxy call succeeded");
        Ok(response.json().await?)
    }

    /// Guarantee a currently-valid session token, logging in only when the
    /// stored session is absent or past its TTL. The single gate through
    /// which all authentication state flows.
    async fn ensure_valid(&self) -> Result<String, Error> {
        let now = self.clock.now();
        {
            let state = self.state.read().await;
            if let Some(session) = &state.session {
                if session.is_valid_at(now) {
                    return Ok(session.token().to_string());
                }
            }
        }
        self.login().await
    }

    /// Drop the current session regardless of age, forcing the next
    /// `ensure_valid` to perform a fresh login.
    async fn invalidate(&self) {
        self.state.write().await.session = None;
    }

    /// Perform the login handshake and store the resulting session.
    ///
    /// Callers that detect expiry simultaneously collapse into one backend
    /// call: the first through the gate logs in, the rest find the fresh
    /// session on the re-check and return it.
    async fn login(&self) -> Result<String, Error> {
        let _gate = self.login_gate.lock().await;

        // Re-check under the gate: another caller may have just logged in
        let now = self.clock.now();
        {
            let state = self.state.read().await;
            if let Some(session) = &state.session {
                if session.is_valid_at(now) {
                    return Ok(session.token().to_string());
                }
            }
        }

        let credentials = self
            .state
            .read()
            .await
            .credentials
            .clone()
            .ok_or(Error::NotConfigured)?;

        let login_url = format!("{}{}", self.config.base_url, LOGIN_PATH);
        let payload = serde_json::json!({
            "providerType": "basic",
            "providerName": "cloud-basic",
            "currentURL": format!("{}/login?msg=LOGGED_OUT", self.config.base_url),
            "params": {
                "username": credentials.username(),
                "password": credentials.password(),
            }
        });

        debug!(url = %login_url, username = credentials.username(), "logging in to Kibana");

        let response = self
            .http
            .post(&login_url)
            .header("kbn-version", &self.config.version)
            .header("kbn-xsrf", XSRF_HEADER_VALUE)
            .json(&payload)
            .send()
            .await
            .map_err(|e| Error::Authentication(format!("login request failed: {e}")))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(Error::Authentication(format!(
                "login rejected with status {}: {}",
                status,
                truncate_body(&body)
            )));
        }

        // Kibana may send several set-cookie headers; the session is in
        // whichever carries the sid segment
        let token = response
            .headers()
            .get_all(header::SET_COOKIE)
            .iter()
            .filter_map(|value| value.to_str().ok())
            .find_map(extract_sid_token)
            .map(str::to_string)
            .ok_or_else(|| {
                Error::Authentication("login succeeded but response carried no sid cookie".into())
            })?;

        let session = SessionData::new(token.clone(), self.clock.now());
        self.state.write().await.session = Some(session);
        debug!("login succeeded, session established");

        Ok(token)
    }

    async fn proxy_request(
        &self,
        path: &str,
        body: &Value,
        token: &str,
    ) -> Result<reqwest::Response, Error> {
        let url = format!("{}{}", self.config.base_url, PROXY_PATH);
        let response = self
            .http
            .post(&url)
            .query(&[("path", path), ("method", "POST")])
            .header(header::COOKIE, format!("sid={token}"))
            .header("kbn-xsrf", XSRF_HEADER_VALUE)
            .header("kbn-version", &self.config.version)
            .header("x-elastic-internal-origin", "Kibana")
            .json(body)
            .send()
            .await?;
        Ok(response)
    }
}
