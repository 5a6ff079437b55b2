//! kibrelay - credential-managed proxy client for Kibana.
//!
//! Authenticates against Kibana's session-based login endpoint, caches the
//! resulting sid cookie, transparently re-authenticates on expiry or
//! rejection, and forwards Elasticsearch DSL queries to the search backend
//! through Kibana's console proxy.
//!
//! ```no_run
//! use kibrelay::{Config, KibanaClient};
//!
//! # async fn run() -> anyhow::Result<()> {
//! let client = KibanaClient::new(Config::from_env())?;
//! client.set_credentials("elastic", "changeme").await;
//!
//! let result = client
//!     .execute(
//!         "/logstash-*/_search",
//!         &serde_json::json!({"query": {"match_all": {}}, "size": 5}),
//!     )
//!     .await?;
//! println!("{result}");
//! # Ok(())
//! # }
//! ```

pub mod api;
pub mod auth;
pub mod config;

pub use api::{Error, KibanaClient};
pub use auth::{Clock, Credentials, SessionData, SystemClock};
pub use config::Config;
