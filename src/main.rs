//! kibrelay CLI - run one proxied Elasticsearch query against Kibana.
//!
//! Credentials come from KIBANA_USERNAME and KIBANA_PASSWORD (or an
//! interactive prompt); the target instance from KIBANA_URL and
//! KIBANA_VERSION. The query body is passed verbatim - no query building
//! happens here.

use std::io;

use anyhow::{bail, Context, Result};
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use kibrelay::{Config, KibanaClient};

/// Initialize the tracing subscriber for logging
fn init_tracing() {
    // Use RUST_LOG env var to control log level (e.g., RUST_LOG=debug)
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("warn"));

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(io::stderr))
        .with(filter)
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present (silently ignore if not found)
    let _ = dotenvy::dotenv();

    init_tracing();

    let mut args = std::env::args().skip(1);
    let path = match args.next() {
        Some(path) => path,
        None => bail!(
            "usage: kibrelay <path> [query-json]\n  e.g. kibrelay '/logstash-*/_search' '{{\"size\": 5}}'"
        ),
    };
    let query = match args.next() {
        // A malformed query body is an operator mistake; fail loudly
        Some(raw) => serde_json::from_str(&raw).context("query is not valid JSON")?,
        None => serde_json::json!({"query": {"match_all": {}}, "size": 10}),
    };

    let username = std::env::var("KIBANA_USERNAME").context("KIBANA_USERNAME is not set")?;
    let password = match std::env::var("KIBANA_PASSWORD") {
        Ok(password) => password,
        Err(_) => rpassword::prompt_password(format!("Kibana password for {username}: "))
            .context("failed to read password")?,
    };

    let config = Config::from_env();
    info!(base_url = %config.base_url, "starting kibrelay");

    let client = KibanaClient::new(config)?;
    client.set_credentials(username, password).await;

    let result = client.execute(&path, &query).await?;
    println!("{}", serde_json::to_string_pretty(&result)?);

    Ok(())
}
