//! Proxy client module for the Kibana console proxy.
//!
//! This module provides the `KibanaClient` for sending Elasticsearch DSL
//! queries through an authenticated Kibana session, and the `Error`
//! taxonomy callers branch on to distinguish credential problems from
//! query problems.

pub mod client;
pub mod error;

pub use client::KibanaClient;
pub use error::Error;
