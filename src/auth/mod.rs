//! Authentication module for managing credentials and the Kibana session.
//!
//! This module provides:
//! - `Credentials`: the active username/password pair, replaceable at runtime
//! - `SessionData`: sid-cookie session state with TTL-based expiry
//! - `Clock`: injectable time source so expiry is deterministic in tests
//!
//! There is exactly one session process-wide, owned by the client; it is
//! never persisted and is discarded whenever credentials change.

pub mod credentials;
pub mod session;

pub use credentials::Credentials;
pub use session::{extract_sid_token, Clock, SessionData, SystemClock};
