//! Utility modules for the authorization core
//!
//! - **error**: Error taxonomy and the crate `Result` alias
//! - **logging**: Tracing subscriber setup for binaries
//! - **time**: Injectable clock used for TTL and token expiry decisions

pub mod error;
pub mod logging;
pub mod time;

pub use error::{AuthzError, Result, TokenRejection};
pub use time::{Clock, ManualClock, SharedClock, SystemClock, system_clock};

use uuid::Uuid;

/// Generate a unique request ID
pub fn generate_request_id() -> String {
    Uuid::new_v4().to_string()
}
