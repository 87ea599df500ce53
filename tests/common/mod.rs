//! Common test utilities for hybrid-authz
//!
//! - In-memory SQLite authority database
//! - Service manifests, resource types and a wired-up harness
//!
//! # Usage
//!
//! ```rust,ignore
//! use crate::common::fixtures::Harness;
//!
//! #[tokio::test]
//! async fn my_test() {
//!     let h = Harness::sqlite().await;
//!     h.authority.register_manifest(&docs_manifest()).await.unwrap();
//! }
//! ```

pub mod database;
pub mod fixtures;

pub use database::TestDatabase;
pub use fixtures::Harness;

/// Skip test if environment variable is not set
#[macro_export]
macro_rules! skip_without_env {
    ($var:expr) => {
        if std::env::var($var).is_err() {
            eprintln!("Skipping test: {} environment variable not set", $var);
            return;
        }
    };
}

/// Assert that a result is Ok and return the value
#[macro_export]
macro_rules! assert_ok {
    ($expr:expr) => {
        match $expr {
            Ok(v) => v,
            Err(e) => panic!("Expected Ok, got Err: {:?}", e),
        }
    };
}

/// Assert that a result is Err
#[macro_export]
macro_rules! assert_err {
    ($expr:expr) => {
        match $expr {
            Ok(v) => panic!("Expected Err, got Ok: {:?}", v),
            Err(e) => e,
        }
    };
}
