//! Error handling for the authorization core
//!
//! This module defines the error taxonomy shared by every component.

mod helpers;
#[cfg(test)]
mod tests;
mod types;

pub use types::{AuthzError, Result, TokenRejection};
