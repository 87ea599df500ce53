//! Token validation and issuing
//!
//! Tokens carry only a subject id and an expiry. Roles and attributes come
//! from the attribute cache, never from the token.

mod handler;
mod tokens;
pub mod types;
mod utils;

#[cfg(test)]
mod tests;

pub use types::{Claims, TokenIssuer, TokenValidator};
pub use utils::extract_bearer;
