//! Core data models and the attribute cache

pub mod models;
pub mod profile_cache;
