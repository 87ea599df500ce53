// Module declarations
mod authority_ops;
mod connection;
mod types;

// Re-export public types
pub use types::{DatabaseBackendType, SeaOrmDatabase};
