//! Database storage implementation using SeaORM
//!
//! Ground truth for the identity authority, plus the SQL compiler for
//! collection filter predicates.

/// Database entities module
pub mod entities;
/// Database migration module
pub mod migration;
/// Predicate to SQL condition compiler
pub mod predicate;
/// SeaORM database implementation module
pub mod seaorm_db;

// Re-export the main database interface
pub use predicate::SeaQueryCompiler;
pub use seaorm_db::SeaOrmDatabase as Database;
pub use seaorm_db::{DatabaseBackendType, SeaOrmDatabase};
