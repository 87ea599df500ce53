//! Collection filtering
//!
//! Translates object-level policies into backend-neutral predicates for list
//! queries, with a configurable fallback for policies that have no
//! translation.

mod equivalence;
mod fallback;
mod predicate;
mod translator;

pub use equivalence::{EquivalenceMismatch, audit_equivalence};
pub use fallback::{BoundedScan, ScanResult};
pub use predicate::{InMemoryCompiler, MemoryFilter, Predicate, PredicateCompiler};
pub use translator::{CollectionFilter, CollectionFilterTranslator, TranslationFn};
