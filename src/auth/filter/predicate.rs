//! Backend-neutral row predicate
//!
//! Predicates are built per request from subject attributes and compiled to a
//! native query by each storage backend. There is no negation node, so a row
//! missing a field never matches, in memory or in SQL.

use crate::core::models::{AttributeValue, Authorizable};
use crate::utils::error::Result;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

/// Boolean condition over resource fields
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "op", content = "args", rename_all = "snake_case")]
pub enum Predicate {
    True,
    False,
    Eq {
        field: String,
        value: AttributeValue,
    },
    In {
        field: String,
        values: Vec<AttributeValue>,
    },
    And(Vec<Predicate>),
    Or(Vec<Predicate>),
}

impl Predicate {
    pub fn equals(field: impl Into<String>, value: impl Into<AttributeValue>) -> Self {
        Predicate::Eq {
            field: field.into(),
            value: value.into(),
        }
    }

    pub fn one_of<I, V>(field: impl Into<String>, values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<AttributeValue>,
    {
        Predicate::In {
            field: field.into(),
            values: values.into_iter().map(Into::into).collect(),
        }
    }

    pub fn and(predicates: Vec<Predicate>) -> Self {
        Predicate::And(predicates)
    }

    pub fn or(predicates: Vec<Predicate>) -> Self {
        Predicate::Or(predicates)
    }

    /// Fold constants and flatten nested connectives
    ///
    /// An empty `In` becomes `False`. After simplification `True` and `False`
    /// only appear as the whole predicate.
    pub fn simplify(self) -> Predicate {
        match self {
            Predicate::In { values, .. } if values.is_empty() => Predicate::False,
            Predicate::And(parts) => {
                let mut kept = Vec::with_capacity(parts.len());
                for part in parts {
                    match part.simplify() {
                        Predicate::True => {}
                        Predicate::False => return Predicate::False,
                        Predicate::And(inner) => kept.extend(inner),
                        other => kept.push(other),
                    }
                }
                collapse(kept, Predicate::True, Predicate::And)
            }
            Predicate::Or(parts) => {
                let mut kept = Vec::with_capacity(parts.len());
                for part in parts {
                    match part.simplify() {
                        Predicate::False => {}
                        Predicate::True => return Predicate::True,
                        Predicate::Or(inner) => kept.extend(inner),
                        other => kept.push(other),
                    }
                }
                collapse(kept, Predicate::False, Predicate::Or)
            }
            other => other,
        }
    }

    /// Evaluate against one resource
    pub fn matches(&self, resource: &dyn Authorizable) -> bool {
        match self {
            Predicate::True => true,
            Predicate::False => false,
            Predicate::Eq { field, value } => resource.lookup(field).as_ref() == Some(value),
            Predicate::In { field, values } => resource
                .lookup(field)
                .map(|v| values.contains(&v))
                .unwrap_or(false),
            Predicate::And(parts) => parts.iter().all(|p| p.matches(resource)),
            Predicate::Or(parts) => parts.iter().any(|p| p.matches(resource)),
        }
    }

    pub fn is_false(&self) -> bool {
        matches!(self, Predicate::False)
    }

    pub fn is_true(&self) -> bool {
        matches!(self, Predicate::True)
    }

    /// Field names referenced anywhere in the predicate
    pub fn fields(&self) -> BTreeSet<&str> {
        let mut out = BTreeSet::new();
        self.collect_fields(&mut out);
        out
    }

    fn collect_fields<'a>(&'a self, out: &mut BTreeSet<&'a str>) {
        match self {
            Predicate::True | Predicate::False => {}
            Predicate::Eq { field, .. } | Predicate::In { field, .. } => {
                out.insert(field.as_str());
            }
            Predicate::And(parts) | Predicate::Or(parts) => {
                for part in parts {
                    part.collect_fields(out);
                }
            }
        }
    }
}

fn collapse(
    mut kept: Vec<Predicate>,
    empty: Predicate,
    wrap: fn(Vec<Predicate>) -> Predicate,
) -> Predicate {
    match kept.len() {
        0 => empty,
        1 => kept.remove(0),
        _ => wrap(kept),
    }
}

impl fmt::Display for Predicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Predicate::True => f.write_str("TRUE"),
            Predicate::False => f.write_str("FALSE"),
            Predicate::Eq { field, value } => write!(f, "{} = {}", field, value),
            Predicate::In { field, values } => {
                write!(f, "{} IN (", field)?;
                for (i, value) in values.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{}", value)?;
                }
                f.write_str(")")
            }
            Predicate::And(parts) => join(f, parts, " AND "),
            Predicate::Or(parts) => join(f, parts, " OR "),
        }
    }
}

fn join(f: &mut fmt::Formatter<'_>, parts: &[Predicate], sep: &str) -> fmt::Result {
    f.write_str("(")?;
    for (i, part) in parts.iter().enumerate() {
        if i > 0 {
            f.write_str(sep)?;
        }
        write!(f, "{}", part)?;
    }
    f.write_str(")")
}

/// Compiles a [`Predicate`] into a backend's native filter
pub trait PredicateCompiler {
    type Output;

    fn compile(&self, predicate: &Predicate) -> Result<Self::Output>;
}

/// In-memory backend: filters already-loaded rows
#[derive(Debug, Clone, Copy, Default)]
pub struct InMemoryCompiler;

/// Compiled in-memory filter
#[derive(Debug, Clone)]
pub struct MemoryFilter {
    predicate: Predicate,
}

impl MemoryFilter {
    pub fn matches(&self, resource: &dyn Authorizable) -> bool {
        self.predicate.matches(resource)
    }

    /// Rows the predicate admits, in input order
    pub fn apply<'a, R: Authorizable>(&self, rows: &'a [R]) -> Vec<&'a R> {
        rows.iter().filter(|row| self.matches(*row)).collect()
    }
}

impl PredicateCompiler for InMemoryCompiler {
    type Output = MemoryFilter;

    fn compile(&self, predicate: &Predicate) -> Result<MemoryFilter> {
        Ok(MemoryFilter {
            predicate: predicate.clone().simplify(),
        })
    }
}
