//! Compiles collection filter predicates into SeaQuery conditions

use crate::auth::filter::{Predicate, PredicateCompiler};
use crate::core::models::AttributeValue;
use crate::utils::error::{AuthzError, Result};
use sea_orm::sea_query::{Alias, Condition, Expr, SimpleExpr};
use sea_orm::Value;
use std::collections::HashMap;

/// SQL backend for [`Predicate`]
///
/// Resource fields map to columns by name unless remapped with
/// [`SeaQueryCompiler::column`]. The resulting [`Condition`] plugs into any
/// `Select::filter` or `cond_where`.
#[derive(Debug, Clone, Default)]
pub struct SeaQueryCompiler {
    table: Option<String>,
    columns: HashMap<String, String>,
}

impl SeaQueryCompiler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Qualify every column with `table`
    pub fn for_table(table: impl Into<String>) -> Self {
        Self {
            table: Some(table.into()),
            columns: HashMap::new(),
        }
    }

    /// Map a resource field to a differently named column
    pub fn column(mut self, field: impl Into<String>, column: impl Into<String>) -> Self {
        self.columns.insert(field.into(), column.into());
        self
    }

    fn column_expr(&self, field: &str) -> Expr {
        let column = self
            .columns
            .get(field)
            .map(String::as_str)
            .unwrap_or(field);
        match &self.table {
            Some(table) => Expr::col((Alias::new(table), Alias::new(column))),
            None => Expr::col(Alias::new(column)),
        }
    }

    fn leaf(&self, predicate: &Predicate) -> Result<Option<SimpleExpr>> {
        Ok(Some(match predicate {
            Predicate::True => Expr::val(1).eq(1),
            Predicate::False => Expr::val(1).eq(0),
            Predicate::Eq { field, value } => self.column_expr(field).eq(to_sql_value(field, value)?),
            Predicate::In { values, .. } if values.is_empty() => Expr::val(1).eq(0),
            Predicate::In { field, values } => {
                let values = values
                    .iter()
                    .map(|v| to_sql_value(field, v))
                    .collect::<Result<Vec<_>>>()?;
                self.column_expr(field).is_in(values)
            }
            Predicate::And(_) | Predicate::Or(_) => return Ok(None),
        }))
    }

    fn compile_node(&self, predicate: &Predicate) -> Result<Condition> {
        let (parts, mut condition, empty) = match predicate {
            Predicate::And(parts) => (parts, Condition::all(), Expr::val(1).eq(1)),
            Predicate::Or(parts) => (parts, Condition::any(), Expr::val(1).eq(0)),
            leaf => {
                let mut condition = Condition::all();
                if let Some(expr) = self.leaf(leaf)? {
                    condition = condition.add(expr);
                }
                return Ok(condition);
            }
        };
        if parts.is_empty() {
            return Ok(Condition::all().add(empty));
        }
        for part in parts {
            condition = match self.leaf(part)? {
                Some(expr) => condition.add(expr),
                None => condition.add(self.compile_node(part)?),
            };
        }
        Ok(condition)
    }
}

fn to_sql_value(field: &str, value: &AttributeValue) -> Result<Value> {
    match value {
        AttributeValue::String(s) => Ok(Value::from(s.clone())),
        AttributeValue::Int(i) => Ok(Value::from(*i)),
        AttributeValue::Bool(b) => Ok(Value::from(*b)),
        AttributeValue::List(_) => Err(AuthzError::validation(format!(
            "field '{}' cannot be compared against a list in SQL",
            field
        ))),
    }
}

impl PredicateCompiler for SeaQueryCompiler {
    type Output = Condition;

    fn compile(&self, predicate: &Predicate) -> Result<Condition> {
        self.compile_node(&predicate.clone().simplify())
    }
}
