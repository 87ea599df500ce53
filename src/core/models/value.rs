//! Attribute value types

use crate::utils::error::{AuthzError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Declared type of an attribute
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AttributeType {
    String,
    Int,
    Bool,
    List,
}

impl AttributeType {
    /// Whether `value` is an instance of this type
    pub fn accepts(&self, value: &AttributeValue) -> bool {
        value.value_type() == *self
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            AttributeType::String => "string",
            AttributeType::Int => "int",
            AttributeType::Bool => "bool",
            AttributeType::List => "list",
        }
    }

    /// Parse a textual value (CLI input, env) as this type
    ///
    /// Lists accept either a JSON array or a comma-separated string list.
    pub fn parse_value(&self, raw: &str) -> Result<AttributeValue> {
        let invalid = || AuthzError::validation(format!("'{}' is not a valid {}", raw, self));
        match self {
            AttributeType::String => Ok(AttributeValue::String(raw.to_string())),
            AttributeType::Int => raw
                .trim()
                .parse::<i64>()
                .map(AttributeValue::Int)
                .map_err(|_| invalid()),
            AttributeType::Bool => raw
                .trim()
                .parse::<bool>()
                .map(AttributeValue::Bool)
                .map_err(|_| invalid()),
            AttributeType::List => {
                let trimmed = raw.trim();
                if trimmed.starts_with('[') {
                    let value: AttributeValue = serde_json::from_str(trimmed)?;
                    if value.value_type() == AttributeType::List {
                        Ok(value)
                    } else {
                        Err(invalid())
                    }
                } else if trimmed.is_empty() {
                    Ok(AttributeValue::List(Vec::new()))
                } else {
                    Ok(AttributeValue::List(
                        trimmed
                            .split(',')
                            .map(|s| AttributeValue::String(s.trim().to_string()))
                            .collect(),
                    ))
                }
            }
        }
    }
}

impl fmt::Display for AttributeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AttributeType {
    type Err = AuthzError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "string" => Ok(AttributeType::String),
            "int" | "integer" => Ok(AttributeType::Int),
            "bool" | "boolean" => Ok(AttributeType::Bool),
            "list" => Ok(AttributeType::List),
            other => Err(AuthzError::validation(format!(
                "Unknown attribute type: {}",
                other
            ))),
        }
    }
}

/// A subject attribute value or a resource field value
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AttributeValue {
    Bool(bool),
    Int(i64),
    String(String),
    List(Vec<AttributeValue>),
}

impl AttributeValue {
    pub fn value_type(&self) -> AttributeType {
        match self {
            AttributeValue::Bool(_) => AttributeType::Bool,
            AttributeValue::Int(_) => AttributeType::Int,
            AttributeValue::String(_) => AttributeType::String,
            AttributeValue::List(_) => AttributeType::List,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            AttributeValue::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            AttributeValue::Int(i) => Some(*i),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            AttributeValue::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[AttributeValue]> {
        match self {
            AttributeValue::List(items) => Some(items),
            _ => None,
        }
    }

    /// List membership; scalars contain nothing
    pub fn contains(&self, needle: &AttributeValue) -> bool {
        self.as_list()
            .map(|items| items.contains(needle))
            .unwrap_or(false)
    }
}

impl fmt::Display for AttributeValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AttributeValue::Bool(b) => write!(f, "{}", b),
            AttributeValue::Int(i) => write!(f, "{}", i),
            AttributeValue::String(s) => write!(f, "{:?}", s),
            AttributeValue::List(items) => {
                f.write_str("[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{}", item)?;
                }
                f.write_str("]")
            }
        }
    }
}

impl From<&str> for AttributeValue {
    fn from(value: &str) -> Self {
        AttributeValue::String(value.to_string())
    }
}

impl From<String> for AttributeValue {
    fn from(value: String) -> Self {
        AttributeValue::String(value)
    }
}

impl From<i64> for AttributeValue {
    fn from(value: i64) -> Self {
        AttributeValue::Int(value)
    }
}

impl From<bool> for AttributeValue {
    fn from(value: bool) -> Self {
        AttributeValue::Bool(value)
    }
}

impl<T: Into<AttributeValue>> From<Vec<T>> for AttributeValue {
    fn from(values: Vec<T>) -> Self {
        AttributeValue::List(values.into_iter().map(Into::into).collect())
    }
}
