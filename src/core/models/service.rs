//! Service, role and attribute models owned by the identity authority

use super::value::{AttributeType, AttributeValue};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A service that registered a manifest
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Service {
    /// Unique service name
    pub name: String,
    /// Human readable name
    pub display_name: String,
    /// Free-form description
    #[serde(default)]
    pub description: String,
}

/// A role declared by a service
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Role {
    /// Owning service
    pub service: String,
    /// Name, unique within the service
    pub name: String,
    /// Human readable name
    pub display_name: String,
    /// Global roles apply to every resource of the service
    pub is_global: bool,
}

/// An attribute declared by a service
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attribute {
    /// Owning service
    pub service: String,
    /// Name, unique within the service
    pub name: String,
    /// Declared value type; never redefined once registered
    #[serde(rename = "type")]
    pub attribute_type: AttributeType,
    /// Whether every subject is expected to carry a value
    pub required: bool,
    /// Projected into profiles when the subject has no explicit value
    #[serde(default)]
    pub default: Option<AttributeValue>,
}

/// A role granted to a subject
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoleAssignment {
    pub subject_id: String,
    pub service: String,
    pub role: String,
    /// Subject id of the administrator who granted the role
    pub granted_by: String,
    pub granted_at: DateTime<Utc>,
    #[serde(default)]
    pub expires_at: Option<DateTime<Utc>>,
}

impl RoleAssignment {
    /// Whether the assignment still applies at `now`
    pub fn is_active(&self, now: DateTime<Utc>) -> bool {
        self.expires_at.map(|exp| exp > now).unwrap_or(true)
    }
}

/// An attribute value held by a subject
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttributeAssignment {
    pub subject_id: String,
    pub service: String,
    pub name: String,
    pub value: AttributeValue,
    pub updated_at: DateTime<Utc>,
}
