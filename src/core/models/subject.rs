//! Subject attributes and the cached profile projection

use super::value::AttributeValue;
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// Roles and attributes of one subject within one service
///
/// This is what policies see. It carries no timing information.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubjectAttributes {
    pub subject_id: String,
    pub service: String,
    #[serde(default)]
    pub roles: BTreeSet<String>,
    #[serde(default)]
    pub attributes: BTreeMap<String, AttributeValue>,
}

impl SubjectAttributes {
    pub fn new(subject_id: impl Into<String>, service: impl Into<String>) -> Self {
        Self {
            subject_id: subject_id.into(),
            service: service.into(),
            roles: BTreeSet::new(),
            attributes: BTreeMap::new(),
        }
    }

    /// A subject with no roles and no attributes
    ///
    /// Used when the attribute cache is unavailable so that every
    /// attribute-dependent policy denies.
    pub fn empty(subject_id: impl Into<String>, service: impl Into<String>) -> Self {
        Self::new(subject_id, service)
    }

    pub fn with_role(mut self, role: impl Into<String>) -> Self {
        self.roles.insert(role.into());
        self
    }

    pub fn with_attribute(mut self, name: impl Into<String>, value: impl Into<AttributeValue>) -> Self {
        self.attributes.insert(name.into(), value.into());
        self
    }

    pub fn id(&self) -> &str {
        &self.subject_id
    }

    pub fn has_role(&self, role: &str) -> bool {
        self.roles.contains(role)
    }

    pub fn attribute(&self, name: &str) -> Option<&AttributeValue> {
        self.attributes.get(name)
    }

    pub fn attribute_str(&self, name: &str) -> Option<&str> {
        self.attribute(name).and_then(AttributeValue::as_str)
    }

    /// Members of a list attribute; empty when absent or not a list
    pub fn attribute_list(&self, name: &str) -> &[AttributeValue] {
        self.attribute(name)
            .and_then(AttributeValue::as_list)
            .unwrap_or(&[])
    }

    /// True when the subject carries neither roles nor attributes
    pub fn is_empty(&self) -> bool {
        self.roles.is_empty() && self.attributes.is_empty()
    }
}

/// Derived, TTL-bound projection of a subject's roles and attributes
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CachedProfile {
    #[serde(flatten)]
    pub subject: SubjectAttributes,
    pub cached_at: DateTime<Utc>,
    pub ttl_secs: u64,
}

impl CachedProfile {
    pub fn new(subject: SubjectAttributes, cached_at: DateTime<Utc>, ttl: std::time::Duration) -> Self {
        Self {
            subject,
            cached_at,
            ttl_secs: ttl.as_secs(),
        }
    }

    pub fn expires_at(&self) -> DateTime<Utc> {
        i64::try_from(self.ttl_secs)
            .ok()
            .and_then(Duration::try_seconds)
            .and_then(|ttl| self.cached_at.checked_add_signed(ttl))
            .unwrap_or(DateTime::<Utc>::MAX_UTC)
    }

    /// A profile at or past its TTL must be treated as absent
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at()
    }

    /// Seconds left before expiry, zero when already expired
    pub fn remaining_ttl(&self, now: DateTime<Utc>) -> u64 {
        (self.expires_at() - now).num_seconds().max(0) as u64
    }

    pub fn subject_id(&self) -> &str {
        &self.subject.subject_id
    }

    pub fn service(&self) -> &str {
        &self.subject.service
    }

    pub fn attributes(&self) -> &SubjectAttributes {
        &self.subject
    }

    /// Same content, fresh timestamp
    pub fn refreshed(mut self, now: DateTime<Utc>, ttl: std::time::Duration) -> Self {
        self.cached_at = now;
        self.ttl_secs = ttl.as_secs();
        self
    }
}
