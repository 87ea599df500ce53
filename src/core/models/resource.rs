//! Resource capability interface
//!
//! Domain models opt into authorization by implementing [`Authorizable`]. The
//! evaluator and the filter translator only ever see this trait.

use super::value::AttributeValue;
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

/// Well-known field names understood by [`Authorizable::lookup`]
pub mod fields {
    pub const RESOURCE_ID: &str = "resource_id";
    pub const OWNER_ID: &str = "owner_id";
    pub const GROUP_ID: &str = "group_id";
}

/// A resource kind and its static action → policy mapping
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceType {
    kind: String,
    actions: HashMap<String, String>,
}

impl ResourceType {
    pub fn new(kind: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            actions: HashMap::new(),
        }
    }

    /// Map `action` to the policy named `policy`
    pub fn action(mut self, action: impl Into<String>, policy: impl Into<String>) -> Self {
        self.actions.insert(action.into(), policy.into());
        self
    }

    pub fn kind(&self) -> &str {
        &self.kind
    }

    /// Policy declared for `action`, if any
    pub fn policy_for(&self, action: &str) -> Option<&str> {
        self.actions.get(action).map(String::as_str)
    }

    /// Declared actions, sorted
    pub fn actions(&self) -> Vec<&str> {
        let mut actions: Vec<&str> = self.actions.keys().map(String::as_str).collect();
        actions.sort_unstable();
        actions
    }
}

/// Capability implemented by every resource that can be authorized
pub trait Authorizable {
    /// Kind and action-policy map shared by all instances of the type
    fn resource_type(&self) -> &ResourceType;

    fn resource_id(&self) -> &str;

    fn owner_id(&self) -> Option<&str> {
        None
    }

    fn group_id(&self) -> Option<&str> {
        None
    }

    /// Domain field by name
    fn field(&self, _name: &str) -> Option<AttributeValue> {
        None
    }

    fn kind(&self) -> &str {
        self.resource_type().kind()
    }

    /// Resolve a field the way predicates name it
    ///
    /// `resource_id`, `owner_id` and `group_id` map to the dedicated accessors;
    /// everything else goes through [`Authorizable::field`].
    fn lookup(&self, name: &str) -> Option<AttributeValue> {
        match name {
            fields::RESOURCE_ID => Some(AttributeValue::from(self.resource_id())),
            fields::OWNER_ID => self.owner_id().map(AttributeValue::from),
            fields::GROUP_ID => self.group_id().map(AttributeValue::from),
            _ => self.field(name),
        }
    }
}

/// A schemaless resource row
///
/// Useful when rows arrive as generic records, e.g. from a bounded scan.
#[derive(Debug, Clone)]
pub struct ResourceRecord {
    resource_type: Arc<ResourceType>,
    resource_id: String,
    owner_id: Option<String>,
    group_id: Option<String>,
    fields: BTreeMap<String, AttributeValue>,
}

impl ResourceRecord {
    pub fn new(resource_type: Arc<ResourceType>, resource_id: impl Into<String>) -> Self {
        Self {
            resource_type,
            resource_id: resource_id.into(),
            owner_id: None,
            group_id: None,
            fields: BTreeMap::new(),
        }
    }

    pub fn owned_by(mut self, owner_id: impl Into<String>) -> Self {
        self.owner_id = Some(owner_id.into());
        self
    }

    pub fn in_group(mut self, group_id: impl Into<String>) -> Self {
        self.group_id = Some(group_id.into());
        self
    }

    pub fn with_field(mut self, name: impl Into<String>, value: impl Into<AttributeValue>) -> Self {
        self.fields.insert(name.into(), value.into());
        self
    }

    pub fn set_field(&mut self, name: impl Into<String>, value: impl Into<AttributeValue>) {
        self.fields.insert(name.into(), value.into());
    }
}

impl Authorizable for ResourceRecord {
    fn resource_type(&self) -> &ResourceType {
        &self.resource_type
    }

    fn resource_id(&self) -> &str {
        &self.resource_id
    }

    fn owner_id(&self) -> Option<&str> {
        self.owner_id.as_deref()
    }

    fn group_id(&self) -> Option<&str> {
        self.group_id.as_deref()
    }

    fn field(&self, name: &str) -> Option<AttributeValue> {
        self.fields.get(name).cloned()
    }
}
