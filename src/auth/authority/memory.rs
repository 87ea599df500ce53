//! In-memory authority store

use super::store::AuthorityStore;
use crate::core::models::{Attribute, AttributeAssignment, Role, RoleAssignment, Service};
use crate::utils::error::Result;
use async_trait::async_trait;
use parking_lot::RwLock;
use std::collections::BTreeMap;

type ServiceKey = (String, String);
type SubjectKey = (String, String, String);

#[derive(Debug, Default)]
struct State {
    services: BTreeMap<String, Service>,
    roles: BTreeMap<ServiceKey, Role>,
    attributes: BTreeMap<ServiceKey, Attribute>,
    role_assignments: BTreeMap<SubjectKey, RoleAssignment>,
    attribute_values: BTreeMap<SubjectKey, AttributeAssignment>,
}

/// Authority state held in process; used when no database is configured
#[derive(Debug, Default)]
pub struct MemoryAuthorityStore {
    state: RwLock<State>,
}

impl MemoryAuthorityStore {
    pub fn new() -> Self {
        Self::default()
    }
}

fn subject_key(subject_id: &str, service: &str, name: &str) -> SubjectKey {
    (subject_id.to_string(), service.to_string(), name.to_string())
}

#[async_trait]
impl AuthorityStore for MemoryAuthorityStore {
    async fn find_service(&self, name: &str) -> Result<Option<Service>> {
        Ok(self.state.read().services.get(name).cloned())
    }

    async fn list_services(&self) -> Result<Vec<Service>> {
        Ok(self.state.read().services.values().cloned().collect())
    }

    async fn list_roles(&self, service: &str) -> Result<Vec<Role>> {
        Ok(self
            .state
            .read()
            .roles
            .values()
            .filter(|r| r.service == service)
            .cloned()
            .collect())
    }

    async fn list_attributes(&self, service: &str) -> Result<Vec<Attribute>> {
        Ok(self
            .state
            .read()
            .attributes
            .values()
            .filter(|a| a.service == service)
            .cloned()
            .collect())
    }

    async fn save_declarations(
        &self,
        service: &Service,
        roles: &[Role],
        attributes: &[Attribute],
    ) -> Result<()> {
        let mut state = self.state.write();
        state.services.insert(service.name.clone(), service.clone());
        for role in roles {
            state
                .roles
                .insert((role.service.clone(), role.name.clone()), role.clone());
        }
        for attribute in attributes {
            state.attributes.insert(
                (attribute.service.clone(), attribute.name.clone()),
                attribute.clone(),
            );
        }
        Ok(())
    }

    async fn upsert_role_assignment(&self, assignment: &RoleAssignment) -> Result<()> {
        self.state.write().role_assignments.insert(
            subject_key(&assignment.subject_id, &assignment.service, &assignment.role),
            assignment.clone(),
        );
        Ok(())
    }

    async fn delete_role_assignment(
        &self,
        subject_id: &str,
        service: &str,
        role: &str,
    ) -> Result<bool> {
        Ok(self
            .state
            .write()
            .role_assignments
            .remove(&subject_key(subject_id, service, role))
            .is_some())
    }

    async fn list_role_assignments(
        &self,
        subject_id: &str,
        service: &str,
    ) -> Result<Vec<RoleAssignment>> {
        Ok(self
            .state
            .read()
            .role_assignments
            .values()
            .filter(|a| a.subject_id == subject_id && a.service == service)
            .cloned()
            .collect())
    }

    async fn upsert_attribute_value(&self, value: &AttributeAssignment) -> Result<()> {
        self.state.write().attribute_values.insert(
            subject_key(&value.subject_id, &value.service, &value.name),
            value.clone(),
        );
        Ok(())
    }

    async fn delete_attribute_value(
        &self,
        subject_id: &str,
        service: &str,
        name: &str,
    ) -> Result<bool> {
        Ok(self
            .state
            .write()
            .attribute_values
            .remove(&subject_key(subject_id, service, name))
            .is_some())
    }

    async fn list_attribute_values(
        &self,
        subject_id: &str,
        service: &str,
    ) -> Result<Vec<AttributeAssignment>> {
        Ok(self
            .state
            .read()
            .attribute_values
            .values()
            .filter(|v| v.subject_id == subject_id && v.service == service)
            .cloned()
            .collect())
    }
}
