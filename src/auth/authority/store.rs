//! Ground-truth storage for the identity authority

use crate::core::models::{Attribute, AttributeAssignment, Role, RoleAssignment, Service};
use crate::utils::error::Result;
use async_trait::async_trait;

/// Persistence seam for services, declarations and assignments
///
/// Listings are ordered by name so projections are deterministic.
#[async_trait]
pub trait AuthorityStore: Send + Sync {
    async fn find_service(&self, name: &str) -> Result<Option<Service>>;

    async fn list_services(&self) -> Result<Vec<Service>>;

    async fn list_roles(&self, service: &str) -> Result<Vec<Role>>;

    async fn list_attributes(&self, service: &str) -> Result<Vec<Attribute>>;

    /// Upsert a service and the given declarations in one unit
    async fn save_declarations(
        &self,
        service: &Service,
        roles: &[Role],
        attributes: &[Attribute],
    ) -> Result<()>;

    async fn upsert_role_assignment(&self, assignment: &RoleAssignment) -> Result<()>;

    /// Returns whether an assignment was removed
    async fn delete_role_assignment(&self, subject_id: &str, service: &str, role: &str)
    -> Result<bool>;

    async fn list_role_assignments(
        &self,
        subject_id: &str,
        service: &str,
    ) -> Result<Vec<RoleAssignment>>;

    async fn upsert_attribute_value(&self, value: &AttributeAssignment) -> Result<()>;

    /// Returns whether a value was removed
    async fn delete_attribute_value(&self, subject_id: &str, service: &str, name: &str)
    -> Result<bool>;

    async fn list_attribute_values(
        &self,
        subject_id: &str,
        service: &str,
    ) -> Result<Vec<AttributeAssignment>>;
}
