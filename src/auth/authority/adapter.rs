//! Identity authority adapter
//!
//! Owns the ground truth for roles and attributes. Every mutation is followed
//! by removal of the shared-tier profile and an invalidation broadcast; the
//! mutation is not rolled back if either fails.

use super::manifest::{ManifestReport, ServiceManifest};
use super::store::AuthorityStore;
use crate::core::models::{
    Attribute, AttributeAssignment, AttributeValue, Role, RoleAssignment, Service,
    SubjectAttributes,
};
use crate::core::profile_cache::{InvalidationBus, InvalidationEvent, ProfileSource, ProfileStore};
use crate::utils::error::{AuthzError, Result};
use crate::utils::time::SharedClock;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use tracing::{debug, error, info, warn};

/// Adapter over the authority store with cache invalidation on writes
#[derive(Clone)]
pub struct IdentityAuthority {
    store: Arc<dyn AuthorityStore>,
    shared_profiles: Arc<dyn ProfileStore>,
    bus: Arc<dyn InvalidationBus>,
    clock: SharedClock,
}

impl IdentityAuthority {
    pub fn new(
        store: Arc<dyn AuthorityStore>,
        shared_profiles: Arc<dyn ProfileStore>,
        bus: Arc<dyn InvalidationBus>,
        clock: SharedClock,
    ) -> Self {
        Self {
            store,
            shared_profiles,
            bus,
            clock,
        }
    }

    pub fn store(&self) -> &Arc<dyn AuthorityStore> {
        &self.store
    }

    /// Register or update a service's declarations
    ///
    /// Additive and idempotent. Redefining the type of an existing attribute
    /// fails with `ManifestConflict` and writes nothing.
    pub async fn register_manifest(&self, manifest: &ServiceManifest) -> Result<ManifestReport> {
        manifest.validate()?;
        let (service, roles, attributes) = manifest.to_records();

        let existing_service = self.store.find_service(&service.name).await?;
        let existing_roles: HashMap<String, _> = self
            .store
            .list_roles(&service.name)
            .await?
            .into_iter()
            .map(|r| (r.name.clone(), r))
            .collect();
        let existing_attributes: HashMap<String, _> = self
            .store
            .list_attributes(&service.name)
            .await?
            .into_iter()
            .map(|a| (a.name.clone(), a))
            .collect();

        let mut report = ManifestReport {
            service: service.name.clone(),
            ..ManifestReport::default()
        };

        let mut attributes_to_write = Vec::new();
        for attribute in attributes {
            match existing_attributes.get(&attribute.name) {
                Some(current) if current.attribute_type != attribute.attribute_type => {
                    return Err(AuthzError::manifest_conflict(format!(
                        "attribute '{}' of service '{}' is declared as {} and cannot become {}",
                        attribute.name, service.name, current.attribute_type, attribute.attribute_type
                    )));
                }
                Some(current) if *current == attribute => {}
                Some(_) => {
                    report.attributes_updated.push(attribute.name.clone());
                    attributes_to_write.push(attribute);
                }
                None => {
                    report.attributes_created.push(attribute.name.clone());
                    attributes_to_write.push(attribute);
                }
            }
        }

        let mut roles_to_write = Vec::new();
        for role in roles {
            match existing_roles.get(&role.name) {
                Some(current) if *current == role => {}
                Some(_) => {
                    report.roles_updated.push(role.name.clone());
                    roles_to_write.push(role);
                }
                None => {
                    report.roles_created.push(role.name.clone());
                    roles_to_write.push(role);
                }
            }
        }

        match &existing_service {
            None => report.service_created = true,
            Some(current) if *current != service => report.service_updated = true,
            Some(_) => {}
        }

        let declared: Vec<&str> = manifest
            .roles
            .iter()
            .map(|r| r.name.as_str())
            .chain(manifest.attributes.iter().map(|a| a.name.as_str()))
            .collect();
        report.retained = existing_roles
            .keys()
            .chain(existing_attributes.keys())
            .filter(|name| !declared.contains(&name.as_str()))
            .cloned()
            .collect();
        report.retained.sort();

        if report.is_noop() {
            debug!("Manifest for '{}' unchanged", service.name);
            return Ok(report);
        }

        self.store
            .save_declarations(&service, &roles_to_write, &attributes_to_write)
            .await?;

        info!(
            "Registered manifest for '{}': {} roles created, {} updated; {} attributes created, {} updated",
            service.name,
            report.roles_created.len(),
            report.roles_updated.len(),
            report.attributes_created.len(),
            report.attributes_updated.len()
        );
        Ok(report)
    }

    /// Grant a declared role
    pub async fn grant_role(
        &self,
        subject_id: &str,
        role: &str,
        service: &str,
        granted_by: &str,
        expires_at: Option<DateTime<Utc>>,
    ) -> Result<RoleAssignment> {
        require_subject(subject_id)?;
        self.require_service(service).await?;
        let declared = self.store.list_roles(service).await?;
        if !declared.iter().any(|r| r.name == role) {
            return Err(AuthzError::not_found(format!(
                "role '{}' is not declared by service '{}'",
                role, service
            )));
        }

        let now = self.clock.now();
        if let Some(expiry) = expires_at {
            if expiry <= now {
                return Err(AuthzError::validation(format!(
                    "expiry {} is not in the future",
                    expiry
                )));
            }
        }

        let assignment = RoleAssignment {
            subject_id: subject_id.to_string(),
            service: service.to_string(),
            role: role.to_string(),
            granted_by: granted_by.to_string(),
            granted_at: now,
            expires_at,
        };
        self.store.upsert_role_assignment(&assignment).await?;
        info!(
            "Granted role '{}' in '{}' to {} (by {})",
            role, service, subject_id, granted_by
        );

        self.invalidate(subject_id, service).await;
        Ok(assignment)
    }

    /// Revoke a role; returns whether the subject held it
    pub async fn revoke_role(&self, subject_id: &str, role: &str, service: &str) -> Result<bool> {
        require_subject(subject_id)?;
        let removed = self
            .store
            .delete_role_assignment(subject_id, service, role)
            .await?;
        if removed {
            info!("Revoked role '{}' in '{}' from {}", role, service, subject_id);
        } else {
            debug!("{} did not hold role '{}' in '{}'", subject_id, role, service);
        }

        self.invalidate(subject_id, service).await;
        Ok(removed)
    }

    /// Set a declared attribute; the value must match the declared type
    pub async fn set_attribute(
        &self,
        subject_id: &str,
        service: &str,
        name: &str,
        value: AttributeValue,
    ) -> Result<AttributeAssignment> {
        require_subject(subject_id)?;
        self.require_service(service).await?;
        let declared = self
            .store
            .list_attributes(service)
            .await?
            .into_iter()
            .find(|a| a.name == name)
            .ok_or_else(|| {
                AuthzError::not_found(format!(
                    "attribute '{}' is not declared by service '{}'",
                    name, service
                ))
            })?;
        if !declared.attribute_type.accepts(&value) {
            return Err(AuthzError::validation(format!(
                "attribute '{}' expects a {} value, got {}",
                name,
                declared.attribute_type,
                value.value_type()
            )));
        }

        let assignment = AttributeAssignment {
            subject_id: subject_id.to_string(),
            service: service.to_string(),
            name: name.to_string(),
            value,
            updated_at: self.clock.now(),
        };
        self.store.upsert_attribute_value(&assignment).await?;
        info!("Set attribute '{}' in '{}' for {}", name, service, subject_id);

        self.invalidate(subject_id, service).await;
        Ok(assignment)
    }

    /// Set an attribute from its textual form, parsed by the declared type
    pub async fn set_attribute_str(
        &self,
        subject_id: &str,
        service: &str,
        name: &str,
        raw: &str,
    ) -> Result<AttributeAssignment> {
        let declared = self
            .store
            .list_attributes(service)
            .await?
            .into_iter()
            .find(|a| a.name == name)
            .ok_or_else(|| {
                AuthzError::not_found(format!(
                    "attribute '{}' is not declared by service '{}'",
                    name, service
                ))
            })?;
        let value = declared.attribute_type.parse_value(raw)?;
        self.set_attribute(subject_id, service, name, value).await
    }

    /// Remove an explicit attribute value; the declared default applies again
    pub async fn clear_attribute(&self, subject_id: &str, service: &str, name: &str) -> Result<bool> {
        require_subject(subject_id)?;
        let removed = self
            .store
            .delete_attribute_value(subject_id, service, name)
            .await?;
        if removed {
            info!("Cleared attribute '{}' in '{}' for {}", name, service, subject_id);
        }

        self.invalidate(subject_id, service).await;
        Ok(removed)
    }

    /// Project a subject's active roles and attributes within one service
    ///
    /// Expired role assignments are skipped. Declared attributes without an
    /// explicit value take their default when one is declared.
    pub async fn load_profile(&self, subject_id: &str, service: &str) -> Result<SubjectAttributes> {
        let mut subject = SubjectAttributes::new(subject_id, service);
        if self.store.find_service(service).await?.is_none() {
            debug!("Service '{}' is not registered; empty profile", service);
            return Ok(subject);
        }

        let now = self.clock.now();
        for assignment in self.store.list_role_assignments(subject_id, service).await? {
            if assignment.is_active(now) {
                subject.roles.insert(assignment.role);
            } else {
                debug!(
                    "Skipping expired role '{}' for {} in '{}'",
                    assignment.role, subject_id, service
                );
            }
        }

        let declared = self.store.list_attributes(service).await?;
        let mut values: HashMap<String, AttributeValue> = self
            .store
            .list_attribute_values(subject_id, service)
            .await?
            .into_iter()
            .map(|v| (v.name, v.value))
            .collect();

        for attribute in declared {
            match values.remove(&attribute.name) {
                Some(value) if attribute.attribute_type.accepts(&value) => {
                    subject.attributes.insert(attribute.name, value);
                }
                Some(value) => {
                    warn!(
                        "Ignoring stored '{}' for {}: {} is not a {}",
                        attribute.name,
                        subject_id,
                        value.value_type(),
                        attribute.attribute_type
                    );
                }
                None => {
                    if let Some(default) = attribute.default {
                        subject.attributes.insert(attribute.name, default);
                    }
                }
            }
        }

        Ok(subject)
    }

    /// Remove the shared profile and tell every process to drop its copy
    pub async fn invalidate(&self, subject_id: &str, service: &str) {
        let event = InvalidationEvent::new(subject_id, service);
        if let Err(e) = self.shared_profiles.delete(&event.key()).await {
            error!(
                "Failed to remove shared profile for {}/{}: {}",
                service, subject_id, e
            );
        }
        if let Err(e) = self.bus.publish(&event).await {
            error!(
                "Failed to publish invalidation for {}/{}: {}",
                service, subject_id, e
            );
        }
    }

    pub async fn service(&self, name: &str) -> Result<Option<Service>> {
        self.store.find_service(name).await
    }

    /// Declared roles of a registered service
    pub async fn roles(&self, service: &str) -> Result<Vec<Role>> {
        self.require_service(service).await?;
        self.store.list_roles(service).await
    }

    /// Declared attributes of a registered service
    pub async fn attributes(&self, service: &str) -> Result<Vec<Attribute>> {
        self.require_service(service).await?;
        self.store.list_attributes(service).await
    }

    async fn require_service(&self, service: &str) -> Result<()> {
        match self.store.find_service(service).await? {
            Some(_) => Ok(()),
            None => Err(AuthzError::not_found(format!(
                "service '{}' is not registered",
                service
            ))),
        }
    }
}

fn require_subject(subject_id: &str) -> Result<()> {
    if subject_id.trim().is_empty() {
        return Err(AuthzError::validation("subject id cannot be empty"));
    }
    Ok(())
}

#[async_trait]
impl ProfileSource for IdentityAuthority {
    async fn load_subject(&self, subject_id: &str, service: &str) -> Result<SubjectAttributes> {
        self.load_profile(subject_id, service).await
    }
}

impl fmt::Debug for IdentityAuthority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IdentityAuthority").finish_non_exhaustive()
    }
}
