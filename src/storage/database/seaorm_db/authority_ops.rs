use crate::auth::authority::AuthorityStore;
use crate::core::models::{Attribute, AttributeAssignment, Role, RoleAssignment, Service};
use crate::utils::error::Result;
use async_trait::async_trait;
use sea_orm::sea_query::OnConflict;
use sea_orm::*;
use tracing::debug;

use super::super::entities::{self, attribute, attribute_value, role, role_assignment, service};
use super::types::SeaOrmDatabase;

async fn upsert_service<C: ConnectionTrait>(conn: &C, record: &Service) -> Result<()> {
    let model = service::ActiveModel {
        name: Set(record.name.clone()),
        display_name: Set(record.display_name.clone()),
        description: Set(record.description.clone()),
    };
    entities::Service::insert(model)
        .on_conflict(
            OnConflict::column(service::Column::Name)
                .update_columns([service::Column::DisplayName, service::Column::Description])
                .to_owned(),
        )
        .exec_without_returning(conn)
        .await?;
    Ok(())
}

async fn upsert_role<C: ConnectionTrait>(conn: &C, record: &Role) -> Result<()> {
    let model = role::ActiveModel {
        service: Set(record.service.clone()),
        name: Set(record.name.clone()),
        display_name: Set(record.display_name.clone()),
        is_global: Set(record.is_global),
    };
    entities::Role::insert(model)
        .on_conflict(
            OnConflict::columns([role::Column::Service, role::Column::Name])
                .update_columns([role::Column::DisplayName, role::Column::IsGlobal])
                .to_owned(),
        )
        .exec_without_returning(conn)
        .await?;
    Ok(())
}

async fn upsert_attribute<C: ConnectionTrait>(conn: &C, record: &Attribute) -> Result<()> {
    let default_value = record
        .default
        .as_ref()
        .map(serde_json::to_string)
        .transpose()?;
    let model = attribute::ActiveModel {
        service: Set(record.service.clone()),
        name: Set(record.name.clone()),
        attribute_type: Set(record.attribute_type.as_str().to_string()),
        required: Set(record.required),
        default_value: Set(default_value),
    };
    // An attribute type is never rewritten once stored.
    entities::Attribute::insert(model)
        .on_conflict(
            OnConflict::columns([attribute::Column::Service, attribute::Column::Name])
                .update_columns([attribute::Column::Required, attribute::Column::DefaultValue])
                .to_owned(),
        )
        .exec_without_returning(conn)
        .await?;
    Ok(())
}

#[async_trait]
impl AuthorityStore for SeaOrmDatabase {
    async fn find_service(&self, name: &str) -> Result<Option<Service>> {
        debug!("Finding service: {}", name);
        let model = entities::Service::find_by_id(name.to_string())
            .one(&self.db)
            .await?;
        Ok(model.map(Service::from))
    }

    async fn list_services(&self) -> Result<Vec<Service>> {
        let models = entities::Service::find()
            .order_by_asc(service::Column::Name)
            .all(&self.db)
            .await?;
        Ok(models.into_iter().map(Service::from).collect())
    }

    async fn list_roles(&self, service_name: &str) -> Result<Vec<Role>> {
        let models = entities::Role::find()
            .filter(role::Column::Service.eq(service_name))
            .order_by_asc(role::Column::Name)
            .all(&self.db)
            .await?;
        Ok(models.into_iter().map(Role::from).collect())
    }

    async fn list_attributes(&self, service_name: &str) -> Result<Vec<Attribute>> {
        let models = entities::Attribute::find()
            .filter(attribute::Column::Service.eq(service_name))
            .order_by_asc(attribute::Column::Name)
            .all(&self.db)
            .await?;
        models.into_iter().map(attribute::Model::to_domain).collect()
    }

    async fn save_declarations(
        &self,
        record: &Service,
        roles: &[Role],
        attributes: &[Attribute],
    ) -> Result<()> {
        let txn = self.db.begin().await?;
        upsert_service(&txn, record).await?;
        for r in roles {
            upsert_role(&txn, r).await?;
        }
        for a in attributes {
            upsert_attribute(&txn, a).await?;
        }
        txn.commit().await?;
        debug!(
            "Saved declarations for '{}': {} roles, {} attributes",
            record.name,
            roles.len(),
            attributes.len()
        );
        Ok(())
    }

    async fn upsert_role_assignment(&self, assignment: &RoleAssignment) -> Result<()> {
        let model = role_assignment::ActiveModel {
            subject_id: Set(assignment.subject_id.clone()),
            service: Set(assignment.service.clone()),
            role: Set(assignment.role.clone()),
            granted_by: Set(assignment.granted_by.clone()),
            granted_at: Set(assignment.granted_at),
            expires_at: Set(assignment.expires_at),
        };
        entities::RoleAssignment::insert(model)
            .on_conflict(
                OnConflict::columns([
                    role_assignment::Column::SubjectId,
                    role_assignment::Column::Service,
                    role_assignment::Column::Role,
                ])
                .update_columns([
                    role_assignment::Column::GrantedBy,
                    role_assignment::Column::GrantedAt,
                    role_assignment::Column::ExpiresAt,
                ])
                .to_owned(),
            )
            .exec_without_returning(&self.db)
            .await?;
        Ok(())
    }

    async fn delete_role_assignment(
        &self,
        subject_id: &str,
        service_name: &str,
        role_name: &str,
    ) -> Result<bool> {
        let result = entities::RoleAssignment::delete_many()
            .filter(role_assignment::Column::SubjectId.eq(subject_id))
            .filter(role_assignment::Column::Service.eq(service_name))
            .filter(role_assignment::Column::Role.eq(role_name))
            .exec(&self.db)
            .await?;
        Ok(result.rows_affected > 0)
    }

    async fn list_role_assignments(
        &self,
        subject_id: &str,
        service_name: &str,
    ) -> Result<Vec<RoleAssignment>> {
        let models = entities::RoleAssignment::find()
            .filter(role_assignment::Column::SubjectId.eq(subject_id))
            .filter(role_assignment::Column::Service.eq(service_name))
            .order_by_asc(role_assignment::Column::Role)
            .all(&self.db)
            .await?;
        Ok(models.into_iter().map(RoleAssignment::from).collect())
    }

    async fn upsert_attribute_value(&self, value: &AttributeAssignment) -> Result<()> {
        let model = attribute_value::ActiveModel {
            subject_id: Set(value.subject_id.clone()),
            service: Set(value.service.clone()),
            name: Set(value.name.clone()),
            value: Set(serde_json::to_string(&value.value)?),
            updated_at: Set(value.updated_at),
        };
        entities::AttributeValue::insert(model)
            .on_conflict(
                OnConflict::columns([
                    attribute_value::Column::SubjectId,
                    attribute_value::Column::Service,
                    attribute_value::Column::Name,
                ])
                .update_columns([
                    attribute_value::Column::Value,
                    attribute_value::Column::UpdatedAt,
                ])
                .to_owned(),
            )
            .exec_without_returning(&self.db)
            .await?;
        Ok(())
    }

    async fn delete_attribute_value(
        &self,
        subject_id: &str,
        service_name: &str,
        name: &str,
    ) -> Result<bool> {
        let result = entities::AttributeValue::delete_many()
            .filter(attribute_value::Column::SubjectId.eq(subject_id))
            .filter(attribute_value::Column::Service.eq(service_name))
            .filter(attribute_value::Column::Name.eq(name))
            .exec(&self.db)
            .await?;
        Ok(result.rows_affected > 0)
    }

    async fn list_attribute_values(
        &self,
        subject_id: &str,
        service_name: &str,
    ) -> Result<Vec<AttributeAssignment>> {
        let models = entities::AttributeValue::find()
            .filter(attribute_value::Column::SubjectId.eq(subject_id))
            .filter(attribute_value::Column::Service.eq(service_name))
            .order_by_asc(attribute_value::Column::Name)
            .all(&self.db)
            .await?;
        models
            .into_iter()
            .map(attribute_value::Model::to_domain)
            .collect()
    }
}
