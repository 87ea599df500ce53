use crate::core::models::{AttributeAssignment, AttributeValue};
use crate::utils::error::Result as AuthzResult;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Attribute value held by a subject
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "authz_attribute_values")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub subject_id: String,

    #[sea_orm(primary_key, auto_increment = false)]
    pub service: String,

    #[sea_orm(primary_key, auto_increment = false)]
    pub name: String,

    /// JSON-encoded value
    pub value: String,

    pub updated_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    /// Convert to the domain model
    pub fn to_domain(self) -> AuthzResult<AttributeAssignment> {
        let value: AttributeValue = serde_json::from_str(&self.value)?;
        Ok(AttributeAssignment {
            subject_id: self.subject_id,
            service: self.service,
            name: self.name,
            value,
            updated_at: self.updated_at,
        })
    }
}
