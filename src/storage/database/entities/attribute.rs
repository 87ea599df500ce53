use crate::core::models::{AttributeType, AttributeValue};
use crate::utils::error::Result as AuthzResult;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Attribute declared by a service
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "authz_attributes")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub service: String,

    #[sea_orm(primary_key, auto_increment = false)]
    pub name: String,

    /// `string`, `int`, `bool` or `list`
    pub attribute_type: String,

    pub required: bool,

    /// JSON-encoded default value
    pub default_value: Option<String>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::service::Entity",
        from = "Column::Service",
        to = "super::service::Column::Name"
    )]
    Service,
}

impl Related<super::service::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Service.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    /// Convert to the domain model
    pub fn to_domain(self) -> AuthzResult<crate::core::models::Attribute> {
        let attribute_type: AttributeType = self.attribute_type.parse()?;
        let default = self
            .default_value
            .as_deref()
            .map(serde_json::from_str::<AttributeValue>)
            .transpose()?;

        Ok(crate::core::models::Attribute {
            service: self.service,
            name: self.name,
            attribute_type,
            required: self.required,
            default,
        })
    }
}
