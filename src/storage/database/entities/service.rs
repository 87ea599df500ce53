use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Registered service
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "authz_services")]
pub struct Model {
    /// Unique service name
    #[sea_orm(primary_key, auto_increment = false)]
    pub name: String,

    pub display_name: String,

    pub description: String,
}

/// Service entity relations
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Roles declared by the service
    #[sea_orm(has_many = "super::role::Entity")]
    Role,
    /// Attributes declared by the service
    #[sea_orm(has_many = "super::attribute::Entity")]
    Attribute,
}

impl Related<super::role::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Role.def()
    }
}

impl Related<super::attribute::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Attribute.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl From<Model> for crate::core::models::Service {
    fn from(model: Model) -> Self {
        Self {
            name: model.name,
            display_name: model.display_name,
            description: model.description,
        }
    }
}
