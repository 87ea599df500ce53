use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Role declared by a service
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "authz_roles")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub service: String,

    #[sea_orm(primary_key, auto_increment = false)]
    pub name: String,

    pub display_name: String,

    pub is_global: bool,
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

impl From<Model> for crate::core::models::Role {
    fn from(model: Model) -> Self {
        Self {
            service: model.service,
            name: model.name,
            display_name: model.display_name,
            is_global: model.is_global,
        }
    }
}
