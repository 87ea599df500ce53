use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Role granted to a subject
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "authz_role_assignments")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub subject_id: String,

    #[sea_orm(primary_key, auto_increment = false)]
    pub service: String,

    #[sea_orm(primary_key, auto_increment = false)]
    pub role: String,

    pub granted_by: String,

    pub granted_at: DateTimeUtc,

    /// Open-ended when null
    pub expires_at: Option<DateTimeUtc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl From<Model> for crate::core::models::RoleAssignment {
    fn from(model: Model) -> Self {
        Self {
            subject_id: model.subject_id,
            service: model.service,
            role: model.role,
            granted_by: model.granted_by,
            granted_at: model.granted_at,
            expires_at: model.expires_at,
        }
    }
}
