use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(AuthzServices::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(AuthzServices::Name)
                            .string_len(128)
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(AuthzServices::DisplayName).string().not_null())
                    .col(
                        ColumnDef::new(AuthzServices::Description)
                            .text()
                            .not_null()
                            .default(""),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(AuthzRoles::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(AuthzRoles::Service).string_len(128).not_null())
                    .col(ColumnDef::new(AuthzRoles::Name).string_len(128).not_null())
                    .col(ColumnDef::new(AuthzRoles::DisplayName).string().not_null())
                    .col(
                        ColumnDef::new(AuthzRoles::IsGlobal)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .primary_key(
                        Index::create()
                            .col(AuthzRoles::Service)
                            .col(AuthzRoles::Name),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_authz_roles_service")
                            .from(AuthzRoles::Table, AuthzRoles::Service)
                            .to(AuthzServices::Table, AuthzServices::Name)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(AuthzAttributes::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(AuthzAttributes::Service)
                            .string_len(128)
                            .not_null(),
                    )
                    .col(ColumnDef::new(AuthzAttributes::Name).string_len(128).not_null())
                    .col(
                        ColumnDef::new(AuthzAttributes::AttributeType)
                            .string_len(16)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(AuthzAttributes::Required)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(ColumnDef::new(AuthzAttributes::DefaultValue).text().null())
                    .primary_key(
                        Index::create()
                            .col(AuthzAttributes::Service)
                            .col(AuthzAttributes::Name),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_authz_attributes_service")
                            .from(AuthzAttributes::Table, AuthzAttributes::Service)
                            .to(AuthzServices::Table, AuthzServices::Name)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(AuthzRoleAssignments::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(AuthzRoleAssignments::SubjectId)
                            .string_len(255)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(AuthzRoleAssignments::Service)
                            .string_len(128)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(AuthzRoleAssignments::Role)
                            .string_len(128)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(AuthzRoleAssignments::GrantedBy)
                            .string_len(255)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(AuthzRoleAssignments::GrantedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(AuthzRoleAssignments::ExpiresAt)
                            .timestamp_with_time_zone()
                            .null(),
                    )
                    .primary_key(
                        Index::create()
                            .col(AuthzRoleAssignments::SubjectId)
                            .col(AuthzRoleAssignments::Service)
                            .col(AuthzRoleAssignments::Role),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(AuthzAttributeValues::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(AuthzAttributeValues::SubjectId)
                            .string_len(255)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(AuthzAttributeValues::Service)
                            .string_len(128)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(AuthzAttributeValues::Name)
                            .string_len(128)
                            .not_null(),
                    )
                    .col(ColumnDef::new(AuthzAttributeValues::Value).text().not_null())
                    .col(
                        ColumnDef::new(AuthzAttributeValues::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .primary_key(
                        Index::create()
                            .col(AuthzAttributeValues::SubjectId)
                            .col(AuthzAttributeValues::Service)
                            .col(AuthzAttributeValues::Name),
                    )
                    .to_owned(),
            )
            .await?;

        // Revocation sweeps scan by role
        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_authz_role_assignments_service_role")
                    .table(AuthzRoleAssignments::Table)
                    .col(AuthzRoleAssignments::Service)
                    .col(AuthzRoleAssignments::Role)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(AuthzAttributeValues::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(AuthzRoleAssignments::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(AuthzAttributes::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(AuthzRoles::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(AuthzServices::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum AuthzServices {
    Table,
    Name,
    DisplayName,
    Description,
}

#[derive(DeriveIden)]
enum AuthzRoles {
    Table,
    Service,
    Name,
    DisplayName,
    IsGlobal,
}

#[derive(DeriveIden)]
enum AuthzAttributes {
    Table,
    Service,
    Name,
    AttributeType,
    Required,
    DefaultValue,
}

#[derive(DeriveIden)]
enum AuthzRoleAssignments {
    Table,
    SubjectId,
    Service,
    Role,
    GrantedBy,
    GrantedAt,
    ExpiresAt,
}

#[derive(DeriveIden)]
enum AuthzAttributeValues {
    Table,
    SubjectId,
    Service,
    Name,
    Value,
    UpdatedAt,
}
