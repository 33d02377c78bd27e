//! Migration: create roles table

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[derive(Iden)]
pub(super) enum Roles {
    Table,
    Id,
    Name,
    NormalizedName,
    ConcurrencyStamp,
}

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Roles::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Roles::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Roles::Name).string_len(256).null())
                    .col(ColumnDef::new(Roles::NormalizedName).string_len(256).null())
                    .col(ColumnDef::new(Roles::ConcurrencyStamp).text().null())
                    .to_owned(),
            )
            .await?;

        // Role lookups go through the normalized name
        manager
            .create_index(
                Index::create()
                    .name("idx_roles_normalized_name")
                    .table(Roles::Table)
                    .col(Roles::NormalizedName)
                    .unique()
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Roles::Table).to_owned())
            .await
    }
}
