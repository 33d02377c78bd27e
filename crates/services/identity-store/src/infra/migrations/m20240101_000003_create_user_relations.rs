//! Migration: create user claims, logins, role memberships and tokens

use sea_orm_migration::prelude::*;

use super::m20240101_000001_create_users_table::Users;
use super::m20240101_000002_create_roles_table::Roles;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[derive(Iden)]
enum UserClaims {
    Table,
    Id,
    UserId,
    ClaimType,
    ClaimValue,
}

#[derive(Iden)]
enum UserLogins {
    Table,
    LoginProvider,
    ProviderKey,
    ProviderDisplayName,
    UserId,
}

#[derive(Iden)]
enum UserRoles {
    Table,
    UserId,
    RoleId,
}

#[derive(Iden)]
enum UserTokens {
    Table,
    UserId,
    LoginProvider,
    Name,
    Value,
}

fn user_fk(name: &str, table: impl IntoIden + 'static, column: impl IntoIden + 'static) -> ForeignKeyCreateStatement {
    ForeignKey::create()
        .name(name)
        .from(table, column)
        .to(Users::Table, Users::Id)
        .on_delete(ForeignKeyAction::Cascade)
        .to_owned()
}

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(UserClaims::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(UserClaims::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(UserClaims::UserId).big_integer().not_null())
                    .col(ColumnDef::new(UserClaims::ClaimType).text().null())
                    .col(ColumnDef::new(UserClaims::ClaimValue).text().null())
                    .foreign_key(&mut user_fk(
                        "fk_user_claims_user_id",
                        UserClaims::Table,
                        UserClaims::UserId,
                    ))
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_user_claims_user_id")
                    .table(UserClaims::Table)
                    .col(UserClaims::UserId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(UserLogins::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(UserLogins::LoginProvider).string_len(128).not_null())
                    .col(ColumnDef::new(UserLogins::ProviderKey).string_len(128).not_null())
                    .col(ColumnDef::new(UserLogins::ProviderDisplayName).text().null())
                    .col(ColumnDef::new(UserLogins::UserId).big_integer().not_null())
                    .primary_key(
                        Index::create()
                            .col(UserLogins::LoginProvider)
                            .col(UserLogins::ProviderKey),
                    )
                    .foreign_key(&mut user_fk(
                        "fk_user_logins_user_id",
                        UserLogins::Table,
                        UserLogins::UserId,
                    ))
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(UserRoles::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(UserRoles::UserId).big_integer().not_null())
                    .col(ColumnDef::new(UserRoles::RoleId).big_integer().not_null())
                    .primary_key(Index::create().col(UserRoles::UserId).col(UserRoles::RoleId))
                    .foreign_key(&mut user_fk(
                        "fk_user_roles_user_id",
                        UserRoles::Table,
                        UserRoles::UserId,
                    ))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_user_roles_role_id")
                            .from(UserRoles::Table, UserRoles::RoleId)
                            .to(Roles::Table, Roles::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(UserTokens::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(UserTokens::UserId).big_integer().not_null())
                    .col(ColumnDef::new(UserTokens::LoginProvider).string_len(128).not_null())
                    .col(ColumnDef::new(UserTokens::Name).string_len(128).not_null())
                    .col(ColumnDef::new(UserTokens::Value).text().null())
                    .primary_key(
                        Index::create()
                            .col(UserTokens::UserId)
                            .col(UserTokens::LoginProvider)
                            .col(UserTokens::Name),
                    )
                    .foreign_key(&mut user_fk(
                        "fk_user_tokens_user_id",
                        UserTokens::Table,
                        UserTokens::UserId,
                    ))
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(UserTokens::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(UserRoles::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(UserLogins::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(UserClaims::Table).to_owned())
            .await
    }
}
