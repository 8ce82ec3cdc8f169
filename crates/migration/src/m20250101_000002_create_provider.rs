//! Create `provider` table.
//!
//! Business accounts offering services; email unique, soft `active` flag.
use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Provider::Table)
                    .if_not_exists()
                    .col(pk_auto(Provider::Id))
                    .col(string_len(Provider::FirstName, 128).not_null())
                    .col(string_len(Provider::LastName, 128).not_null())
                    .col(string_len(Provider::BusinessName, 255).not_null())
                    .col(string_len(Provider::Email, 255).unique_key().not_null())
                    .col(string_len(Provider::Phone, 32).not_null())
                    .col(string_len(Provider::Address, 512).not_null())
                    .col(ColumnDef::new(Provider::LicenseNumber).string_len(64).null())
                    .col(ColumnDef::new(Provider::YearsExperience).integer().null())
                    .col(ColumnDef::new(Provider::PrimaryService).string_len(128).null())
                    .col(boolean(Provider::Active).not_null())
                    .col(string_len(Provider::PasswordHash, 255).not_null())
                    .col(timestamp_with_time_zone(Provider::CreatedAt).not_null())
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.drop_table(Table::drop().table(Provider::Table).to_owned()).await
    }
}

#[derive(DeriveIden)]
enum Provider {
    Table,
    Id,
    FirstName,
    LastName,
    BusinessName,
    Email,
    Phone,
    Address,
    LicenseNumber,
    YearsExperience,
    PrimaryService,
    Active,
    PasswordHash,
    CreatedAt,
}
