//! Create `customer` table.
//!
//! Email is the login identifier and must be unique.
use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Customer::Table)
                    .if_not_exists()
                    .col(pk_auto(Customer::Id))
                    .col(string_len(Customer::FirstName, 128).not_null())
                    .col(string_len(Customer::LastName, 128).not_null())
                    .col(string_len(Customer::Email, 255).unique_key().not_null())
                    .col(string_len(Customer::PhoneNumber, 32).not_null())
                    .col(string_len(Customer::Address, 512).not_null())
                    .col(string_len(Customer::PasswordHash, 255).not_null())
                    .col(timestamp_with_time_zone(Customer::CreatedAt).not_null())
                    .col(timestamp_with_time_zone(Customer::UpdatedAt).not_null())
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.drop_table(Table::drop().table(Customer::Table).to_owned()).await
    }
}

#[derive(DeriveIden)]
enum Customer { Table, Id, FirstName, LastName, Email, PhoneNumber, Address, PasswordHash, CreatedAt, UpdatedAt }
