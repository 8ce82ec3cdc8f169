//! Create `review` table.
//! Rating 1..=5 per (customer, service) with an optional provider reply.
use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Review::Table)
                    .if_not_exists()
                    .col(pk_auto(Review::Id))
                    .col(integer(Review::CustomerId).not_null())
                    .col(integer(Review::ServiceId).not_null())
                    .col(integer(Review::Rating).not_null())
                    .col(text(Review::Comment).not_null())
                    .col(ColumnDef::new(Review::ProviderResponse).text().null())
                    .col(ColumnDef::new(Review::ResponseDate).timestamp_with_time_zone().null())
                    .col(timestamp_with_time_zone(Review::CreatedAt).not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_review_customer")
                            .from(Review::Table, Review::CustomerId)
                            .to(Customer::Table, Customer::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_review_service")
                            .from(Review::Table, Review::ServiceId)
                            .to(Service::Table, Service::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("uniq_review_customer_service")
                    .table(Review::Table)
                    .col(Review::CustomerId)
                    .col(Review::ServiceId)
                    .unique()
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.drop_table(Table::drop().table(Review::Table).to_owned()).await
    }
}

#[derive(DeriveIden)]
enum Review { Table, Id, CustomerId, ServiceId, Rating, Comment, ProviderResponse, ResponseDate, CreatedAt }

#[derive(DeriveIden)]
enum Customer { Table, Id }

#[derive(DeriveIden)]
enum Service { Table, Id }
