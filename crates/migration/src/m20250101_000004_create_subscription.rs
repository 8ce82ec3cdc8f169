//! Create `subscription` table linking customers to services.
//! One subscription per (customer, service) pair.
use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Subscription::Table)
                    .if_not_exists()
                    .col(pk_auto(Subscription::Id))
                    .col(integer(Subscription::CustomerId).not_null())
                    .col(integer(Subscription::ServiceId).not_null())
                    .col(timestamp_with_time_zone(Subscription::SubscribedAt).not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_subscription_customer")
                            .from(Subscription::Table, Subscription::CustomerId)
                            .to(Customer::Table, Customer::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_subscription_service")
                            .from(Subscription::Table, Subscription::ServiceId)
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
                    .name("uniq_subscription_customer_service")
                    .table(Subscription::Table)
                    .col(Subscription::CustomerId)
                    .col(Subscription::ServiceId)
                    .unique()
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.drop_table(Table::drop().table(Subscription::Table).to_owned()).await
    }
}

#[derive(DeriveIden)]
enum Subscription { Table, Id, CustomerId, ServiceId, SubscribedAt }

#[derive(DeriveIden)]
enum Customer { Table, Id }

#[derive(DeriveIden)]
enum Service { Table, Id }
