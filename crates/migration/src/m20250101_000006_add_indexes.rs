use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // Service: lookups by provider and active listing
        manager
            .create_index(
                Index::create()
                    .name("idx_service_provider")
                    .table(Service::Table)
                    .col(Service::ProviderId)
                    .to_owned(),
            )
            .await?;
        manager
            .create_index(
                Index::create()
                    .name("idx_service_active")
                    .table(Service::Table)
                    .col(Service::Active)
                    .to_owned(),
            )
            .await?;

        // Subscription / Review: per-service listings
        manager
            .create_index(
                Index::create()
                    .name("idx_subscription_service")
                    .table(Subscription::Table)
                    .col(Subscription::ServiceId)
                    .to_owned(),
            )
            .await?;
        manager
            .create_index(
                Index::create()
                    .name("idx_review_service")
                    .table(Review::Table)
                    .col(Review::ServiceId)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_index(Index::drop().name("idx_service_provider").table(Service::Table).to_owned())
            .await?;
        manager
            .drop_index(Index::drop().name("idx_service_active").table(Service::Table).to_owned())
            .await?;
        manager
            .drop_index(Index::drop().name("idx_subscription_service").table(Subscription::Table).to_owned())
            .await?;
        manager
            .drop_index(Index::drop().name("idx_review_service").table(Review::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum Service { Table, ProviderId, Active }

#[derive(DeriveIden)]
enum Subscription { Table, ServiceId }

#[derive(DeriveIden)]
enum Review { Table, ServiceId }
