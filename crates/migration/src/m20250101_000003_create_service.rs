//! Create `service` table with FK to `provider`.
//! Priced offerings; removing a provider removes its services.
use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Service::Table)
                    .if_not_exists()
                    .col(pk_auto(Service::Id))
                    .col(integer(Service::ProviderId).not_null())
                    .col(string_len(Service::Name, 255).not_null())
                    .col(ColumnDef::new(Service::Description).string_len(1000).null())
                    .col(double(Service::Price).not_null())
                    .col(ColumnDef::new(Service::ServiceType).string_len(128).null())
                    .col(boolean(Service::Active).not_null())
                    .col(timestamp_with_time_zone(Service::CreatedAt).not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_service_provider")
                            .from(Service::Table, Service::ProviderId)
                            .to(Provider::Table, Provider::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.drop_table(Table::drop().table(Service::Table).to_owned()).await
    }
}

#[derive(DeriveIden)]
enum Service { Table, Id, ProviderId, Name, Description, Price, ServiceType, Active, CreatedAt }

#[derive(DeriveIden)]
enum Provider { Table, Id }
