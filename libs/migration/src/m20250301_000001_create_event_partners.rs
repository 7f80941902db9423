use sea_orm_migration::{prelude::*, schema::*};

use crate::m20250301_000000_create_events::Events;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(EventPartners::Table)
                    .if_not_exists()
                    .col(pk_auto(EventPartners::Id))
                    .col(integer(EventPartners::EventId))
                    // Partners live in the hosting application's schema
                    .col(integer(EventPartners::PartnerId))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_event_partners_event_id")
                            .from(EventPartners::Table, EventPartners::EventId)
                            .to(Events::Table, Events::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_event_partners_event_id")
                    .table(EventPartners::Table)
                    .col(EventPartners::EventId)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(EventPartners::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum EventPartners {
    Table,
    Id,
    EventId,
    PartnerId,
}
