use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Events::Table)
                    .if_not_exists()
                    .col(pk_auto(Events::Id))
                    .col(text(Events::Name).default(""))
                    .col(timestamp(Events::BeginDate))
                    .col(timestamp(Events::EndDate))
                    .col(text(Events::Description).default(""))
                    .to_owned(),
            )
            .await?;

        // Listing sorts and range-filters on begin_date
        manager
            .create_index(
                Index::create()
                    .name("idx_events_begin_date")
                    .table(Events::Table)
                    .col(Events::BeginDate)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Events::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
pub enum Events {
    Table,
    Id,
    Name,
    BeginDate,
    EndDate,
    Description,
}
