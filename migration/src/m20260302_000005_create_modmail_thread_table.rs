use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(ModmailThread::Table)
                    .if_not_exists()
                    .col(pk_auto(ModmailThread::Id))
                    .col(string(ModmailThread::GuildId))
                    .col(string(ModmailThread::UserId))
                    .col(string_null(ModmailThread::ChannelId))
                    .col(string(ModmailThread::Status).default("open"))
                    .col(string_null(ModmailThread::OpenKey).unique_key())
                    .col(timestamp(ModmailThread::OpenedAt).default(Expr::current_timestamp()))
                    .col(timestamp_null(ModmailThread::ClosedAt))
                    .col(string_null(ModmailThread::ClosedBy))
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(ModmailThread::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
pub enum ModmailThread {
    Table,
    Id,
    GuildId,
    UserId,
    ChannelId,
    Status,
    OpenKey,
    OpenedAt,
    ClosedAt,
    ClosedBy,
}
