use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(TicketConfig::Table)
                    .if_not_exists()
                    .col(string(TicketConfig::GuildId).primary_key())
                    .col(string(TicketConfig::CategoryId))
                    .col(string(TicketConfig::StaffRoleId))
                    .col(string_null(TicketConfig::LogChannelId))
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Ticket::Table)
                    .if_not_exists()
                    .col(pk_auto(Ticket::Id))
                    .col(string(Ticket::GuildId))
                    .col(string(Ticket::OpenerId))
                    .col(string_null(Ticket::ChannelId))
                    .col(string_null(Ticket::Topic))
                    .col(string(Ticket::Status).default("open"))
                    .col(string_null(Ticket::OpenKey).unique_key())
                    .col(text_null(Ticket::Transcript))
                    .col(timestamp(Ticket::OpenedAt).default(Expr::current_timestamp()))
                    .col(timestamp_null(Ticket::ClosedAt))
                    .col(string_null(Ticket::ClosedBy))
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Ticket::Table).to_owned())
            .await?;

        manager
            .drop_table(Table::drop().table(TicketConfig::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
pub enum TicketConfig {
    Table,
    GuildId,
    CategoryId,
    StaffRoleId,
    LogChannelId,
}

#[derive(DeriveIden)]
pub enum Ticket {
    Table,
    Id,
    GuildId,
    OpenerId,
    ChannelId,
    Topic,
    Status,
    OpenKey,
    Transcript,
    OpenedAt,
    ClosedAt,
    ClosedBy,
}
