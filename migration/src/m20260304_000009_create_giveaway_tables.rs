use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Giveaway::Table)
                    .if_not_exists()
                    .col(pk_auto(Giveaway::Id))
                    .col(string(Giveaway::GuildId))
                    .col(string(Giveaway::ChannelId))
                    .col(string_uniq(Giveaway::MessageId))
                    .col(string(Giveaway::Prize))
                    .col(text_null(Giveaway::Description))
                    .col(integer(Giveaway::WinnerCount).default(1))
                    .col(timestamp(Giveaway::EndsAt))
                    .col(string(Giveaway::Status).default("active"))
                    .col(integer(Giveaway::ResolutionAttempts).default(0))
                    .col(text_null(Giveaway::Winners))
                    .col(string(Giveaway::CreatedBy))
                    .col(timestamp_null(Giveaway::EndedAt))
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(GiveawayEntry::Table)
                    .if_not_exists()
                    .col(integer(GiveawayEntry::GiveawayId))
                    .col(string(GiveawayEntry::UserId))
                    .col(timestamp(GiveawayEntry::EnteredAt).default(Expr::current_timestamp()))
                    .primary_key(
                        Index::create()
                            .name("pk_giveaway_entry")
                            .col(GiveawayEntry::GiveawayId)
                            .col(GiveawayEntry::UserId),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_giveaway_entry_giveaway_id")
                            .from(GiveawayEntry::Table, GiveawayEntry::GiveawayId)
                            .to(Giveaway::Table, Giveaway::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(GiveawayEntry::Table).to_owned())
            .await?;

        manager
            .drop_table(Table::drop().table(Giveaway::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
pub enum Giveaway {
    Table,
    Id,
    GuildId,
    ChannelId,
    MessageId,
    Prize,
    Description,
    WinnerCount,
    EndsAt,
    Status,
    ResolutionAttempts,
    Winners,
    CreatedBy,
    EndedAt,
}

#[derive(DeriveIden)]
pub enum GiveawayEntry {
    Table,
    GiveawayId,
    UserId,
    EnteredAt,
}
