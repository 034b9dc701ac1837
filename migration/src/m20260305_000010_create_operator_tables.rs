use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Operator::Table)
                    .if_not_exists()
                    .col(string(Operator::DiscordId).primary_key())
                    .col(string(Operator::Name))
                    .col(timestamp(Operator::GuildsSyncedAt).default(Expr::current_timestamp()))
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(OperatorGuild::Table)
                    .if_not_exists()
                    .col(string(OperatorGuild::OperatorId))
                    .col(string(OperatorGuild::GuildId))
                    .col(string(OperatorGuild::GuildName))
                    .col(big_integer(OperatorGuild::Permissions).default(0))
                    .primary_key(
                        Index::create()
                            .name("pk_operator_guild")
                            .col(OperatorGuild::OperatorId)
                            .col(OperatorGuild::GuildId),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_operator_guild_operator_id")
                            .from(OperatorGuild::Table, OperatorGuild::OperatorId)
                            .to(Operator::Table, Operator::DiscordId)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(OperatorGuild::Table).to_owned())
            .await?;

        manager
            .drop_table(Table::drop().table(Operator::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
pub enum Operator {
    Table,
    DiscordId,
    Name,
    GuildsSyncedAt,
}

#[derive(DeriveIden)]
pub enum OperatorGuild {
    Table,
    OperatorId,
    GuildId,
    GuildName,
    Permissions,
}
