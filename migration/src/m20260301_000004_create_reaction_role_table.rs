use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(ReactionRole::Table)
                    .if_not_exists()
                    .col(string(ReactionRole::MessageId))
                    .col(string(ReactionRole::Emoji))
                    .col(string(ReactionRole::GuildId))
                    .col(string(ReactionRole::ChannelId))
                    .col(string(ReactionRole::RoleId))
                    .primary_key(
                        Index::create()
                            .name("pk_reaction_role")
                            .col(ReactionRole::MessageId)
                            .col(ReactionRole::Emoji),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(ReactionRole::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
pub enum ReactionRole {
    Table,
    MessageId,
    Emoji,
    GuildId,
    ChannelId,
    RoleId,
}
