use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(GuildConfig::Table)
                    .if_not_exists()
                    .col(string(GuildConfig::GuildId).primary_key())
                    .col(string(GuildConfig::Prefix).default("!"))
                    .col(string_null(GuildConfig::ModlogChannelId))
                    .col(string_null(GuildConfig::WelcomeChannelId))
                    .col(text_null(GuildConfig::WelcomeMessage))
                    .col(text_null(GuildConfig::LeaveMessage))
                    .col(string_null(GuildConfig::AutoRoleId))
                    .col(boolean(GuildConfig::ModmailEnabled).default(false))
                    .col(timestamp(GuildConfig::CreatedAt).default(Expr::current_timestamp()))
                    .col(timestamp(GuildConfig::UpdatedAt).default(Expr::current_timestamp()))
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(GuildConfig::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
pub enum GuildConfig {
    Table,
    GuildId,
    Prefix,
    ModlogChannelId,
    WelcomeChannelId,
    WelcomeMessage,
    LeaveMessage,
    AutoRoleId,
    ModmailEnabled,
    CreatedAt,
    UpdatedAt,
}
