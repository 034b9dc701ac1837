use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(VerificationConfig::Table)
                    .if_not_exists()
                    .col(string(VerificationConfig::GuildId).primary_key())
                    .col(string(VerificationConfig::VerifiedRoleId))
                    .col(string_null(VerificationConfig::UnverifiedRoleId))
                    .col(string(VerificationConfig::ChannelId))
                    .col(string(VerificationConfig::Title))
                    .col(text(VerificationConfig::Message))
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(VerificationConfig::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
pub enum VerificationConfig {
    Table,
    GuildId,
    VerifiedRoleId,
    UnverifiedRoleId,
    ChannelId,
    Title,
    Message,
}
