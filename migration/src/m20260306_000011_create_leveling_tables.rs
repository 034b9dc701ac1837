use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(LevelingConfig::Table)
                    .if_not_exists()
                    .col(string(LevelingConfig::GuildId).primary_key())
                    .col(boolean(LevelingConfig::Enabled).default(true))
                    .col(string_null(LevelingConfig::LevelUpChannelId))
                    .col(integer(LevelingConfig::XpMin).default(15))
                    .col(integer(LevelingConfig::XpMax).default(25))
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(MemberXp::Table)
                    .if_not_exists()
                    .col(string(MemberXp::GuildId))
                    .col(string(MemberXp::UserId))
                    .col(big_integer(MemberXp::Xp).default(0))
                    .col(timestamp_null(MemberXp::LastMessageXpAt))
                    .col(timestamp(MemberXp::UpdatedAt).default(Expr::current_timestamp()))
                    .primary_key(
                        Index::create()
                            .name("pk_member_xp")
                            .col(MemberXp::GuildId)
                            .col(MemberXp::UserId),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_member_xp_guild_xp")
                    .table(MemberXp::Table)
                    .col(MemberXp::GuildId)
                    .col(MemberXp::Xp)
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(LevelRole::Table)
                    .if_not_exists()
                    .col(string(LevelRole::GuildId))
                    .col(integer(LevelRole::Level))
                    .col(string(LevelRole::RoleId))
                    .col(timestamp(LevelRole::CreatedAt).default(Expr::current_timestamp()))
                    .primary_key(
                        Index::create()
                            .name("pk_level_role")
                            .col(LevelRole::GuildId)
                            .col(LevelRole::Level),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(LevelingSetupRequest::Table)
                    .if_not_exists()
                    .col(string(LevelingSetupRequest::GuildId).primary_key())
                    .col(string(LevelingSetupRequest::Milestones))
                    .col(string(LevelingSetupRequest::RequestedBy))
                    .col(
                        timestamp(LevelingSetupRequest::RequestedAt)
                            .default(Expr::current_timestamp()),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(LevelingSetupRequest::Table).to_owned())
            .await?;

        manager
            .drop_table(Table::drop().table(LevelRole::Table).to_owned())
            .await?;

        manager
            .drop_table(Table::drop().table(MemberXp::Table).to_owned())
            .await?;

        manager
            .drop_table(Table::drop().table(LevelingConfig::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
pub enum LevelingConfig {
    Table,
    GuildId,
    Enabled,
    LevelUpChannelId,
    XpMin,
    XpMax,
}

#[derive(DeriveIden)]
pub enum MemberXp {
    Table,
    GuildId,
    UserId,
    Xp,
    LastMessageXpAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
pub enum LevelRole {
    Table,
    GuildId,
    Level,
    RoleId,
    CreatedAt,
}

#[derive(DeriveIden)]
pub enum LevelingSetupRequest {
    Table,
    GuildId,
    Milestones,
    RequestedBy,
    RequestedAt,
}
