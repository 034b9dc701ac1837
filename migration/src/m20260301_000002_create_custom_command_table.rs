use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(CustomCommand::Table)
                    .if_not_exists()
                    .col(string(CustomCommand::GuildId))
                    .col(string(CustomCommand::Name))
                    .col(text(CustomCommand::Response))
                    .col(boolean(CustomCommand::Embed).default(false))
                    .col(string(CustomCommand::CreatedBy))
                    .col(timestamp(CustomCommand::CreatedAt).default(Expr::current_timestamp()))
                    .primary_key(
                        Index::create()
                            .name("pk_custom_command")
                            .col(CustomCommand::GuildId)
                            .col(CustomCommand::Name),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(CustomCommand::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
pub enum CustomCommand {
    Table,
    GuildId,
    Name,
    Response,
    Embed,
    CreatedBy,
    CreatedAt,
}
