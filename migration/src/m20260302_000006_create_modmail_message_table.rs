use sea_orm_migration::{prelude::*, schema::*};

use super::m20260302_000005_create_modmail_thread_table::ModmailThread;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(ModmailMessage::Table)
                    .if_not_exists()
                    .col(pk_auto(ModmailMessage::Id))
                    .col(integer(ModmailMessage::ThreadId))
                    .col(string(ModmailMessage::AuthorId))
                    .col(text(ModmailMessage::Content))
                    .col(boolean(ModmailMessage::IsStaff).default(false))
                    .col(timestamp(ModmailMessage::CreatedAt).default(Expr::current_timestamp()))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_modmail_message_thread_id")
                            .from(ModmailMessage::Table, ModmailMessage::ThreadId)
                            .to(ModmailThread::Table, ModmailThread::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(ModmailMessage::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
pub enum ModmailMessage {
    Table,
    Id,
    ThreadId,
    AuthorId,
    Content,
    IsStaff,
    CreatedAt,
}
