//! Modmail thread and message repository.
//!
//! A thread is open while its `open_key` column holds the user id. The column is unique, so
//! the database itself refuses a second open thread for the same user, and closing clears it
//! so a later DM can claim a brand new row.

use chrono::Utc;
use sea_orm::{
    sea_query::Expr, ActiveModelTrait, ActiveValue, ColumnTrait, DatabaseConnection, DbErr,
    EntityTrait, PaginatorTrait, QueryFilter, QueryOrder,
};

use crate::server::{
    data::is_unique_violation,
    model::modmail::{AppendModmailMessageParams, ModmailThread, ThreadStatus},
};

pub struct ModmailRepository<'a> {
    db: &'a DatabaseConnection,
}

impl<'a> ModmailRepository<'a> {
    pub fn new(db: &'a DatabaseConnection) -> Self {
        Self { db }
    }

    /// Inserts an open thread for `user_id` without a channel yet.
    ///
    /// # Returns
    /// - `Ok(Some(ModmailThread))` - Thread claimed; the caller creates the channel next
    /// - `Ok(None)` - The user already has an open thread
    /// - `Err(DbErr)` - Insert failed for another reason
    pub async fn claim_thread(
        &self,
        guild_id: u64,
        user_id: u64,
    ) -> Result<Option<ModmailThread>, DbErr> {
        let insert = entity::modmail_thread::ActiveModel {
            guild_id: ActiveValue::Set(guild_id.to_string()),
            user_id: ActiveValue::Set(user_id.to_string()),
            channel_id: ActiveValue::Set(None),
            status: ActiveValue::Set(ThreadStatus::Open.as_str().to_string()),
            open_key: ActiveValue::Set(Some(user_id.to_string())),
            opened_at: ActiveValue::Set(Utc::now()),
            closed_at: ActiveValue::Set(None),
            closed_by: ActiveValue::Set(None),
            ..Default::default()
        }
        .insert(self.db)
        .await;

        match insert {
            Ok(entity) => Ok(Some(ModmailThread::from_entity(entity)?)),
            Err(e) if is_unique_violation(&e) => Ok(None),
            Err(e) => Err(e),
        }
    }

    pub async fn set_channel(&self, thread_id: i32, channel_id: u64) -> Result<ModmailThread, DbErr> {
        let entity = entity::modmail_thread::ActiveModel {
            id: ActiveValue::Unchanged(thread_id),
            channel_id: ActiveValue::Set(Some(channel_id.to_string())),
            ..Default::default()
        }
        .update(self.db)
        .await?;

        ModmailThread::from_entity(entity)
    }

    /// Removes a claimed thread whose channel could not be created.
    pub async fn discard(&self, thread_id: i32) -> Result<(), DbErr> {
        entity::prelude::ModmailThread::delete_by_id(thread_id)
            .exec(self.db)
            .await?;
        Ok(())
    }

    pub async fn find_by_id(&self, thread_id: i32) -> Result<Option<ModmailThread>, DbErr> {
        entity::prelude::ModmailThread::find_by_id(thread_id)
            .one(self.db)
            .await?
            .map(ModmailThread::from_entity)
            .transpose()
    }

    pub async fn find_open_by_user(&self, user_id: u64) -> Result<Option<ModmailThread>, DbErr> {
        entity::prelude::ModmailThread::find()
            .filter(entity::modmail_thread::Column::OpenKey.eq(user_id.to_string()))
            .one(self.db)
            .await?
            .map(ModmailThread::from_entity)
            .transpose()
    }

    pub async fn find_open_by_channel(
        &self,
        channel_id: u64,
    ) -> Result<Option<ModmailThread>, DbErr> {
        use entity::modmail_thread::Column;

        entity::prelude::ModmailThread::find()
            .filter(Column::ChannelId.eq(channel_id.to_string()))
            .filter(Column::Status.eq(ThreadStatus::Open.as_str()))
            .one(self.db)
            .await?
            .map(ModmailThread::from_entity)
            .transpose()
    }

    /// Most recent thread bound to `channel_id`, open or closed.
    pub async fn find_latest_by_channel(
        &self,
        channel_id: u64,
    ) -> Result<Option<ModmailThread>, DbErr> {
        use entity::modmail_thread::Column;

        entity::prelude::ModmailThread::find()
            .filter(Column::ChannelId.eq(channel_id.to_string()))
            .order_by_desc(Column::Id)
            .one(self.db)
            .await?
            .map(ModmailThread::from_entity)
            .transpose()
    }

    /// Closes an open thread.
    ///
    /// The update only matches while the thread is still open, so of two concurrent closes
    /// exactly one sees `true`.
    pub async fn close(&self, thread_id: i32, closed_by: u64) -> Result<bool, DbErr> {
        use entity::modmail_thread::Column;

        let result = entity::prelude::ModmailThread::update_many()
            .col_expr(Column::Status, Expr::value(ThreadStatus::Closed.as_str()))
            .col_expr(Column::OpenKey, Expr::value(Option::<String>::None))
            .col_expr(Column::ClosedAt, Expr::value(Utc::now()))
            .col_expr(Column::ClosedBy, Expr::value(closed_by.to_string()))
            .filter(Column::Id.eq(thread_id))
            .filter(Column::Status.eq(ThreadStatus::Open.as_str()))
            .exec(self.db)
            .await?;

        Ok(result.rows_affected == 1)
    }

    pub async fn append_message(&self, params: AppendModmailMessageParams) -> Result<(), DbErr> {
        entity::modmail_message::ActiveModel {
            thread_id: ActiveValue::Set(params.thread_id),
            author_id: ActiveValue::Set(params.author_id.to_string()),
            content: ActiveValue::Set(params.content),
            is_staff: ActiveValue::Set(params.is_staff),
            created_at: ActiveValue::Set(Utc::now()),
            ..Default::default()
        }
        .insert(self.db)
        .await?;

        Ok(())
    }

    /// Message history of a thread, oldest first.
    pub async fn messages(
        &self,
        thread_id: i32,
    ) -> Result<Vec<entity::modmail_message::Model>, DbErr> {
        entity::prelude::ModmailMessage::find()
            .filter(entity::modmail_message::Column::ThreadId.eq(thread_id))
            .order_by_asc(entity::modmail_message::Column::Id)
            .all(self.db)
            .await
    }

    /// Newest-first page of a guild's threads.
    pub async fn get_paginated(
        &self,
        guild_id: u64,
        page: u64,
        per_page: u64,
    ) -> Result<(Vec<ModmailThread>, u64), DbErr> {
        let paginator = entity::prelude::ModmailThread::find()
            .filter(entity::modmail_thread::Column::GuildId.eq(guild_id.to_string()))
            .order_by_desc(entity::modmail_thread::Column::Id)
            .paginate(self.db, per_page);

        let total = paginator.num_items().await?;
        let threads = paginator
            .fetch_page(page)
            .await?
            .into_iter()
            .map(ModmailThread::from_entity)
            .collect::<Result<Vec<_>, _>>()?;

        Ok((threads, total))
    }
}
