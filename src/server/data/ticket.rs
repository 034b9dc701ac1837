//! Ticket configuration and ticket repository.
//!
//! Open tickets hold `open_key = "<guild_id>:<opener_id>"`, which is unique, so one member
//! cannot have two open tickets in the same guild.

use chrono::Utc;
use migration::OnConflict;
use sea_orm::{
    sea_query::Expr, ActiveModelTrait, ActiveValue, ColumnTrait, DatabaseConnection, DbErr,
    EntityTrait, PaginatorTrait, QueryFilter, QueryOrder,
};

use crate::server::{
    data::is_unique_violation,
    model::ticket::{Ticket, TicketConfig},
};

fn open_key(guild_id: u64, opener_id: u64) -> String {
    format!("{}:{}", guild_id, opener_id)
}

pub struct TicketRepository<'a> {
    db: &'a DatabaseConnection,
}

impl<'a> TicketRepository<'a> {
    pub fn new(db: &'a DatabaseConnection) -> Self {
        Self { db }
    }

    pub async fn find_config(&self, guild_id: u64) -> Result<Option<TicketConfig>, DbErr> {
        entity::prelude::TicketConfig::find_by_id(guild_id.to_string())
            .one(self.db)
            .await?
            .map(TicketConfig::from_entity)
            .transpose()
    }

    pub async fn upsert_config(&self, config: TicketConfig) -> Result<TicketConfig, DbErr> {
        use entity::ticket_config::Column;

        let entity = entity::prelude::TicketConfig::insert(entity::ticket_config::ActiveModel {
            guild_id: ActiveValue::Set(config.guild_id.to_string()),
            category_id: ActiveValue::Set(config.category_id.to_string()),
            staff_role_id: ActiveValue::Set(config.staff_role_id.to_string()),
            log_channel_id: ActiveValue::Set(config.log_channel_id.map(|id| id.to_string())),
        })
        .on_conflict(
            OnConflict::column(Column::GuildId)
                .update_columns([Column::CategoryId, Column::StaffRoleId, Column::LogChannelId])
                .to_owned(),
        )
        .exec_with_returning(self.db)
        .await?;

        TicketConfig::from_entity(entity)
    }

    /// Inserts an open ticket without a channel.
    ///
    /// # Returns
    /// - `Ok(Some(Ticket))` - Claimed
    /// - `Ok(None)` - The member already has an open ticket in this guild
    pub async fn claim(
        &self,
        guild_id: u64,
        opener_id: u64,
        topic: Option<String>,
    ) -> Result<Option<Ticket>, DbErr> {
        let insert = entity::ticket::ActiveModel {
            guild_id: ActiveValue::Set(guild_id.to_string()),
            opener_id: ActiveValue::Set(opener_id.to_string()),
            channel_id: ActiveValue::Set(None),
            topic: ActiveValue::Set(topic),
            status: ActiveValue::Set("open".to_string()),
            open_key: ActiveValue::Set(Some(open_key(guild_id, opener_id))),
            transcript: ActiveValue::Set(None),
            opened_at: ActiveValue::Set(Utc::now()),
            closed_at: ActiveValue::Set(None),
            closed_by: ActiveValue::Set(None),
            ..Default::default()
        }
        .insert(self.db)
        .await;

        match insert {
            Ok(entity) => Ok(Some(Ticket::from_entity(entity)?)),
            Err(e) if is_unique_violation(&e) => Ok(None),
            Err(e) => Err(e),
        }
    }

    pub async fn set_channel(&self, ticket_id: i32, channel_id: u64) -> Result<Ticket, DbErr> {
        let entity = entity::ticket::ActiveModel {
            id: ActiveValue::Unchanged(ticket_id),
            channel_id: ActiveValue::Set(Some(channel_id.to_string())),
            ..Default::default()
        }
        .update(self.db)
        .await?;

        Ticket::from_entity(entity)
    }

    pub async fn discard(&self, ticket_id: i32) -> Result<(), DbErr> {
        entity::prelude::Ticket::delete_by_id(ticket_id)
            .exec(self.db)
            .await?;
        Ok(())
    }

    pub async fn find_open_by_opener(
        &self,
        guild_id: u64,
        opener_id: u64,
    ) -> Result<Option<Ticket>, DbErr> {
        entity::prelude::Ticket::find()
            .filter(entity::ticket::Column::OpenKey.eq(open_key(guild_id, opener_id)))
            .one(self.db)
            .await?
            .map(Ticket::from_entity)
            .transpose()
    }

    pub async fn find_open_by_channel(&self, channel_id: u64) -> Result<Option<Ticket>, DbErr> {
        use entity::ticket::Column;

        entity::prelude::Ticket::find()
            .filter(Column::ChannelId.eq(channel_id.to_string()))
            .filter(Column::Status.eq("open"))
            .one(self.db)
            .await?
            .map(Ticket::from_entity)
            .transpose()
    }

    /// Most recent ticket bound to `channel_id`, open or closed.
    pub async fn find_latest_by_channel(&self, channel_id: u64) -> Result<Option<Ticket>, DbErr> {
        use entity::ticket::Column;

        entity::prelude::Ticket::find()
            .filter(Column::ChannelId.eq(channel_id.to_string()))
            .order_by_desc(Column::Id)
            .one(self.db)
            .await?
            .map(Ticket::from_entity)
            .transpose()
    }

    /// Marks an open ticket closed and stores its transcript.
    ///
    /// # Returns
    /// - `Ok(true)` - This call closed the ticket
    /// - `Ok(false)` - The ticket was already closed
    pub async fn close(
        &self,
        ticket_id: i32,
        closed_by: u64,
        transcript: String,
    ) -> Result<bool, DbErr> {
        use entity::ticket::Column;

        let result = entity::prelude::Ticket::update_many()
            .col_expr(Column::Status, Expr::value("closed"))
            .col_expr(Column::OpenKey, Expr::value(Option::<String>::None))
            .col_expr(Column::Transcript, Expr::value(transcript))
            .col_expr(Column::ClosedAt, Expr::value(Utc::now()))
            .col_expr(Column::ClosedBy, Expr::value(closed_by.to_string()))
            .filter(Column::Id.eq(ticket_id))
            .filter(Column::Status.eq("open"))
            .exec(self.db)
            .await?;

        Ok(result.rows_affected == 1)
    }

    pub async fn get_paginated(
        &self,
        guild_id: u64,
        page: u64,
        per_page: u64,
    ) -> Result<(Vec<Ticket>, u64), DbErr> {
        let paginator = entity::prelude::Ticket::find()
            .filter(entity::ticket::Column::GuildId.eq(guild_id.to_string()))
            .order_by_desc(entity::ticket::Column::Id)
            .paginate(self.db, per_page);

        let total = paginator.num_items().await?;
        let tickets = paginator
            .fetch_page(page)
            .await?
            .into_iter()
            .map(Ticket::from_entity)
            .collect::<Result<Vec<_>, _>>()?;

        Ok((tickets, total))
    }
}
