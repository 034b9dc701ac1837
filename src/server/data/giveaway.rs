//! Giveaway and entrant repository.
//!
//! Resolution moves a giveaway `active -> resolving -> ended`. Every claim is a conditional
//! update on the status and on `resolution_attempts`, so exactly one caller holds a claim.
//! The holder stores winners with [`GiveawayRepository::record_winners`] and, once the result
//! is announced, calls [`GiveawayRepository::finish_resolution`]. A claim whose holder never
//! finished can be taken over with [`GiveawayRepository::reclaim_resolution`] after it is
//! older than the caller's cutoff.

use chrono::{DateTime, Utc};
use sea_orm::{
    sea_query::Expr, ActiveModelTrait, ActiveValue, ColumnTrait, DatabaseConnection, DbErr,
    EntityTrait, PaginatorTrait, QueryFilter, QueryOrder,
};

use crate::server::{
    data::is_unique_violation,
    model::giveaway::{CreateGiveawayParams, Giveaway, GiveawayStatus},
    util::parse::parse_stored_id,
};

pub struct GiveawayRepository<'a> {
    db: &'a DatabaseConnection,
}

impl<'a> GiveawayRepository<'a> {
    pub fn new(db: &'a DatabaseConnection) -> Self {
        Self { db }
    }

    pub async fn create(&self, params: CreateGiveawayParams) -> Result<Giveaway, DbErr> {
        let entity = entity::giveaway::ActiveModel {
            guild_id: ActiveValue::Set(params.guild_id.to_string()),
            channel_id: ActiveValue::Set(params.channel_id.to_string()),
            message_id: ActiveValue::Set(params.message_id.to_string()),
            prize: ActiveValue::Set(params.prize),
            description: ActiveValue::Set(params.description),
            winner_count: ActiveValue::Set(params.winner_count as i32),
            ends_at: ActiveValue::Set(params.ends_at),
            status: ActiveValue::Set(GiveawayStatus::Active.as_str().to_string()),
            resolution_attempts: ActiveValue::Set(0),
            winners: ActiveValue::Set(None),
            created_by: ActiveValue::Set(params.created_by.to_string()),
            ended_at: ActiveValue::Set(None),
            ..Default::default()
        }
        .insert(self.db)
        .await?;

        Giveaway::from_entity(entity)
    }

    pub async fn find_by_id(&self, id: i32) -> Result<Option<Giveaway>, DbErr> {
        entity::prelude::Giveaway::find_by_id(id)
            .one(self.db)
            .await?
            .map(Giveaway::from_entity)
            .transpose()
    }

    pub async fn find_by_message(&self, message_id: u64) -> Result<Option<Giveaway>, DbErr> {
        entity::prelude::Giveaway::find()
            .filter(entity::giveaway::Column::MessageId.eq(message_id.to_string()))
            .one(self.db)
            .await?
            .map(Giveaway::from_entity)
            .transpose()
    }

    /// Active giveaways whose end time is at or before `now`.
    pub async fn find_due(&self, now: DateTime<Utc>) -> Result<Vec<Giveaway>, DbErr> {
        use entity::giveaway::Column;

        entity::prelude::Giveaway::find()
            .filter(Column::Status.eq(GiveawayStatus::Active.as_str()))
            .filter(Column::EndsAt.lte(now))
            .order_by_asc(Column::EndsAt)
            .all(self.db)
            .await?
            .into_iter()
            .map(Giveaway::from_entity)
            .collect()
    }

    /// Giveaways claimed for resolution at or before `cutoff` and never finished.
    pub async fn find_stalled(&self, cutoff: DateTime<Utc>) -> Result<Vec<Giveaway>, DbErr> {
        use entity::giveaway::Column;

        entity::prelude::Giveaway::find()
            .filter(Column::Status.eq(GiveawayStatus::Resolving.as_str()))
            .filter(Column::EndedAt.lte(cutoff))
            .order_by_asc(Column::EndedAt)
            .all(self.db)
            .await?
            .into_iter()
            .map(Giveaway::from_entity)
            .collect()
    }

    /// Enters a user. Returns `false` if they were already entered.
    pub async fn add_entry(&self, giveaway_id: i32, user_id: u64) -> Result<bool, DbErr> {
        let existing =
            entity::prelude::GiveawayEntry::find_by_id((giveaway_id, user_id.to_string()))
                .one(self.db)
                .await?;
        if existing.is_some() {
            return Ok(false);
        }

        let insert = entity::giveaway_entry::ActiveModel {
            giveaway_id: ActiveValue::Set(giveaway_id),
            user_id: ActiveValue::Set(user_id.to_string()),
            entered_at: ActiveValue::Set(Utc::now()),
        }
        .insert(self.db)
        .await;

        match insert {
            Ok(_) => Ok(true),
            Err(e) if is_unique_violation(&e) => Ok(false),
            Err(e) => Err(e),
        }
    }

    /// Withdraws a user. Returns `false` if they were not entered.
    pub async fn remove_entry(&self, giveaway_id: i32, user_id: u64) -> Result<bool, DbErr> {
        let result =
            entity::prelude::GiveawayEntry::delete_by_id((giveaway_id, user_id.to_string()))
                .exec(self.db)
                .await?;

        Ok(result.rows_affected > 0)
    }

    /// Entrant ids in entry order.
    pub async fn entrants(&self, giveaway_id: i32) -> Result<Vec<u64>, DbErr> {
        use entity::giveaway_entry::Column;

        entity::prelude::GiveawayEntry::find()
            .filter(Column::GiveawayId.eq(giveaway_id))
            .order_by_asc(Column::EnteredAt)
            .order_by_asc(Column::UserId)
            .all(self.db)
            .await?
            .iter()
            .map(|e| parse_stored_id("user_id", &e.user_id))
            .collect()
    }

    /// Atomically moves an active giveaway to resolving.
    ///
    /// # Returns
    /// - `Ok(true)` - This caller holds the claim and must announce the result
    /// - `Ok(false)` - The giveaway was already claimed (or does not exist)
    pub async fn claim_resolution(
        &self,
        giveaway: &Giveaway,
        now: DateTime<Utc>,
    ) -> Result<bool, DbErr> {
        use entity::giveaway::Column;

        let result = entity::prelude::Giveaway::update_many()
            .col_expr(Column::Status, Expr::value(GiveawayStatus::Resolving.as_str()))
            .col_expr(
                Column::ResolutionAttempts,
                Expr::value(giveaway.resolution_attempts + 1),
            )
            .col_expr(Column::EndedAt, Expr::value(now))
            .filter(Column::Id.eq(giveaway.id))
            .filter(Column::Status.eq(GiveawayStatus::Active.as_str()))
            .filter(Column::ResolutionAttempts.eq(giveaway.resolution_attempts))
            .exec(self.db)
            .await?;

        Ok(result.rows_affected == 1)
    }

    /// Takes over a resolving giveaway whose claim was made at or before `cutoff`.
    ///
    /// `giveaway` must be the row as last read; a claim made since then makes this fail.
    pub async fn reclaim_resolution(
        &self,
        giveaway: &Giveaway,
        cutoff: DateTime<Utc>,
        now: DateTime<Utc>,
    ) -> Result<bool, DbErr> {
        use entity::giveaway::Column;

        let result = entity::prelude::Giveaway::update_many()
            .col_expr(
                Column::ResolutionAttempts,
                Expr::value(giveaway.resolution_attempts + 1),
            )
            .col_expr(Column::EndedAt, Expr::value(now))
            .filter(Column::Id.eq(giveaway.id))
            .filter(Column::Status.eq(GiveawayStatus::Resolving.as_str()))
            .filter(Column::ResolutionAttempts.eq(giveaway.resolution_attempts))
            .filter(Column::EndedAt.lte(cutoff))
            .exec(self.db)
            .await?;

        Ok(result.rows_affected == 1)
    }

    /// Marks a resolving giveaway as ended after its result was announced.
    ///
    /// Returns `false` when `attempt` is no longer the current claim.
    pub async fn finish_resolution(
        &self,
        giveaway_id: i32,
        attempt: i32,
        now: DateTime<Utc>,
    ) -> Result<bool, DbErr> {
        use entity::giveaway::Column;

        let result = entity::prelude::Giveaway::update_many()
            .col_expr(Column::Status, Expr::value(GiveawayStatus::Ended.as_str()))
            .col_expr(Column::EndedAt, Expr::value(now))
            .filter(Column::Id.eq(giveaway_id))
            .filter(Column::Status.eq(GiveawayStatus::Resolving.as_str()))
            .filter(Column::ResolutionAttempts.eq(attempt))
            .exec(self.db)
            .await?;

        Ok(result.rows_affected == 1)
    }

    pub async fn record_winners(&self, giveaway_id: i32, winners: &[u64]) -> Result<(), DbErr> {
        let joined = winners
            .iter()
            .map(|id| id.to_string())
            .collect::<Vec<_>>()
            .join(",");

        entity::giveaway::ActiveModel {
            id: ActiveValue::Unchanged(giveaway_id),
            winners: ActiveValue::Set(Some(joined)),
            ..Default::default()
        }
        .update(self.db)
        .await?;

        Ok(())
    }

    pub async fn get_paginated(
        &self,
        guild_id: u64,
        page: u64,
        per_page: u64,
    ) -> Result<(Vec<Giveaway>, u64), DbErr> {
        let paginator = entity::prelude::Giveaway::find()
            .filter(entity::giveaway::Column::GuildId.eq(guild_id.to_string()))
            .order_by_desc(entity::giveaway::Column::Id)
            .paginate(self.db, per_page);

        let total = paginator.num_items().await?;
        let giveaways = paginator
            .fetch_page(page)
            .await?
            .into_iter()
            .map(Giveaway::from_entity)
            .collect::<Result<Vec<_>, _>>()?;

        Ok((giveaways, total))
    }
}
