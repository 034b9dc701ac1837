//! Giveaway and entry factories.

use crate::factory::helpers::next_id;
use chrono::{DateTime, Duration, Utc};
use sea_orm::{ActiveModelTrait, ActiveValue, DatabaseConnection, DbErr};

pub struct GiveawayFactory<'a> {
    db: &'a DatabaseConnection,
    guild_id: String,
    channel_id: String,
    message_id: String,
    prize: String,
    winner_count: i32,
    ends_at: DateTime<Utc>,
    status: String,
    winners: Option<String>,
    ended_at: Option<DateTime<Utc>>,
}

impl<'a> GiveawayFactory<'a> {
    /// Defaults: active, one winner, ends an hour from now, generated channel and message ids.
    pub fn new(db: &'a DatabaseConnection, guild_id: impl Into<String>) -> Self {
        let id = next_id();
        Self {
            db,
            guild_id: guild_id.into(),
            channel_id: next_id().to_string(),
            message_id: id.to_string(),
            prize: format!("Prize {}", id),
            winner_count: 1,
            ends_at: Utc::now() + Duration::hours(1),
            status: "active".to_string(),
            winners: None,
            ended_at: None,
        }
    }

    pub fn message_id(mut self, message_id: impl Into<String>) -> Self {
        self.message_id = message_id.into();
        self
    }

    pub fn channel_id(mut self, channel_id: impl Into<String>) -> Self {
        self.channel_id = channel_id.into();
        self
    }

    pub fn winner_count(mut self, winner_count: i32) -> Self {
        self.winner_count = winner_count;
        self
    }

    pub fn ends_at(mut self, ends_at: DateTime<Utc>) -> Self {
        self.ends_at = ends_at;
        self
    }

    pub fn ended(mut self) -> Self {
        self.status = "ended".to_string();
        self
    }

    /// Claimed at `claimed_at` with `winners` drawn, but never announced.
    pub fn resolving(mut self, claimed_at: DateTime<Utc>, winners: &[u64]) -> Self {
        self.status = "resolving".to_string();
        self.ended_at = Some(claimed_at);
        self.winners = Some(
            winners
                .iter()
                .map(|id| id.to_string())
                .collect::<Vec<_>>()
                .join(","),
        );
        self
    }

    pub async fn build(self) -> Result<entity::giveaway::Model, DbErr> {
        entity::giveaway::ActiveModel {
            guild_id: ActiveValue::Set(self.guild_id),
            channel_id: ActiveValue::Set(self.channel_id),
            message_id: ActiveValue::Set(self.message_id),
            prize: ActiveValue::Set(self.prize),
            description: ActiveValue::Set(None),
            winner_count: ActiveValue::Set(self.winner_count),
            ends_at: ActiveValue::Set(self.ends_at),
            status: ActiveValue::Set(self.status),
            resolution_attempts: ActiveValue::Set(i32::from(self.ended_at.is_some())),
            winners: ActiveValue::Set(self.winners),
            created_by: ActiveValue::Set(next_id().to_string()),
            ended_at: ActiveValue::Set(self.ended_at),
            ..Default::default()
        }
        .insert(self.db)
        .await
    }
}

pub async fn create_giveaway(
    db: &DatabaseConnection,
    guild_id: impl Into<String>,
) -> Result<entity::giveaway::Model, DbErr> {
    GiveawayFactory::new(db, guild_id).build().await
}

/// Enters `user_id` into the giveaway.
pub async fn add_entry(
    db: &DatabaseConnection,
    giveaway_id: i32,
    user_id: impl Into<String>,
) -> Result<entity::giveaway_entry::Model, DbErr> {
    entity::giveaway_entry::ActiveModel {
        giveaway_id: ActiveValue::Set(giveaway_id),
        user_id: ActiveValue::Set(user_id.into()),
        entered_at: ActiveValue::Set(Utc::now()),
    }
    .insert(db)
    .await
}
