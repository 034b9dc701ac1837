//! Modmail thread factory.

use crate::factory::helpers::next_id;
use chrono::Utc;
use sea_orm::{ActiveModelTrait, ActiveValue, DatabaseConnection, DbErr};

pub struct ModmailThreadFactory<'a> {
    db: &'a DatabaseConnection,
    guild_id: String,
    user_id: String,
    channel_id: String,
    open: bool,
}

impl<'a> ModmailThreadFactory<'a> {
    /// Defaults: open thread with a generated channel id.
    pub fn new(db: &'a DatabaseConnection, guild_id: impl Into<String>, user_id: impl Into<String>) -> Self {
        Self {
            db,
            guild_id: guild_id.into(),
            user_id: user_id.into(),
            channel_id: next_id().to_string(),
            open: true,
        }
    }

    pub fn channel_id(mut self, channel_id: impl Into<String>) -> Self {
        self.channel_id = channel_id.into();
        self
    }

    pub fn closed(mut self) -> Self {
        self.open = false;
        self
    }

    pub async fn build(self) -> Result<entity::modmail_thread::Model, DbErr> {
        let now = Utc::now();
        let (status, open_key, closed_at) = if self.open {
            ("open", Some(self.user_id.clone()), None)
        } else {
            ("closed", None, Some(now))
        };

        entity::modmail_thread::ActiveModel {
            guild_id: ActiveValue::Set(self.guild_id),
            user_id: ActiveValue::Set(self.user_id),
            channel_id: ActiveValue::Set(Some(self.channel_id)),
            status: ActiveValue::Set(status.to_string()),
            open_key: ActiveValue::Set(open_key),
            opened_at: ActiveValue::Set(now),
            closed_at: ActiveValue::Set(closed_at),
            closed_by: ActiveValue::Set(None),
            ..Default::default()
        }
        .insert(self.db)
        .await
    }
}

/// Creates an open thread for `user_id` in `guild_id`.
pub async fn create_open_thread(
    db: &DatabaseConnection,
    guild_id: impl Into<String>,
    user_id: impl Into<String>,
) -> Result<entity::modmail_thread::Model, DbErr> {
    ModmailThreadFactory::new(db, guild_id, user_id).build().await
}
