//! Leveling factories: member XP rows, level roles and guild settings.

use crate::factory::helpers::next_id;
use chrono::{DateTime, Utc};
use sea_orm::{ActiveModelTrait, ActiveValue, DatabaseConnection, DbErr};

pub struct MemberXpFactory<'a> {
    db: &'a DatabaseConnection,
    guild_id: String,
    user_id: String,
    xp: i64,
    last_message_xp_at: Option<DateTime<Utc>>,
}

impl<'a> MemberXpFactory<'a> {
    /// Defaults: unique user id, 0 XP, never earned message XP.
    pub fn new(db: &'a DatabaseConnection, guild_id: impl Into<String>) -> Self {
        Self {
            db,
            guild_id: guild_id.into(),
            user_id: next_id().to_string(),
            xp: 0,
            last_message_xp_at: None,
        }
    }

    pub fn user_id(mut self, user_id: impl Into<String>) -> Self {
        self.user_id = user_id.into();
        self
    }

    pub fn xp(mut self, xp: i64) -> Self {
        self.xp = xp;
        self
    }

    pub fn last_message_xp_at(mut self, at: DateTime<Utc>) -> Self {
        self.last_message_xp_at = Some(at);
        self
    }

    pub async fn build(self) -> Result<entity::member_xp::Model, DbErr> {
        entity::member_xp::ActiveModel {
            guild_id: ActiveValue::Set(self.guild_id),
            user_id: ActiveValue::Set(self.user_id),
            xp: ActiveValue::Set(self.xp),
            last_message_xp_at: ActiveValue::Set(self.last_message_xp_at),
            updated_at: ActiveValue::Set(Utc::now()),
        }
        .insert(self.db)
        .await
    }
}

/// Inserts a member with `xp` and no message cooldown.
pub async fn create_member_xp(
    db: &DatabaseConnection,
    guild_id: impl Into<String>,
    user_id: impl Into<String>,
    xp: i64,
) -> Result<entity::member_xp::Model, DbErr> {
    MemberXpFactory::new(db, guild_id)
        .user_id(user_id)
        .xp(xp)
        .build()
        .await
}

/// Binds `role_id` to `level`.
pub async fn create_level_role(
    db: &DatabaseConnection,
    guild_id: impl Into<String>,
    level: i32,
    role_id: impl Into<String>,
) -> Result<entity::level_role::Model, DbErr> {
    entity::level_role::ActiveModel {
        guild_id: ActiveValue::Set(guild_id.into()),
        level: ActiveValue::Set(level),
        role_id: ActiveValue::Set(role_id.into()),
        created_at: ActiveValue::Set(Utc::now()),
    }
    .insert(db)
    .await
}

/// Stores leveling settings with the default 15 to 25 XP range.
pub async fn create_leveling_config(
    db: &DatabaseConnection,
    guild_id: impl Into<String>,
    enabled: bool,
    level_up_channel_id: Option<&str>,
) -> Result<entity::leveling_config::Model, DbErr> {
    entity::leveling_config::ActiveModel {
        guild_id: ActiveValue::Set(guild_id.into()),
        enabled: ActiveValue::Set(enabled),
        level_up_channel_id: ActiveValue::Set(level_up_channel_id.map(str::to_string)),
        xp_min: ActiveValue::Set(15),
        xp_max: ActiveValue::Set(25),
    }
    .insert(db)
    .await
}
