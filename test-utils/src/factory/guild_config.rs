//! Guild configuration factory.

use crate::factory::helpers::next_id;
use chrono::Utc;
use sea_orm::{ActiveModelTrait, ActiveValue, DatabaseConnection, DbErr};

pub struct GuildConfigFactory<'a> {
    db: &'a DatabaseConnection,
    guild_id: String,
    prefix: String,
    modlog_channel_id: Option<String>,
    welcome_channel_id: Option<String>,
    welcome_message: Option<String>,
    leave_message: Option<String>,
    auto_role_id: Option<String>,
    modmail_enabled: bool,
}

impl<'a> GuildConfigFactory<'a> {
    /// Defaults: unique guild id, prefix `!`, nothing configured, modmail disabled.
    pub fn new(db: &'a DatabaseConnection) -> Self {
        Self {
            db,
            guild_id: next_id().to_string(),
            prefix: "!".to_string(),
            modlog_channel_id: None,
            welcome_channel_id: None,
            welcome_message: None,
            leave_message: None,
            auto_role_id: None,
            modmail_enabled: false,
        }
    }

    pub fn guild_id(mut self, guild_id: impl Into<String>) -> Self {
        self.guild_id = guild_id.into();
        self
    }

    pub fn prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = prefix.into();
        self
    }

    pub fn modlog_channel_id(mut self, channel_id: impl Into<String>) -> Self {
        self.modlog_channel_id = Some(channel_id.into());
        self
    }

    pub fn welcome(mut self, channel_id: impl Into<String>, message: impl Into<String>) -> Self {
        self.welcome_channel_id = Some(channel_id.into());
        self.welcome_message = Some(message.into());
        self
    }

    pub fn leave_message(mut self, message: impl Into<String>) -> Self {
        self.leave_message = Some(message.into());
        self
    }

    pub fn auto_role_id(mut self, role_id: impl Into<String>) -> Self {
        self.auto_role_id = Some(role_id.into());
        self
    }

    pub fn modmail_enabled(mut self, enabled: bool) -> Self {
        self.modmail_enabled = enabled;
        self
    }

    pub async fn build(self) -> Result<entity::guild_config::Model, DbErr> {
        let now = Utc::now();
        entity::guild_config::ActiveModel {
            guild_id: ActiveValue::Set(self.guild_id),
            prefix: ActiveValue::Set(self.prefix),
            modlog_channel_id: ActiveValue::Set(self.modlog_channel_id),
            welcome_channel_id: ActiveValue::Set(self.welcome_channel_id),
            welcome_message: ActiveValue::Set(self.welcome_message),
            leave_message: ActiveValue::Set(self.leave_message),
            auto_role_id: ActiveValue::Set(self.auto_role_id),
            modmail_enabled: ActiveValue::Set(self.modmail_enabled),
            created_at: ActiveValue::Set(now),
            updated_at: ActiveValue::Set(now),
        }
        .insert(self.db)
        .await
    }
}

/// Creates a default configuration row for `guild_id`.
pub async fn create_guild_config(
    db: &DatabaseConnection,
    guild_id: impl Into<String>,
) -> Result<entity::guild_config::Model, DbErr> {
    GuildConfigFactory::new(db).guild_id(guild_id).build().await
}
