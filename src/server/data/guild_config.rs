//! Guild configuration repository.
//!
//! Every guild the bot interacts with gets exactly one `guild_config` row. Rows are created
//! lazily by [`GuildConfigRepository::get_or_create`] and are never deleted.

use chrono::Utc;
use migration::OnConflict;
use sea_orm::{
    ActiveModelTrait, ActiveValue, ColumnTrait, DatabaseConnection, DbErr, EntityTrait,
    QueryFilter,
};

use crate::server::{
    data::is_unique_violation,
    model::guild_config::{GuildConfig, GuildSetting, UpdateGuildConfigParams, DEFAULT_PREFIX},
    util::parse::parse_stored_id,
};

pub struct GuildConfigRepository<'a> {
    db: &'a DatabaseConnection,
}

impl<'a> GuildConfigRepository<'a> {
    pub fn new(db: &'a DatabaseConnection) -> Self {
        Self { db }
    }

    /// Finds the configuration for a guild.
    ///
    /// # Returns
    /// - `Ok(Some(GuildConfig))` - Row exists
    /// - `Ok(None)` - The bot has not stored anything for this guild yet
    /// - `Err(DbErr)` - Query failed or a stored id is malformed
    pub async fn find(&self, guild_id: u64) -> Result<Option<GuildConfig>, DbErr> {
        entity::prelude::GuildConfig::find_by_id(guild_id.to_string())
            .one(self.db)
            .await?
            .map(GuildConfig::from_entity)
            .transpose()
    }

    /// Returns the guild's configuration, inserting a default row first if none exists.
    ///
    /// Two events for a new guild may race here; the loser's insert hits the primary key
    /// and falls back to reading the winner's row.
    pub async fn get_or_create(&self, guild_id: u64) -> Result<GuildConfig, DbErr> {
        if let Some(config) = self.find(guild_id).await? {
            return Ok(config);
        }

        let now = Utc::now();
        let insert = entity::guild_config::ActiveModel {
            guild_id: ActiveValue::Set(guild_id.to_string()),
            prefix: ActiveValue::Set(DEFAULT_PREFIX.to_string()),
            modlog_channel_id: ActiveValue::Set(None),
            welcome_channel_id: ActiveValue::Set(None),
            welcome_message: ActiveValue::Set(None),
            leave_message: ActiveValue::Set(None),
            auto_role_id: ActiveValue::Set(None),
            modmail_enabled: ActiveValue::Set(false),
            created_at: ActiveValue::Set(now),
            updated_at: ActiveValue::Set(now),
        }
        .insert(self.db)
        .await;

        match insert {
            Ok(entity) => GuildConfig::from_entity(entity),
            Err(e) if is_unique_violation(&e) => self
                .find(guild_id)
                .await?
                .ok_or(DbErr::RecordNotFound(format!("guild_config {}", guild_id))),
            Err(e) => Err(e),
        }
    }

    /// Changes one setting, creating the row first when needed.
    pub async fn apply(&self, guild_id: u64, setting: GuildSetting) -> Result<GuildConfig, DbErr> {
        self.get_or_create(guild_id).await?;

        let mut model = entity::guild_config::ActiveModel {
            guild_id: ActiveValue::Unchanged(guild_id.to_string()),
            updated_at: ActiveValue::Set(Utc::now()),
            ..Default::default()
        };

        match setting {
            GuildSetting::Prefix(prefix) => model.prefix = ActiveValue::Set(prefix),
            GuildSetting::ModlogChannel(channel_id) => {
                model.modlog_channel_id = ActiveValue::Set(Some(channel_id.to_string()))
            }
            GuildSetting::Welcome {
                channel_id,
                message,
            } => {
                model.welcome_channel_id = ActiveValue::Set(Some(channel_id.to_string()));
                model.welcome_message = ActiveValue::Set(Some(message));
            }
            GuildSetting::LeaveMessage(message) => {
                model.leave_message = ActiveValue::Set(Some(message))
            }
            GuildSetting::AutoRole(role_id) => {
                model.auto_role_id = ActiveValue::Set(role_id.map(|id| id.to_string()))
            }
            GuildSetting::Modmail(enabled) => model.modmail_enabled = ActiveValue::Set(enabled),
        }

        GuildConfig::from_entity(model.update(self.db).await?)
    }

    /// Replaces every editable setting in one statement (last writer wins).
    pub async fn update(&self, params: UpdateGuildConfigParams) -> Result<GuildConfig, DbErr> {
        use entity::guild_config::Column;

        let now = Utc::now();
        let entity = entity::prelude::GuildConfig::insert(entity::guild_config::ActiveModel {
            guild_id: ActiveValue::Set(params.guild_id.to_string()),
            prefix: ActiveValue::Set(params.prefix),
            modlog_channel_id: ActiveValue::Set(params.modlog_channel_id.map(|id| id.to_string())),
            welcome_channel_id: ActiveValue::Set(
                params.welcome_channel_id.map(|id| id.to_string()),
            ),
            welcome_message: ActiveValue::Set(params.welcome_message),
            leave_message: ActiveValue::Set(params.leave_message),
            auto_role_id: ActiveValue::Set(params.auto_role_id.map(|id| id.to_string())),
            modmail_enabled: ActiveValue::Set(params.modmail_enabled),
            created_at: ActiveValue::Set(now),
            updated_at: ActiveValue::Set(now),
        })
        .on_conflict(
            OnConflict::column(Column::GuildId)
                .update_columns([
                    Column::Prefix,
                    Column::ModlogChannelId,
                    Column::WelcomeChannelId,
                    Column::WelcomeMessage,
                    Column::LeaveMessage,
                    Column::AutoRoleId,
                    Column::ModmailEnabled,
                    Column::UpdatedAt,
                ])
                .to_owned(),
        )
        .exec_with_returning(self.db)
        .await?;

        GuildConfig::from_entity(entity)
    }

    /// Ids of guilds that accept modmail.
    pub async fn modmail_guild_ids(&self) -> Result<Vec<u64>, DbErr> {
        entity::prelude::GuildConfig::find()
            .filter(entity::guild_config::Column::ModmailEnabled.eq(true))
            .all(self.db)
            .await?
            .iter()
            .map(|c| parse_stored_id("guild_id", &c.guild_id))
            .collect()
    }
}
