use chrono::{DateTime, Utc};
use sea_orm::DbErr;

use crate::{
    model::guild_config::{GuildConfigDto, UpdateGuildConfigDto},
    server::util::parse::{parse_optional_stored_id, parse_stored_id},
};

pub const DEFAULT_PREFIX: &str = "!";
pub const MAX_PREFIX_LEN: usize = 5;

/// Per-guild settings. Exactly one row exists per guild once the bot has seen it.
#[derive(Debug, Clone, PartialEq)]
pub struct GuildConfig {
    pub guild_id: u64,
    pub prefix: String,
    pub modlog_channel_id: Option<u64>,
    pub welcome_channel_id: Option<u64>,
    pub welcome_message: Option<String>,
    pub leave_message: Option<String>,
    pub auto_role_id: Option<u64>,
    pub modmail_enabled: bool,
    pub updated_at: DateTime<Utc>,
}

impl GuildConfig {
    pub fn from_entity(entity: entity::guild_config::Model) -> Result<Self, DbErr> {
        Ok(Self {
            guild_id: parse_stored_id("guild_id", &entity.guild_id)?,
            prefix: entity.prefix,
            modlog_channel_id: parse_optional_stored_id(
                "modlog_channel_id",
                entity.modlog_channel_id.as_deref(),
            )?,
            welcome_channel_id: parse_optional_stored_id(
                "welcome_channel_id",
                entity.welcome_channel_id.as_deref(),
            )?,
            welcome_message: entity.welcome_message,
            leave_message: entity.leave_message,
            auto_role_id: parse_optional_stored_id("auto_role_id", entity.auto_role_id.as_deref())?,
            modmail_enabled: entity.modmail_enabled,
            updated_at: entity.updated_at,
        })
    }

    pub fn into_dto(self) -> GuildConfigDto {
        GuildConfigDto {
            guild_id: self.guild_id,
            prefix: self.prefix,
            modlog_channel_id: self.modlog_channel_id,
            welcome_channel_id: self.welcome_channel_id,
            welcome_message: self.welcome_message,
            leave_message: self.leave_message,
            auto_role_id: self.auto_role_id,
            modmail_enabled: self.modmail_enabled,
            updated_at: self.updated_at,
        }
    }
}

/// A single setting changed through a bot command.
#[derive(Debug, Clone, PartialEq)]
pub enum GuildSetting {
    Prefix(String),
    ModlogChannel(u64),
    Welcome { channel_id: u64, message: String },
    LeaveMessage(String),
    AutoRole(Option<u64>),
    Modmail(bool),
}

/// Replacement of every editable setting, as submitted by the dashboard.
#[derive(Debug, Clone, PartialEq)]
pub struct UpdateGuildConfigParams {
    pub guild_id: u64,
    pub prefix: String,
    pub modlog_channel_id: Option<u64>,
    pub welcome_channel_id: Option<u64>,
    pub welcome_message: Option<String>,
    pub leave_message: Option<String>,
    pub auto_role_id: Option<u64>,
    pub modmail_enabled: bool,
}

impl UpdateGuildConfigParams {
    pub fn from_dto(guild_id: u64, dto: UpdateGuildConfigDto) -> Self {
        Self {
            guild_id,
            prefix: dto.prefix,
            modlog_channel_id: dto.modlog_channel_id,
            welcome_channel_id: dto.welcome_channel_id,
            welcome_message: dto.welcome_message,
            leave_message: dto.leave_message,
            auto_role_id: dto.auto_role_id,
            modmail_enabled: dto.modmail_enabled,
        }
    }
}
