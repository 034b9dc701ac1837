use chrono::{DateTime, Utc};
use sea_orm::DbErr;
use serenity::all::Permissions;

use crate::{
    model::operator::{ManagedGuildDto, OperatorDto},
    server::util::parse::parse_stored_id,
};

/// A dashboard user, identified by their Discord account.
#[derive(Debug, Clone, PartialEq)]
pub struct Operator {
    pub discord_id: u64,
    pub name: String,
    pub guilds_synced_at: DateTime<Utc>,
}

impl Operator {
    pub fn from_entity(entity: entity::operator::Model) -> Result<Self, DbErr> {
        Ok(Self {
            discord_id: parse_stored_id("discord_id", &entity.discord_id)?,
            name: entity.name,
            guilds_synced_at: entity.guilds_synced_at,
        })
    }

    pub fn into_dto(self, guilds: Vec<OperatorGuild>) -> OperatorDto {
        OperatorDto {
            discord_id: self.discord_id,
            name: self.name,
            guilds: guilds
                .into_iter()
                .filter(OperatorGuild::can_manage)
                .map(|g| ManagedGuildDto {
                    guild_id: g.guild_id,
                    name: g.name,
                })
                .collect(),
        }
    }
}

/// Permission snapshot for one guild, taken from `/users/@me/guilds` at login.
#[derive(Debug, Clone, PartialEq)]
pub struct OperatorGuild {
    pub guild_id: u64,
    pub name: String,
    pub permissions: Permissions,
}

impl OperatorGuild {
    pub fn from_entity(entity: entity::operator_guild::Model) -> Result<Self, DbErr> {
        Ok(Self {
            guild_id: parse_stored_id("guild_id", &entity.guild_id)?,
            name: entity.guild_name,
            permissions: Permissions::from_bits_truncate(entity.permissions as u64),
        })
    }

    /// Administrator or manage-guild grants dashboard access.
    pub fn can_manage(&self) -> bool {
        self.permissions.administrator() || self.permissions.manage_guild()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct UpsertOperatorParams {
    pub discord_id: u64,
    pub name: String,
    pub guilds: Vec<OperatorGuild>,
}
