use chrono::{DateTime, Utc};
use sea_orm::DbErr;

use crate::{model::warning::WarningDto, server::util::parse::parse_stored_id};

#[derive(Debug, Clone, PartialEq)]
pub struct Warning {
    pub id: i32,
    pub guild_id: u64,
    pub user_id: u64,
    pub moderator_id: u64,
    pub reason: String,
    pub created_at: DateTime<Utc>,
}

impl Warning {
    pub fn from_entity(entity: entity::warning::Model) -> Result<Self, DbErr> {
        Ok(Self {
            id: entity.id,
            guild_id: parse_stored_id("guild_id", &entity.guild_id)?,
            user_id: parse_stored_id("user_id", &entity.user_id)?,
            moderator_id: parse_stored_id("moderator_id", &entity.moderator_id)?,
            reason: entity.reason,
            created_at: entity.created_at,
        })
    }

    pub fn into_dto(self) -> WarningDto {
        WarningDto {
            id: self.id,
            user_id: self.user_id,
            moderator_id: self.moderator_id,
            reason: self.reason,
            created_at: self.created_at,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct CreateWarningParams {
    pub guild_id: u64,
    pub user_id: u64,
    pub moderator_id: u64,
    pub reason: String,
}
