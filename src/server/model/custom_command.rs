use chrono::{DateTime, Utc};
use sea_orm::DbErr;

use crate::{
    model::custom_command::CustomCommandDto, server::util::parse::parse_stored_id,
};

pub const MAX_NAME_LEN: usize = 32;
pub const MAX_RESPONSE_LEN: usize = 2000;

#[derive(Debug, Clone, PartialEq)]
pub struct CustomCommand {
    pub guild_id: u64,
    pub name: String,
    pub response: String,
    pub embed: bool,
    pub created_by: u64,
    pub created_at: DateTime<Utc>,
}

impl CustomCommand {
    pub fn from_entity(entity: entity::custom_command::Model) -> Result<Self, DbErr> {
        Ok(Self {
            guild_id: parse_stored_id("guild_id", &entity.guild_id)?,
            name: entity.name,
            response: entity.response,
            embed: entity.embed,
            created_by: parse_stored_id("created_by", &entity.created_by)?,
            created_at: entity.created_at,
        })
    }

    pub fn into_dto(self) -> CustomCommandDto {
        CustomCommandDto {
            name: self.name,
            response: self.response,
            embed: self.embed,
            created_by: self.created_by,
            created_at: self.created_at,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct CreateCustomCommandParams {
    pub guild_id: u64,
    pub name: String,
    pub response: String,
    pub embed: bool,
    pub created_by: u64,
}

/// Fields left as `None` keep their stored value.
#[derive(Debug, Clone, PartialEq)]
pub struct UpdateCustomCommandParams {
    pub guild_id: u64,
    pub name: String,
    pub response: Option<String>,
    pub embed: Option<bool>,
}
