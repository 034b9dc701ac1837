use chrono::{DateTime, Utc};
use sea_orm::DbErr;

use crate::{
    model::ticket::{TicketConfigDto, TicketDto},
    server::util::parse::{parse_optional_stored_id, parse_stored_id},
};

#[derive(Debug, Clone, PartialEq)]
pub struct TicketConfig {
    pub guild_id: u64,
    pub category_id: u64,
    pub staff_role_id: u64,
    pub log_channel_id: Option<u64>,
}

impl TicketConfig {
    pub fn from_entity(entity: entity::ticket_config::Model) -> Result<Self, DbErr> {
        Ok(Self {
            guild_id: parse_stored_id("guild_id", &entity.guild_id)?,
            category_id: parse_stored_id("category_id", &entity.category_id)?,
            staff_role_id: parse_stored_id("staff_role_id", &entity.staff_role_id)?,
            log_channel_id: parse_optional_stored_id(
                "log_channel_id",
                entity.log_channel_id.as_deref(),
            )?,
        })
    }

    pub fn from_dto(guild_id: u64, dto: TicketConfigDto) -> Self {
        Self {
            guild_id,
            category_id: dto.category_id,
            staff_role_id: dto.staff_role_id,
            log_channel_id: dto.log_channel_id,
        }
    }

    pub fn into_dto(self) -> TicketConfigDto {
        TicketConfigDto {
            category_id: self.category_id,
            staff_role_id: self.staff_role_id,
            log_channel_id: self.log_channel_id,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Ticket {
    pub id: i32,
    pub guild_id: u64,
    pub opener_id: u64,
    pub channel_id: Option<u64>,
    pub topic: Option<String>,
    pub open: bool,
    pub transcript: Option<String>,
    pub opened_at: DateTime<Utc>,
    pub closed_at: Option<DateTime<Utc>>,
    pub closed_by: Option<u64>,
}

impl Ticket {
    pub fn from_entity(entity: entity::ticket::Model) -> Result<Self, DbErr> {
        Ok(Self {
            id: entity.id,
            guild_id: parse_stored_id("guild_id", &entity.guild_id)?,
            opener_id: parse_stored_id("opener_id", &entity.opener_id)?,
            channel_id: parse_optional_stored_id("channel_id", entity.channel_id.as_deref())?,
            topic: entity.topic,
            open: entity.status == "open",
            transcript: entity.transcript,
            opened_at: entity.opened_at,
            closed_at: entity.closed_at,
            closed_by: parse_optional_stored_id("closed_by", entity.closed_by.as_deref())?,
        })
    }

    pub fn into_dto(self) -> TicketDto {
        TicketDto {
            id: self.id,
            opener_id: self.opener_id,
            channel_id: self.channel_id,
            topic: self.topic,
            open: self.open,
            transcript: self.transcript,
            opened_at: self.opened_at,
            closed_at: self.closed_at,
        }
    }
}
