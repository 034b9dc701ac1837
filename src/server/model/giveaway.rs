use chrono::{DateTime, Utc};
use sea_orm::DbErr;

use crate::{model::giveaway::GiveawayDto, server::util::parse::parse_stored_id};

/// Reaction users press to enter a giveaway.
pub const ENTRY_EMOJI: &str = "🎉";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GiveawayStatus {
    /// Accepting entries.
    Active,
    /// Claimed for resolution; winners may be drawn but are not yet announced.
    Resolving,
    /// Winners announced.
    Ended,
}

impl GiveawayStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Resolving => "resolving",
            Self::Ended => "ended",
        }
    }

    fn from_stored(value: &str) -> Result<Self, DbErr> {
        match value {
            "active" => Ok(Self::Active),
            "resolving" => Ok(Self::Resolving),
            "ended" => Ok(Self::Ended),
            other => Err(DbErr::Custom(format!("Unknown giveaway status '{}'", other))),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Giveaway {
    pub id: i32,
    pub guild_id: u64,
    pub channel_id: u64,
    pub message_id: u64,
    pub prize: String,
    pub description: Option<String>,
    pub winner_count: u32,
    pub ends_at: DateTime<Utc>,
    pub status: GiveawayStatus,
    pub resolution_attempts: i32,
    /// `None` until winners are drawn. An empty list means nobody entered.
    pub winners: Option<Vec<u64>>,
    pub created_by: u64,
    pub ended_at: Option<DateTime<Utc>>,
}

impl Giveaway {
    pub fn from_entity(entity: entity::giveaway::Model) -> Result<Self, DbErr> {
        let winners = entity
            .winners
            .as_deref()
            .map(|joined| {
                joined
                    .split(',')
                    .filter(|s| !s.is_empty())
                    .map(|s| parse_stored_id("winners", s))
                    .collect::<Result<Vec<_>, _>>()
            })
            .transpose()?;

        Ok(Self {
            id: entity.id,
            guild_id: parse_stored_id("guild_id", &entity.guild_id)?,
            channel_id: parse_stored_id("channel_id", &entity.channel_id)?,
            message_id: parse_stored_id("message_id", &entity.message_id)?,
            prize: entity.prize,
            description: entity.description,
            winner_count: entity.winner_count.max(0) as u32,
            ends_at: entity.ends_at,
            status: GiveawayStatus::from_stored(&entity.status)?,
            resolution_attempts: entity.resolution_attempts,
            winners,
            created_by: parse_stored_id("created_by", &entity.created_by)?,
            ended_at: entity.ended_at,
        })
    }

    pub fn into_dto(self) -> GiveawayDto {
        GiveawayDto {
            id: self.id,
            channel_id: self.channel_id,
            message_id: self.message_id,
            prize: self.prize,
            description: self.description,
            winner_count: self.winner_count,
            ends_at: self.ends_at,
            active: self.status == GiveawayStatus::Active,
            status: self.status.as_str().to_string(),
            winners: self
                .winners
                .unwrap_or_default()
                .iter()
                .map(|id| id.to_string())
                .collect(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct CreateGiveawayParams {
    pub guild_id: u64,
    pub channel_id: u64,
    pub message_id: u64,
    pub prize: String,
    pub description: Option<String>,
    pub winner_count: u32,
    pub ends_at: DateTime<Utc>,
    pub created_by: u64,
}
