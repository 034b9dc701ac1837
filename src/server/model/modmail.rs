use chrono::{DateTime, Utc};
use sea_orm::DbErr;

use crate::{
    model::modmail::ModmailThreadDto,
    server::util::parse::{parse_optional_stored_id, parse_stored_id},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ThreadStatus {
    Open,
    Closed,
}

impl ThreadStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Open => "open",
            Self::Closed => "closed",
        }
    }

    fn from_stored(value: &str) -> Result<Self, DbErr> {
        match value {
            "open" => Ok(Self::Open),
            "closed" => Ok(Self::Closed),
            other => Err(DbErr::Custom(format!("Unknown modmail status '{}'", other))),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ModmailThread {
    pub id: i32,
    pub guild_id: u64,
    pub user_id: u64,
    /// `None` only briefly, between claiming the thread and creating its channel.
    pub channel_id: Option<u64>,
    pub status: ThreadStatus,
    pub opened_at: DateTime<Utc>,
    pub closed_at: Option<DateTime<Utc>>,
    pub closed_by: Option<u64>,
}

impl ModmailThread {
    pub fn from_entity(entity: entity::modmail_thread::Model) -> Result<Self, DbErr> {
        Ok(Self {
            id: entity.id,
            guild_id: parse_stored_id("guild_id", &entity.guild_id)?,
            user_id: parse_stored_id("user_id", &entity.user_id)?,
            channel_id: parse_optional_stored_id("channel_id", entity.channel_id.as_deref())?,
            status: ThreadStatus::from_stored(&entity.status)?,
            opened_at: entity.opened_at,
            closed_at: entity.closed_at,
            closed_by: parse_optional_stored_id("closed_by", entity.closed_by.as_deref())?,
        })
    }

    pub fn into_dto(self) -> ModmailThreadDto {
        ModmailThreadDto {
            id: self.id,
            user_id: self.user_id,
            channel_id: self.channel_id,
            open: self.status == ThreadStatus::Open,
            opened_at: self.opened_at,
            closed_at: self.closed_at,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct AppendModmailMessageParams {
    pub thread_id: i32,
    pub author_id: u64,
    pub content: String,
    pub is_staff: bool,
}
