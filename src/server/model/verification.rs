use sea_orm::DbErr;

use crate::{
    model::verification::VerificationConfigDto,
    server::util::parse::{parse_optional_stored_id, parse_stored_id},
};

pub const DEFAULT_TITLE: &str = "Verification";
pub const DEFAULT_MESSAGE: &str = "Click the button below to verify and gain access to the server.";

#[derive(Debug, Clone, PartialEq)]
pub struct VerificationConfig {
    pub guild_id: u64,
    pub verified_role_id: u64,
    pub unverified_role_id: Option<u64>,
    pub channel_id: u64,
    pub title: String,
    pub message: String,
}

impl VerificationConfig {
    pub fn from_entity(entity: entity::verification_config::Model) -> Result<Self, DbErr> {
        Ok(Self {
            guild_id: parse_stored_id("guild_id", &entity.guild_id)?,
            verified_role_id: parse_stored_id("verified_role_id", &entity.verified_role_id)?,
            unverified_role_id: parse_optional_stored_id(
                "unverified_role_id",
                entity.unverified_role_id.as_deref(),
            )?,
            channel_id: parse_stored_id("channel_id", &entity.channel_id)?,
            title: entity.title,
            message: entity.message,
        })
    }

    pub fn from_dto(guild_id: u64, dto: VerificationConfigDto) -> Self {
        Self {
            guild_id,
            verified_role_id: dto.verified_role_id,
            unverified_role_id: dto.unverified_role_id,
            channel_id: dto.channel_id,
            title: dto.title,
            message: dto.message,
        }
    }

    pub fn into_dto(self) -> VerificationConfigDto {
        VerificationConfigDto {
            verified_role_id: self.verified_role_id,
            unverified_role_id: self.unverified_role_id,
            channel_id: self.channel_id,
            title: self.title,
            message: self.message,
        }
    }
}
