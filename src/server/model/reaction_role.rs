use sea_orm::DbErr;

use crate::{model::reaction_role::ReactionRoleDto, server::util::parse::parse_stored_id};

/// Maps a (message, emoji) pair to the role granted by reacting with it.
#[derive(Debug, Clone, PartialEq)]
pub struct ReactionRoleBinding {
    pub guild_id: u64,
    pub channel_id: u64,
    pub message_id: u64,
    pub emoji: String,
    pub role_id: u64,
}

impl ReactionRoleBinding {
    pub fn from_entity(entity: entity::reaction_role::Model) -> Result<Self, DbErr> {
        Ok(Self {
            guild_id: parse_stored_id("guild_id", &entity.guild_id)?,
            channel_id: parse_stored_id("channel_id", &entity.channel_id)?,
            message_id: parse_stored_id("message_id", &entity.message_id)?,
            emoji: entity.emoji,
            role_id: parse_stored_id("role_id", &entity.role_id)?,
        })
    }

    pub fn into_dto(self) -> ReactionRoleDto {
        ReactionRoleDto {
            channel_id: self.channel_id,
            message_id: self.message_id,
            emoji: self.emoji,
            role_id: self.role_id,
        }
    }
}

/// Normalises an emoji for storage and lookup.
///
/// Unicode emoji are stored without the U+FE0F variation selector, which some clients add
/// and others drop. Custom emoji are stored by id alone: the name can be renamed and the
/// gateway omits it for some events, while the id never changes.
pub fn normalize_emoji(emoji: &str) -> String {
    let emoji = emoji.trim();
    match custom_emoji_id(emoji) {
        Some(id) => id.to_string(),
        None => emoji.replace('\u{FE0F}', ""),
    }
}

/// Renders a stored emoji key so that Discord shows the emoji in a message.
pub fn display_emoji(stored: &str) -> String {
    match stored.parse::<u64>() {
        Ok(id) => format!("<:emoji:{}>", id),
        Err(_) => stored.to_string(),
    }
}

/// Id of a custom emoji written as `<:name:id>` or `<a:name:id>`.
fn custom_emoji_id(emoji: &str) -> Option<u64> {
    let inner = emoji.strip_prefix('<')?.strip_suffix('>')?;
    inner.rsplit(':').next()?.parse().ok()
}
