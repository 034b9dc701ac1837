//! Narrow interface between handlers and the Discord API.
//!
//! Handlers never touch serenity directly. Everything they need from Discord goes through
//! [`Platform`], which [`super::discord::DiscordPlatform`] implements over serenity's HTTP client
//! and which tests replace with a recording fake. Ids cross this boundary as plain `u64`
//! snowflakes.

use chrono::{DateTime, Utc};
use serenity::async_trait;

use crate::server::error::AppError;

/// Embed colours used across handlers.
pub mod color {
    pub const INFO: u32 = 0x3498db;
    pub const SUCCESS: u32 = 0x2ecc71;
    pub const WARNING: u32 = 0xf39c12;
    pub const DANGER: u32 = 0xe74c3c;
    pub const GIVEAWAY: u32 = 0x9b59b6;
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct EmbedSpec {
    pub title: Option<String>,
    pub description: Option<String>,
    pub color: Option<u32>,
    pub fields: Vec<EmbedField>,
    pub footer: Option<String>,
    pub timestamp: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct EmbedField {
    pub name: String,
    pub value: String,
    pub inline: bool,
}

impl EmbedSpec {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn color(mut self, color: u32) -> Self {
        self.color = Some(color);
        self
    }

    pub fn field(mut self, name: impl Into<String>, value: impl Into<String>, inline: bool) -> Self {
        self.fields.push(EmbedField {
            name: name.into(),
            value: value.into(),
            inline,
        });
        self
    }

    pub fn footer(mut self, footer: impl Into<String>) -> Self {
        self.footer = Some(footer.into());
        self
    }

    pub fn timestamp(mut self, timestamp: DateTime<Utc>) -> Self {
        self.timestamp = Some(timestamp);
        self
    }
}

/// A button rendered under a message. Clicks arrive as component events carrying `custom_id`.
#[derive(Debug, Clone, PartialEq)]
pub struct ButtonSpec {
    pub custom_id: String,
    pub label: String,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct OutgoingMessage {
    pub content: Option<String>,
    pub embed: Option<EmbedSpec>,
    pub buttons: Vec<ButtonSpec>,
}

impl OutgoingMessage {
    pub fn text(content: impl Into<String>) -> Self {
        Self {
            content: Some(content.into()),
            ..Default::default()
        }
    }

    pub fn embed(embed: EmbedSpec) -> Self {
        Self {
            embed: Some(embed),
            ..Default::default()
        }
    }

    pub fn with_content(mut self, content: impl Into<String>) -> Self {
        self.content = Some(content.into());
        self
    }

    pub fn with_button(mut self, custom_id: impl Into<String>, label: impl Into<String>) -> Self {
        self.buttons.push(ButtonSpec {
            custom_id: custom_id.into(),
            label: label.into(),
        });
        self
    }
}

/// Restricts a new channel to the listed members and roles; everyone else is denied view.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ChannelAccess {
    pub member_ids: Vec<u64>,
    pub role_ids: Vec<u64>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewTextChannel {
    pub name: String,
    pub category_id: Option<u64>,
    pub topic: Option<String>,
    pub private_to: Option<ChannelAccess>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct GuildSummary {
    pub name: String,
    pub owner_id: u64,
    pub member_count: u64,
}

/// Handle needed to answer a slash command or button press.
#[derive(Debug, Clone, PartialEq)]
pub struct InteractionRef {
    pub id: u64,
    pub token: String,
}

/// Answer to an interaction.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Reply {
    pub content: Option<String>,
    pub embed: Option<EmbedSpec>,
    pub ephemeral: bool,
}

impl Reply {
    /// Visible to everyone in the channel.
    pub fn public(content: impl Into<String>) -> Self {
        Self {
            content: Some(content.into()),
            ..Default::default()
        }
    }

    /// Visible only to the invoker.
    pub fn private(content: impl Into<String>) -> Self {
        Self {
            content: Some(content.into()),
            ephemeral: true,
            ..Default::default()
        }
    }

    pub fn embed(embed: EmbedSpec, ephemeral: bool) -> Self {
        Self {
            content: None,
            embed: Some(embed),
            ephemeral,
        }
    }
}

#[async_trait]
pub trait Platform: Send + Sync {
    /// Posts a message and returns its id.
    async fn send_message(&self, channel_id: u64, message: OutgoingMessage)
        -> Result<u64, AppError>;

    async fn edit_message(
        &self,
        channel_id: u64,
        message_id: u64,
        message: OutgoingMessage,
    ) -> Result<(), AppError>;

    async fn delete_message(&self, channel_id: u64, message_id: u64) -> Result<(), AppError>;

    /// Opens (or reuses) the DM channel with `user_id` and posts into it.
    async fn send_direct_message(
        &self,
        user_id: u64,
        message: OutgoingMessage,
    ) -> Result<u64, AppError>;

    /// `emoji` is either a unicode emoji or a custom emoji in `<:name:id>` form.
    async fn add_reaction(&self, channel_id: u64, message_id: u64, emoji: &str)
        -> Result<(), AppError>;

    /// Returns the id of the category named `name`, creating it when missing.
    async fn ensure_category(&self, guild_id: u64, name: &str) -> Result<u64, AppError>;

    async fn create_text_channel(
        &self,
        guild_id: u64,
        channel: NewTextChannel,
    ) -> Result<u64, AppError>;

    /// Returns the id of the role named `name`, creating it with `color` when missing.
    async fn ensure_role(&self, guild_id: u64, name: &str, color: u32) -> Result<u64, AppError>;

    /// Renames the channel to `closed-<current name>` and optionally moves it.
    async fn archive_channel(&self, channel_id: u64, category_id: Option<u64>)
        -> Result<(), AppError>;

    /// The last `limit` messages as `author: content` lines, oldest first.
    async fn channel_transcript(&self, channel_id: u64, limit: u8)
        -> Result<Vec<String>, AppError>;

    async fn guild_summary(&self, guild_id: u64) -> Result<GuildSummary, AppError>;

    /// Role ids held by the member, or `None` when the user is not in the guild.
    async fn member_role_ids(&self, guild_id: u64, user_id: u64)
        -> Result<Option<Vec<u64>>, AppError>;

    /// Position of the member's highest role; 0 for members with no roles.
    async fn top_role_position(&self, guild_id: u64, user_id: u64) -> Result<u16, AppError>;

    async fn add_role(
        &self,
        guild_id: u64,
        user_id: u64,
        role_id: u64,
        reason: &str,
    ) -> Result<(), AppError>;

    async fn remove_role(
        &self,
        guild_id: u64,
        user_id: u64,
        role_id: u64,
        reason: &str,
    ) -> Result<(), AppError>;

    async fn kick(&self, guild_id: u64, user_id: u64, reason: &str) -> Result<(), AppError>;

    async fn ban(
        &self,
        guild_id: u64,
        user_id: u64,
        delete_message_days: u8,
        reason: &str,
    ) -> Result<(), AppError>;

    async fn unban(&self, guild_id: u64, user_id: u64, reason: &str) -> Result<(), AppError>;

    /// Times the member out until `until`, or lifts the timeout when `None`.
    async fn timeout(
        &self,
        guild_id: u64,
        user_id: u64,
        until: Option<DateTime<Utc>>,
    ) -> Result<(), AppError>;

    /// Deletes up to `amount` recent messages, returning how many were removed.
    async fn purge(&self, channel_id: u64, amount: u8) -> Result<usize, AppError>;

    async fn set_slowmode(&self, channel_id: u64, seconds: u16) -> Result<(), AppError>;

    async fn respond(&self, interaction: &InteractionRef, reply: Reply) -> Result<(), AppError>;

    /// Acknowledges the interaction with a "thinking" placeholder. The answer must then go
    /// through [`Platform::edit_response`] or [`Platform::follow_up`].
    async fn defer(&self, interaction: &InteractionRef, ephemeral: bool) -> Result<(), AppError>;

    /// Replaces the deferred placeholder. Its visibility was fixed by [`Platform::defer`].
    async fn edit_response(&self, interaction: &InteractionRef, reply: Reply)
        -> Result<(), AppError>;

    async fn delete_response(&self, interaction: &InteractionRef) -> Result<(), AppError>;

    /// Posts an additional message on a deferred or answered interaction.
    async fn follow_up(&self, interaction: &InteractionRef, reply: Reply) -> Result<(), AppError>;
}
