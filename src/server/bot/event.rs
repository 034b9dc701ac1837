//! Platform-neutral events the dispatcher routes to handlers.

use chrono::{DateTime, Utc};

use crate::server::bot::platform::InteractionRef;

/// The user an event originates from.
#[derive(Debug, Clone, PartialEq)]
pub struct Actor {
    pub id: u64,
    pub name: String,
    pub bot: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct InboundMessage {
    pub id: u64,
    pub channel_id: u64,
    pub guild_id: Option<u64>,
    pub author: Actor,
    pub content: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ReactionEvent {
    pub guild_id: u64,
    pub channel_id: u64,
    pub message_id: u64,
    pub user_id: u64,
    /// Unicode emoji, or `<:name:id>` for custom emoji.
    pub emoji: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MemberEvent {
    pub guild_id: u64,
    pub user: Actor,
}

/// Typed value of a slash command option.
#[derive(Debug, Clone, PartialEq)]
pub enum ArgValue {
    String(String),
    Integer(i64),
    Boolean(bool),
    User(u64),
    Channel(u64),
    Role(u64),
}

#[derive(Debug, Clone, PartialEq)]
pub struct CommandInvocation {
    pub interaction: InteractionRef,
    pub name: String,
    pub guild_id: Option<u64>,
    pub channel_id: u64,
    pub actor: Actor,
    pub args: Vec<(String, ArgValue)>,
}

/// A button press.
#[derive(Debug, Clone, PartialEq)]
pub struct ComponentInvocation {
    pub interaction: InteractionRef,
    pub custom_id: String,
    pub guild_id: Option<u64>,
    pub channel_id: u64,
    pub actor: Actor,
}

#[derive(Debug, Clone, PartialEq)]
pub enum BotEvent {
    GuildMessage(InboundMessage),
    DirectMessage(InboundMessage),
    ReactionAdd(ReactionEvent),
    ReactionRemove(ReactionEvent),
    MemberJoin(MemberEvent),
    MemberLeave(MemberEvent),
    Command(CommandInvocation),
    Component(ComponentInvocation),
    /// Emitted once a minute by the scheduler.
    Tick(DateTime<Utc>),
}

impl BotEvent {
    /// Short name used in logs.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::GuildMessage(_) => "guild_message",
            Self::DirectMessage(_) => "direct_message",
            Self::ReactionAdd(_) => "reaction_add",
            Self::ReactionRemove(_) => "reaction_remove",
            Self::MemberJoin(_) => "member_join",
            Self::MemberLeave(_) => "member_leave",
            Self::Command(_) => "command",
            Self::Component(_) => "component",
            Self::Tick(_) => "tick",
        }
    }
}
