//! Discord bot integration.
//!
//! Gateway events arrive in [`handler`], are converted into platform-neutral
//! [`event::BotEvent`]s and routed by [`dispatch::Dispatcher`] to the services. Slash
//! commands are resolved through [`command::CommandRegistry`] into a typed
//! [`command::Command`] and run by [`execute`]. Every Discord side effect goes through the
//! [`platform::Platform`] trait: [`discord::DiscordPlatform`] in production, a recording
//! fake in tests.
//!
//! The bot is initialized during server startup and runs in a separate tokio task so it
//! does not block the dashboard.
//!
//! # Gateway Intents
//!
//! - `GUILDS`, `GUILD_MESSAGES`, `GUILD_MESSAGE_REACTIONS`, `DIRECT_MESSAGES`
//! - `GUILD_MEMBERS` for join and leave events (privileged)
//! - `MESSAGE_CONTENT` for custom commands and modmail (privileged)

pub mod command;
pub mod discord;
pub mod dispatch;
pub mod event;
pub mod execute;
pub mod handler;
pub mod platform;
pub mod start;

#[cfg(test)]
pub mod fake;
