//! SeaORM entity models for every table the bot and dashboard persist.

pub mod prelude;

pub mod custom_command;
pub mod giveaway;
pub mod giveaway_entry;
pub mod guild_config;
pub mod level_role;
pub mod leveling_config;
pub mod leveling_setup_request;
pub mod member_xp;
pub mod modmail_message;
pub mod modmail_thread;
pub mod operator;
pub mod operator_guild;
pub mod reaction_role;
pub mod ticket;
pub mod ticket_config;
pub mod verification_config;
pub mod warning;
