//! Request and response DTOs exchanged with the dashboard API.

pub mod api;
pub mod custom_command;
pub mod giveaway;
pub mod guild_config;
pub mod leveling;
pub mod modmail;
pub mod operator;
pub mod reaction_role;
pub mod snowflake;
pub mod ticket;
pub mod verification;
pub mod warning;
