//! Service layer for business logic and orchestration.
//!
//! Services sit between the callers (bot dispatcher and dashboard controllers) and the data
//! layer. The bot and the dashboard share the same services, so validation lives here once.
//! Methods that act on Discord take a `&dyn Platform` argument; everything else only needs
//! the database connection the service is built with.

pub mod auth;
pub mod custom_command;
pub mod giveaway;
pub mod guild_config;
pub mod leveling;
pub mod member;
pub mod moderation;
pub mod modmail;
pub mod operator;
pub mod reaction_role;
pub mod ticket;
pub mod verification;
