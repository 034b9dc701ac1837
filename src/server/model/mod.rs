//! Domain models and operation parameters.
//!
//! Repositories convert SeaORM entity models into these types at the data boundary, parsing
//! stored string ids into `u64`. Controllers convert them into DTOs with `into_dto`.

pub mod custom_command;
pub mod giveaway;
pub mod guild_config;
pub mod leveling;
pub mod modmail;
pub mod operator;
pub mod reaction_role;
pub mod ticket;
pub mod verification;
pub mod warning;
