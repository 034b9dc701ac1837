//! Factories inserting rows with sensible defaults.
//!
//! Each module exposes a builder struct for customised rows and a `create_*` shorthand for
//! the common case. Discord ids default to unique values from [`helpers::next_id`], so
//! factories can be called repeatedly inside one test without colliding.
//!
//! ```rust,ignore
//! use test_utils::factory;
//!
//! let giveaway = factory::giveaway::GiveawayFactory::new(db, "42")
//!     .winner_count(2)
//!     .build()
//!     .await?;
//! factory::giveaway::add_entry(db, giveaway.id, "1001").await?;
//! ```

pub mod custom_command;
pub mod giveaway;
pub mod guild_config;
pub mod helpers;
pub mod leveling;
pub mod modmail;
pub mod operator;
pub mod reaction_role;
pub mod ticket;
pub mod warning;

pub use custom_command::create_custom_command;
pub use giveaway::create_giveaway;
pub use guild_config::create_guild_config;
pub use leveling::{create_level_role, create_member_xp};
pub use operator::create_operator_with_guild;
