//! Dashboard HTTP handlers.
//!
//! Every guild-scoped handler starts with an [`AuthGuard`](crate::server::middleware::auth::AuthGuard)
//! check for [`Permission::ManageGuild`](crate::server::middleware::auth::Permission::ManageGuild)
//! and then calls the same service the bot uses, so validation is identical on both surfaces.

use serde::Deserialize;

pub mod auth;
pub mod custom_command;
pub mod giveaway;
pub mod guild_config;
pub mod leveling;
pub mod modmail;
pub mod reaction_role;
pub mod ticket;
pub mod verification;
pub mod warning;

/// Tag for grouping guild endpoints in OpenAPI documentation
pub static GUILD_TAG: &str = "guild";

const MAX_ENTRIES: u64 = 100;

#[derive(Deserialize)]
pub struct PaginationParams {
    #[serde(default)]
    pub page: u64,
    #[serde(default = "default_entries")]
    pub entries: u64,
}

impl PaginationParams {
    /// Entries per page, clamped to 1..=100.
    pub fn per_page(&self) -> u64 {
        self.entries.clamp(1, MAX_ENTRIES)
    }
}

fn default_entries() -> u64 {
    10
}
