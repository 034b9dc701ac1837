use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Serialize, Deserialize, PartialEq, Clone, Debug, ToSchema)]
pub struct GiveawayDto {
    pub id: i32,
    #[serde(with = "crate::model::snowflake")]
    #[schema(value_type = String)]
    pub channel_id: u64,
    #[serde(with = "crate::model::snowflake")]
    #[schema(value_type = String)]
    pub message_id: u64,
    pub prize: String,
    pub description: Option<String>,
    pub winner_count: u32,
    pub ends_at: DateTime<Utc>,
    pub active: bool,
    /// `active`, `resolving` or `ended`.
    pub status: String,
    /// Winner ids as strings; empty until resolved.
    pub winners: Vec<String>,
}

#[derive(Serialize, Deserialize, PartialEq, Clone, Debug, ToSchema)]
pub struct PaginatedGiveawaysDto {
    pub giveaways: Vec<GiveawayDto>,
    pub total: u64,
    pub page: u64,
    pub per_page: u64,
    pub total_pages: u64,
}
