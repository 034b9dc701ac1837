use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Serialize, Deserialize, PartialEq, Clone, Debug, ToSchema)]
pub struct LevelingConfigDto {
    pub enabled: bool,
    /// Channel for level-up announcements; the member's current channel when absent.
    #[serde(with = "crate::model::snowflake::option", default)]
    #[schema(value_type = Option<String>)]
    pub level_up_channel_id: Option<u64>,
    pub xp_min: i32,
    pub xp_max: i32,
}

#[derive(Serialize, Deserialize, PartialEq, Clone, Debug, ToSchema)]
pub struct MemberXpDto {
    #[serde(with = "crate::model::snowflake")]
    #[schema(value_type = String)]
    pub user_id: u64,
    pub xp: i64,
    pub level: u32,
}

#[derive(Serialize, Deserialize, PartialEq, Clone, Debug, ToSchema)]
pub struct PaginatedLeaderboardDto {
    /// Highest XP first.
    pub members: Vec<MemberXpDto>,
    pub total: u64,
    pub page: u64,
    pub per_page: u64,
    pub total_pages: u64,
}

/// Manual XP change applied from the dashboard.
#[derive(Serialize, Deserialize, PartialEq, Clone, Debug, ToSchema)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum MemberXpActionDto {
    /// Adds (or with a negative amount removes) XP. Totals never drop below zero.
    AddXp { amount: i64 },
    /// Sets XP to the minimum of `level`.
    SetLevel { level: u32 },
}

#[derive(Serialize, Deserialize, PartialEq, Clone, Debug, ToSchema)]
pub struct LevelRoleDto {
    pub level: u32,
    #[serde(with = "crate::model::snowflake")]
    #[schema(value_type = String)]
    pub role_id: u64,
}

#[derive(Serialize, Deserialize, PartialEq, Clone, Debug, ToSchema)]
pub struct SetLevelRoleDto {
    #[serde(with = "crate::model::snowflake")]
    #[schema(value_type = String)]
    pub role_id: u64,
}

#[derive(Serialize, Deserialize, PartialEq, Clone, Debug, Default, ToSchema)]
pub struct LevelingSetupDto {
    /// Levels that get a role. Defaults to 5, 10, 20, 30, 50, 80 and 100.
    #[serde(default)]
    pub milestones: Option<Vec<u32>>,
}

#[derive(Serialize, Deserialize, PartialEq, Clone, Debug, ToSchema)]
pub struct LevelingSetupRequestDto {
    pub milestones: Vec<u32>,
    pub requested_at: DateTime<Utc>,
}
