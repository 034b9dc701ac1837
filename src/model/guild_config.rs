use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Serialize, Deserialize, PartialEq, Clone, Debug, ToSchema)]
pub struct GuildConfigDto {
    #[serde(with = "crate::model::snowflake")]
    #[schema(value_type = String)]
    pub guild_id: u64,
    pub prefix: String,
    #[serde(with = "crate::model::snowflake::option")]
    #[schema(value_type = Option<String>)]
    pub modlog_channel_id: Option<u64>,
    #[serde(with = "crate::model::snowflake::option")]
    #[schema(value_type = Option<String>)]
    pub welcome_channel_id: Option<u64>,
    pub welcome_message: Option<String>,
    pub leave_message: Option<String>,
    #[serde(with = "crate::model::snowflake::option")]
    #[schema(value_type = Option<String>)]
    pub auto_role_id: Option<u64>,
    pub modmail_enabled: bool,
    pub updated_at: DateTime<Utc>,
}

/// Full replacement of a guild's editable settings.
#[derive(Serialize, Deserialize, PartialEq, Clone, Debug, ToSchema)]
pub struct UpdateGuildConfigDto {
    pub prefix: String,
    #[serde(with = "crate::model::snowflake::option", default)]
    #[schema(value_type = Option<String>)]
    pub modlog_channel_id: Option<u64>,
    #[serde(with = "crate::model::snowflake::option", default)]
    #[schema(value_type = Option<String>)]
    pub welcome_channel_id: Option<u64>,
    #[serde(default)]
    pub welcome_message: Option<String>,
    #[serde(default)]
    pub leave_message: Option<String>,
    #[serde(with = "crate::model::snowflake::option", default)]
    #[schema(value_type = Option<String>)]
    pub auto_role_id: Option<u64>,
    #[serde(default)]
    pub modmail_enabled: bool,
}
