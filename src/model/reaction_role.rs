use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Serialize, Deserialize, PartialEq, Clone, Debug, ToSchema)]
pub struct ReactionRoleDto {
    #[serde(with = "crate::model::snowflake")]
    #[schema(value_type = String)]
    pub channel_id: u64,
    #[serde(with = "crate::model::snowflake")]
    #[schema(value_type = String)]
    pub message_id: u64,
    pub emoji: String,
    #[serde(with = "crate::model::snowflake")]
    #[schema(value_type = String)]
    pub role_id: u64,
}
