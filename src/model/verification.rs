use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Serialize, Deserialize, PartialEq, Clone, Debug, ToSchema)]
pub struct VerificationConfigDto {
    #[serde(with = "crate::model::snowflake")]
    #[schema(value_type = String)]
    pub verified_role_id: u64,
    #[serde(with = "crate::model::snowflake::option", default)]
    #[schema(value_type = Option<String>)]
    pub unverified_role_id: Option<u64>,
    #[serde(with = "crate::model::snowflake")]
    #[schema(value_type = String)]
    pub channel_id: u64,
    pub title: String,
    pub message: String,
}
