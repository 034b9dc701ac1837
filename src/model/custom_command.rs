use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Serialize, Deserialize, PartialEq, Clone, Debug, ToSchema)]
pub struct CustomCommandDto {
    pub name: String,
    pub response: String,
    pub embed: bool,
    #[serde(with = "crate::model::snowflake")]
    #[schema(value_type = String)]
    pub created_by: u64,
    pub created_at: DateTime<Utc>,
}

#[derive(Serialize, Deserialize, PartialEq, Clone, Debug, ToSchema)]
pub struct CreateCustomCommandDto {
    pub name: String,
    pub response: String,
    #[serde(default)]
    pub embed: bool,
}

#[derive(Serialize, Deserialize, PartialEq, Clone, Debug, ToSchema)]
pub struct UpdateCustomCommandDto {
    #[serde(default)]
    pub response: Option<String>,
    #[serde(default)]
    pub embed: Option<bool>,
}
