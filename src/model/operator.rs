use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Serialize, Deserialize, PartialEq, Clone, Debug, ToSchema)]
pub struct ManagedGuildDto {
    #[serde(with = "crate::model::snowflake")]
    #[schema(value_type = String)]
    pub guild_id: u64,
    pub name: String,
}

#[derive(Serialize, Deserialize, PartialEq, Clone, Debug, ToSchema)]
pub struct OperatorDto {
    #[serde(with = "crate::model::snowflake")]
    #[schema(value_type = String)]
    pub discord_id: u64,
    pub name: String,
    /// Guilds where the operator may edit settings.
    pub guilds: Vec<ManagedGuildDto>,
}
