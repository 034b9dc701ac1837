//! Dashboard operator factory.

use crate::factory::helpers::next_id;
use chrono::{DateTime, Utc};
use sea_orm::{ActiveModelTrait, ActiveValue, DatabaseConnection, DbErr};

pub struct OperatorFactory<'a> {
    db: &'a DatabaseConnection,
    discord_id: String,
    name: String,
    guilds_synced_at: DateTime<Utc>,
}

impl<'a> OperatorFactory<'a> {
    /// Defaults: unique discord id, synced now.
    pub fn new(db: &'a DatabaseConnection) -> Self {
        let id = next_id();
        Self {
            db,
            discord_id: id.to_string(),
            name: format!("Operator {}", id),
            guilds_synced_at: Utc::now(),
        }
    }

    pub fn discord_id(mut self, discord_id: impl Into<String>) -> Self {
        self.discord_id = discord_id.into();
        self
    }

    pub fn guilds_synced_at(mut self, synced_at: DateTime<Utc>) -> Self {
        self.guilds_synced_at = synced_at;
        self
    }

    pub async fn build(self) -> Result<entity::operator::Model, DbErr> {
        entity::operator::ActiveModel {
            discord_id: ActiveValue::Set(self.discord_id),
            name: ActiveValue::Set(self.name),
            guilds_synced_at: ActiveValue::Set(self.guilds_synced_at),
        }
        .insert(self.db)
        .await
    }
}

/// Records that `operator_id` holds `permissions` in `guild_id`.
pub async fn add_operator_guild(
    db: &DatabaseConnection,
    operator_id: impl Into<String>,
    guild_id: impl Into<String>,
    permissions: i64,
) -> Result<entity::operator_guild::Model, DbErr> {
    let guild_id = guild_id.into();
    entity::operator_guild::ActiveModel {
        operator_id: ActiveValue::Set(operator_id.into()),
        guild_name: ActiveValue::Set(format!("Guild {}", guild_id)),
        guild_id: ActiveValue::Set(guild_id),
        permissions: ActiveValue::Set(permissions),
    }
    .insert(db)
    .await
}

/// Creates an operator holding `permissions` in `guild_id`.
pub async fn create_operator_with_guild(
    db: &DatabaseConnection,
    guild_id: impl Into<String>,
    permissions: i64,
) -> Result<entity::operator::Model, DbErr> {
    let operator = OperatorFactory::new(db).build().await?;
    add_operator_guild(db, operator.discord_id.clone(), guild_id, permissions).await?;
    Ok(operator)
}
