//! Warning factory.

use crate::factory::helpers::next_id;
use chrono::Utc;
use sea_orm::{ActiveModelTrait, ActiveValue, DatabaseConnection, DbErr};

/// Inserts a warning for `user_id` in `guild_id` issued by a generated moderator.
pub async fn create_warning(
    db: &DatabaseConnection,
    guild_id: impl Into<String>,
    user_id: impl Into<String>,
) -> Result<entity::warning::Model, DbErr> {
    let moderator_id = next_id();
    entity::warning::ActiveModel {
        guild_id: ActiveValue::Set(guild_id.into()),
        user_id: ActiveValue::Set(user_id.into()),
        moderator_id: ActiveValue::Set(moderator_id.to_string()),
        reason: ActiveValue::Set(format!("Warning from moderator {}", moderator_id)),
        created_at: ActiveValue::Set(Utc::now()),
        ..Default::default()
    }
    .insert(db)
    .await
}
