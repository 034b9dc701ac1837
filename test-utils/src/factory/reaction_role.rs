//! Reaction-role binding factory.

use crate::factory::helpers::next_id;
use sea_orm::{ActiveModelTrait, ActiveValue, DatabaseConnection, DbErr};

/// Binds `emoji` on `message_id` to `role_id` in `guild_id`, with a generated channel id.
pub async fn create_binding(
    db: &DatabaseConnection,
    guild_id: impl Into<String>,
    message_id: impl Into<String>,
    emoji: impl Into<String>,
    role_id: impl Into<String>,
) -> Result<entity::reaction_role::Model, DbErr> {
    entity::reaction_role::ActiveModel {
        message_id: ActiveValue::Set(message_id.into()),
        emoji: ActiveValue::Set(emoji.into()),
        guild_id: ActiveValue::Set(guild_id.into()),
        channel_id: ActiveValue::Set(next_id().to_string()),
        role_id: ActiveValue::Set(role_id.into()),
    }
    .insert(db)
    .await
}
