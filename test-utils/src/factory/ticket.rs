//! Ticket configuration factory.

use crate::factory::helpers::next_id;
use sea_orm::{ActiveModelTrait, ActiveValue, DatabaseConnection, DbErr};

/// Configures tickets for `guild_id` with generated category and staff role ids and no log
/// channel.
pub async fn create_ticket_config(
    db: &DatabaseConnection,
    guild_id: impl Into<String>,
) -> Result<entity::ticket_config::Model, DbErr> {
    entity::ticket_config::ActiveModel {
        guild_id: ActiveValue::Set(guild_id.into()),
        category_id: ActiveValue::Set(next_id().to_string()),
        staff_role_id: ActiveValue::Set(next_id().to_string()),
        log_channel_id: ActiveValue::Set(None),
    }
    .insert(db)
    .await
}
