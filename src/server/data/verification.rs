use migration::OnConflict;
use sea_orm::{ActiveValue, DatabaseConnection, DbErr, EntityTrait};

use crate::server::model::verification::VerificationConfig;

pub struct VerificationRepository<'a> {
    db: &'a DatabaseConnection,
}

impl<'a> VerificationRepository<'a> {
    pub fn new(db: &'a DatabaseConnection) -> Self {
        Self { db }
    }

    pub async fn find(&self, guild_id: u64) -> Result<Option<VerificationConfig>, DbErr> {
        entity::prelude::VerificationConfig::find_by_id(guild_id.to_string())
            .one(self.db)
            .await?
            .map(VerificationConfig::from_entity)
            .transpose()
    }

    /// Inserts or replaces the guild's verification settings.
    pub async fn upsert(&self, config: VerificationConfig) -> Result<VerificationConfig, DbErr> {
        use entity::verification_config::Column;

        let entity = entity::prelude::VerificationConfig::insert(
            entity::verification_config::ActiveModel {
                guild_id: ActiveValue::Set(config.guild_id.to_string()),
                verified_role_id: ActiveValue::Set(config.verified_role_id.to_string()),
                unverified_role_id: ActiveValue::Set(
                    config.unverified_role_id.map(|id| id.to_string()),
                ),
                channel_id: ActiveValue::Set(config.channel_id.to_string()),
                title: ActiveValue::Set(config.title),
                message: ActiveValue::Set(config.message),
            },
        )
        .on_conflict(
            OnConflict::column(Column::GuildId)
                .update_columns([
                    Column::VerifiedRoleId,
                    Column::UnverifiedRoleId,
                    Column::ChannelId,
                    Column::Title,
                    Column::Message,
                ])
                .to_owned(),
        )
        .exec_with_returning(self.db)
        .await?;

        VerificationConfig::from_entity(entity)
    }
}
