use migration::OnConflict;
use sea_orm::{
    ColumnTrait, DatabaseConnection, DbErr, EntityTrait, QueryFilter, QueryOrder,
};

use crate::server::model::reaction_role::ReactionRoleBinding;

pub struct ReactionRoleRepository<'a> {
    db: &'a DatabaseConnection,
}

impl<'a> ReactionRoleRepository<'a> {
    pub fn new(db: &'a DatabaseConnection) -> Self {
        Self { db }
    }

    /// Creates the binding or rebinds an existing (message, emoji) pair to a new role.
    pub async fn upsert(&self, binding: ReactionRoleBinding) -> Result<ReactionRoleBinding, DbErr> {
        use entity::reaction_role::Column;

        let entity = entity::prelude::ReactionRole::insert(entity::reaction_role::ActiveModel {
            message_id: sea_orm::ActiveValue::Set(binding.message_id.to_string()),
            emoji: sea_orm::ActiveValue::Set(binding.emoji),
            guild_id: sea_orm::ActiveValue::Set(binding.guild_id.to_string()),
            channel_id: sea_orm::ActiveValue::Set(binding.channel_id.to_string()),
            role_id: sea_orm::ActiveValue::Set(binding.role_id.to_string()),
        })
        .on_conflict(
            OnConflict::columns([Column::MessageId, Column::Emoji])
                .update_columns([Column::RoleId, Column::ChannelId])
                .to_owned(),
        )
        .exec_with_returning(self.db)
        .await?;

        ReactionRoleBinding::from_entity(entity)
    }

    pub async fn find(
        &self,
        message_id: u64,
        emoji: &str,
    ) -> Result<Option<ReactionRoleBinding>, DbErr> {
        entity::prelude::ReactionRole::find_by_id((message_id.to_string(), emoji.to_string()))
            .one(self.db)
            .await?
            .map(ReactionRoleBinding::from_entity)
            .transpose()
    }

    /// Removes a binding if it belongs to `guild_id`, returning whether one was removed.
    pub async fn delete(&self, guild_id: u64, message_id: u64, emoji: &str) -> Result<bool, DbErr> {
        use entity::reaction_role::Column;

        let result = entity::prelude::ReactionRole::delete_many()
            .filter(Column::GuildId.eq(guild_id.to_string()))
            .filter(Column::MessageId.eq(message_id.to_string()))
            .filter(Column::Emoji.eq(emoji))
            .exec(self.db)
            .await?;

        Ok(result.rows_affected > 0)
    }

    pub async fn list(&self, guild_id: u64) -> Result<Vec<ReactionRoleBinding>, DbErr> {
        use entity::reaction_role::Column;

        entity::prelude::ReactionRole::find()
            .filter(Column::GuildId.eq(guild_id.to_string()))
            .order_by_asc(Column::MessageId)
            .order_by_asc(Column::Emoji)
            .all(self.db)
            .await?
            .into_iter()
            .map(ReactionRoleBinding::from_entity)
            .collect()
    }
}
