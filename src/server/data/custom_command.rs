//! Custom command repository. Commands are keyed by `(guild_id, name)`.

use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ActiveValue, ColumnTrait, DatabaseConnection, DbErr, EntityTrait,
    QueryFilter, QueryOrder,
};

use crate::server::model::custom_command::{
    CreateCustomCommandParams, CustomCommand, UpdateCustomCommandParams,
};

pub struct CustomCommandRepository<'a> {
    db: &'a DatabaseConnection,
}

impl<'a> CustomCommandRepository<'a> {
    pub fn new(db: &'a DatabaseConnection) -> Self {
        Self { db }
    }

    /// Inserts a new command.
    ///
    /// # Returns
    /// - `Ok(CustomCommand)` - The stored command
    /// - `Err(DbErr)` - Insert failed; a duplicate `(guild_id, name)` surfaces as a unique
    ///   constraint violation
    pub async fn create(&self, params: CreateCustomCommandParams) -> Result<CustomCommand, DbErr> {
        let entity = entity::custom_command::ActiveModel {
            guild_id: ActiveValue::Set(params.guild_id.to_string()),
            name: ActiveValue::Set(params.name),
            response: ActiveValue::Set(params.response),
            embed: ActiveValue::Set(params.embed),
            created_by: ActiveValue::Set(params.created_by.to_string()),
            created_at: ActiveValue::Set(Utc::now()),
        }
        .insert(self.db)
        .await?;

        CustomCommand::from_entity(entity)
    }

    pub async fn find(&self, guild_id: u64, name: &str) -> Result<Option<CustomCommand>, DbErr> {
        entity::prelude::CustomCommand::find_by_id((guild_id.to_string(), name.to_string()))
            .one(self.db)
            .await?
            .map(CustomCommand::from_entity)
            .transpose()
    }

    /// Applies the provided fields to an existing command.
    ///
    /// # Returns
    /// - `Ok(Some(CustomCommand))` - Updated command
    /// - `Ok(None)` - No command with that name in the guild
    pub async fn update(
        &self,
        params: UpdateCustomCommandParams,
    ) -> Result<Option<CustomCommand>, DbErr> {
        let Some(existing) = entity::prelude::CustomCommand::find_by_id((
            params.guild_id.to_string(),
            params.name.clone(),
        ))
        .one(self.db)
        .await?
        else {
            return Ok(None);
        };

        let mut model: entity::custom_command::ActiveModel = existing.into();
        if let Some(response) = params.response {
            model.response = ActiveValue::Set(response);
        }
        if let Some(embed) = params.embed {
            model.embed = ActiveValue::Set(embed);
        }

        let entity = model.update(self.db).await?;
        Ok(Some(CustomCommand::from_entity(entity)?))
    }

    /// Deletes a command, returning whether a row was removed.
    pub async fn delete(&self, guild_id: u64, name: &str) -> Result<bool, DbErr> {
        let result =
            entity::prelude::CustomCommand::delete_by_id((guild_id.to_string(), name.to_string()))
                .exec(self.db)
                .await?;

        Ok(result.rows_affected > 0)
    }

    /// All commands of a guild ordered by name.
    pub async fn list(&self, guild_id: u64) -> Result<Vec<CustomCommand>, DbErr> {
        entity::prelude::CustomCommand::find()
            .filter(entity::custom_command::Column::GuildId.eq(guild_id.to_string()))
            .order_by_asc(entity::custom_command::Column::Name)
            .all(self.db)
            .await?
            .into_iter()
            .map(CustomCommand::from_entity)
            .collect()
    }
}
