//! Custom command factory.

use crate::factory::helpers::next_id;
use chrono::Utc;
use sea_orm::{ActiveModelTrait, ActiveValue, DatabaseConnection, DbErr};

pub struct CustomCommandFactory<'a> {
    db: &'a DatabaseConnection,
    guild_id: String,
    name: String,
    response: String,
    embed: bool,
    created_by: String,
}

impl<'a> CustomCommandFactory<'a> {
    /// Defaults: response `"Hello {user}!"`, plain text, unique creator id.
    pub fn new(db: &'a DatabaseConnection, guild_id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            db,
            guild_id: guild_id.into(),
            name: name.into(),
            response: "Hello {user}!".to_string(),
            embed: false,
            created_by: next_id().to_string(),
        }
    }

    pub fn response(mut self, response: impl Into<String>) -> Self {
        self.response = response.into();
        self
    }

    pub fn embed(mut self, embed: bool) -> Self {
        self.embed = embed;
        self
    }

    pub async fn build(self) -> Result<entity::custom_command::Model, DbErr> {
        entity::custom_command::ActiveModel {
            guild_id: ActiveValue::Set(self.guild_id),
            name: ActiveValue::Set(self.name),
            response: ActiveValue::Set(self.response),
            embed: ActiveValue::Set(self.embed),
            created_by: ActiveValue::Set(self.created_by),
            created_at: ActiveValue::Set(Utc::now()),
        }
        .insert(self.db)
        .await
    }
}

pub async fn create_custom_command(
    db: &DatabaseConnection,
    guild_id: impl Into<String>,
    name: impl Into<String>,
) -> Result<entity::custom_command::Model, DbErr> {
    CustomCommandFactory::new(db, guild_id, name).build().await
}
