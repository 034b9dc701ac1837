use sea_orm::DatabaseConnection;

use crate::server::{
    data::guild_config::GuildConfigRepository,
    error::AppError,
    model::guild_config::{GuildConfig, GuildSetting, UpdateGuildConfigParams, MAX_PREFIX_LEN},
};

const MAX_MESSAGE_LEN: usize = 2000;

pub struct GuildConfigService<'a> {
    db: &'a DatabaseConnection,
}

impl<'a> GuildConfigService<'a> {
    pub fn new(db: &'a DatabaseConnection) -> Self {
        Self { db }
    }

    /// Gets the guild's configuration, creating the default row on first access
    pub async fn get(&self, guild_id: u64) -> Result<GuildConfig, AppError> {
        let repo = GuildConfigRepository::new(self.db);

        Ok(repo.get_or_create(guild_id).await?)
    }

    /// Changes a single setting after validating it.
    ///
    /// # Returns
    /// - `Ok(GuildConfig)` - The configuration after the change
    /// - `Err(AppError::InvalidArgument)` - Prefix or message failed validation
    pub async fn apply(&self, guild_id: u64, setting: GuildSetting) -> Result<GuildConfig, AppError> {
        let setting = match setting {
            GuildSetting::Prefix(prefix) => GuildSetting::Prefix(validate_prefix(&prefix)?),
            GuildSetting::Welcome {
                channel_id,
                message,
            } => GuildSetting::Welcome {
                channel_id,
                message: validate_message("Welcome message", &message)?,
            },
            GuildSetting::LeaveMessage(message) => {
                GuildSetting::LeaveMessage(validate_message("Leave message", &message)?)
            }
            other => other,
        };

        let repo = GuildConfigRepository::new(self.db);

        Ok(repo.apply(guild_id, setting).await?)
    }

    /// Replaces every editable setting, as submitted from the dashboard.
    ///
    /// Blank messages are stored as unset.
    pub async fn update(&self, mut params: UpdateGuildConfigParams) -> Result<GuildConfig, AppError> {
        params.prefix = validate_prefix(&params.prefix)?;
        params.welcome_message = optional_message("Welcome message", params.welcome_message)?;
        params.leave_message = optional_message("Leave message", params.leave_message)?;

        let repo = GuildConfigRepository::new(self.db);

        Ok(repo.update(params).await?)
    }
}

fn validate_prefix(prefix: &str) -> Result<String, AppError> {
    let prefix = prefix.trim();
    let len = prefix.chars().count();

    if len == 0 || len > MAX_PREFIX_LEN || prefix.chars().any(char::is_whitespace) {
        return Err(AppError::InvalidArgument(format!(
            "The prefix must be 1 to {} characters without spaces.",
            MAX_PREFIX_LEN
        )));
    }

    Ok(prefix.to_string())
}

fn validate_message(label: &str, message: &str) -> Result<String, AppError> {
    let message = message.trim();

    if message.is_empty() {
        return Err(AppError::InvalidArgument(format!("{} cannot be empty.", label)));
    }
    if message.chars().count() > MAX_MESSAGE_LEN {
        return Err(AppError::InvalidArgument(format!(
            "{} cannot be longer than {} characters.",
            label, MAX_MESSAGE_LEN
        )));
    }

    Ok(message.to_string())
}

fn optional_message(label: &str, message: Option<String>) -> Result<Option<String>, AppError> {
    match message {
        Some(m) if !m.trim().is_empty() => validate_message(label, &m).map(Some),
        _ => Ok(None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_utils::builder::TestBuilder;

    /// Tests that prefix changes are validated before they reach the database.
    ///
    /// Expected: Err(InvalidArgument) and the stored prefix unchanged
    #[tokio::test]
    async fn rejects_prefix_with_spaces() -> Result<(), AppError> {
        let test = TestBuilder::new()
            .with_table(entity::prelude::GuildConfig)
            .build()
            .await
            .unwrap();
        let db = test.db.as_ref().unwrap();
        let service = GuildConfigService::new(db);

        let result = service
            .apply(10, GuildSetting::Prefix("a b".to_string()))
            .await;

        assert!(matches!(result, Err(AppError::InvalidArgument(_))));
        assert_eq!(service.get(10).await?.prefix, "!");

        Ok(())
    }

    /// Tests that a dashboard update trims the prefix and clears blank messages.
    ///
    /// Expected: Ok with prefix "?" and no leave message
    #[tokio::test]
    async fn update_normalizes_input() -> Result<(), AppError> {
        let test = TestBuilder::new()
            .with_table(entity::prelude::GuildConfig)
            .build()
            .await
            .unwrap();
        let db = test.db.as_ref().unwrap();

        let config = GuildConfigService::new(db)
            .update(UpdateGuildConfigParams {
                guild_id: 10,
                prefix: " ? ".to_string(),
                modlog_channel_id: Some(5),
                welcome_channel_id: None,
                welcome_message: Some("Hi {user}".to_string()),
                leave_message: Some("   ".to_string()),
                auto_role_id: None,
                modmail_enabled: true,
            })
            .await?;

        assert_eq!(config.prefix, "?");
        assert_eq!(config.welcome_message.as_deref(), Some("Hi {user}"));
        assert_eq!(config.leave_message, None);
        assert!(config.modmail_enabled);

        Ok(())
    }
}
