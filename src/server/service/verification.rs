use sea_orm::DatabaseConnection;

use crate::server::{
    bot::platform::{color, EmbedSpec, OutgoingMessage, Platform},
    data::verification::VerificationRepository,
    error::AppError,
    model::verification::VerificationConfig,
};

/// Custom id of the button on the verification panel.
pub const VERIFY_BUTTON_ID: &str = "verify-accept";

const MAX_TITLE_LEN: usize = 256;
const MAX_MESSAGE_LEN: usize = 2000;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VerifyOutcome {
    Verified,
    AlreadyVerified,
}

pub struct VerificationService<'a> {
    db: &'a DatabaseConnection,
}

impl<'a> VerificationService<'a> {
    pub fn new(db: &'a DatabaseConnection) -> Self {
        Self { db }
    }

    pub async fn get(&self, guild_id: u64) -> Result<Option<VerificationConfig>, AppError> {
        Ok(VerificationRepository::new(self.db).find(guild_id).await?)
    }

    /// Validates and stores the configuration without posting a panel.
    pub async fn save(&self, config: VerificationConfig) -> Result<VerificationConfig, AppError> {
        validate(&config)?;

        Ok(VerificationRepository::new(self.db).upsert(config).await?)
    }

    /// Stores the configuration and posts the verification panel into its channel.
    ///
    /// # Returns
    /// - `Ok((VerificationConfig, u64))` - Stored configuration and the panel's message id
    /// - `Err(AppError::InvalidArgument)` - Title or message out of range
    pub async fn setup(
        &self,
        platform: &dyn Platform,
        config: VerificationConfig,
    ) -> Result<(VerificationConfig, u64), AppError> {
        let config = self.save(config).await?;

        let panel = EmbedSpec::new()
            .title(config.title.clone())
            .description(config.message.clone())
            .color(color::INFO);
        let message_id = platform
            .send_message(
                config.channel_id,
                OutgoingMessage::embed(panel).with_button(VERIFY_BUTTON_ID, "Verify"),
            )
            .await?;

        tracing::info!(
            "Posted verification panel {} in channel {} for guild {}",
            message_id,
            config.channel_id,
            config.guild_id
        );

        Ok((config, message_id))
    }

    /// Handles a press of the verification button.
    pub async fn accept(
        &self,
        platform: &dyn Platform,
        guild_id: u64,
        user_id: u64,
    ) -> Result<VerifyOutcome, AppError> {
        let config = self.get(guild_id).await?.ok_or_else(|| {
            AppError::NotFound("Verification is not set up on this server.".to_string())
        })?;

        let roles = platform
            .member_role_ids(guild_id, user_id)
            .await?
            .ok_or_else(|| AppError::NotFound("You are not a member of this server.".to_string()))?;

        if roles.contains(&config.verified_role_id) {
            return Ok(VerifyOutcome::AlreadyVerified);
        }

        platform
            .add_role(guild_id, user_id, config.verified_role_id, "Verified")
            .await?;

        if let Some(unverified) = config.unverified_role_id {
            if roles.contains(&unverified) {
                platform
                    .remove_role(guild_id, user_id, unverified, "Verified")
                    .await?;
            }
        }

        Ok(VerifyOutcome::Verified)
    }

    /// Gives a new member the unverified role when one is configured.
    pub async fn on_member_join(
        &self,
        platform: &dyn Platform,
        guild_id: u64,
        user_id: u64,
    ) -> Result<(), AppError> {
        let Some(role_id) = self.get(guild_id).await?.and_then(|c| c.unverified_role_id) else {
            return Ok(());
        };

        platform
            .add_role(guild_id, user_id, role_id, "Awaiting verification")
            .await
    }
}

fn validate(config: &VerificationConfig) -> Result<(), AppError> {
    let title = config.title.trim();
    if title.is_empty() || title.chars().count() > MAX_TITLE_LEN {
        return Err(AppError::InvalidArgument(format!(
            "The panel title must be 1-{} characters.",
            MAX_TITLE_LEN
        )));
    }

    let message = config.message.trim();
    if message.is_empty() || message.chars().count() > MAX_MESSAGE_LEN {
        return Err(AppError::InvalidArgument(format!(
            "The panel message must be 1-{} characters.",
            MAX_MESSAGE_LEN
        )));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::server::{
        bot::fake::{Call, FakePlatform},
        model::verification::{DEFAULT_MESSAGE, DEFAULT_TITLE},
    };
    use test_utils::builder::TestBuilder;

    const VERIFIED: u64 = 500;
    const UNVERIFIED: u64 = 501;

    fn config() -> VerificationConfig {
        VerificationConfig {
            guild_id: 10,
            verified_role_id: VERIFIED,
            unverified_role_id: Some(UNVERIFIED),
            channel_id: 20,
            title: DEFAULT_TITLE.to_string(),
            message: DEFAULT_MESSAGE.to_string(),
        }
    }

    /// Tests that setup stores the config and posts a panel with the verify button.
    ///
    /// Expected: config readable, one message with one `verify-accept` button
    #[tokio::test]
    async fn setup_posts_panel() -> Result<(), AppError> {
        let test = TestBuilder::new()
            .with_table(entity::prelude::VerificationConfig)
            .build()
            .await
            .unwrap();
        let db = test.db.as_ref().unwrap();
        let platform = FakePlatform::new();
        let service = VerificationService::new(db);

        service.setup(&platform, config()).await?;

        assert_eq!(service.get(10).await?, Some(config()));
        let panel = platform.messages_to(20);
        assert_eq!(panel.len(), 1);
        assert_eq!(panel[0].buttons[0].custom_id, VERIFY_BUTTON_ID);

        Ok(())
    }

    /// Tests that accepting swaps the unverified role for the verified one, once.
    ///
    /// Expected: Verified, then AlreadyVerified with no further role calls
    #[tokio::test]
    async fn accept_grants_role_once() -> Result<(), AppError> {
        let test = TestBuilder::new()
            .with_table(entity::prelude::VerificationConfig)
            .build()
            .await
            .unwrap();
        let db = test.db.as_ref().unwrap();
        let platform = FakePlatform::new().with_member(10, 42, &[UNVERIFIED]);
        let service = VerificationService::new(db);
        service.save(config()).await?;

        assert_eq!(service.accept(&platform, 10, 42).await?, VerifyOutcome::Verified);
        assert_eq!(platform.roles_of(10, 42), vec![VERIFIED]);

        assert_eq!(
            service.accept(&platform, 10, 42).await?,
            VerifyOutcome::AlreadyVerified
        );
        assert_eq!(
            platform.count(|c| matches!(c, Call::AddRole { .. } | Call::RemoveRole { .. })),
            2
        );

        Ok(())
    }

    /// Tests that pressing the button in an unconfigured guild is NotFound.
    ///
    /// Expected: Err(NotFound)
    #[tokio::test]
    async fn accept_without_config_is_not_found() -> Result<(), AppError> {
        let test = TestBuilder::new()
            .with_table(entity::prelude::VerificationConfig)
            .build()
            .await
            .unwrap();
        let db = test.db.as_ref().unwrap();
        let platform = FakePlatform::new().with_member(10, 42, &[]);

        let result = VerificationService::new(db).accept(&platform, 10, 42).await;

        assert!(matches!(result, Err(AppError::NotFound(_))));

        Ok(())
    }

    /// Tests that an over-long title is rejected before anything is stored.
    ///
    /// Expected: Err(InvalidArgument), no config
    #[tokio::test]
    async fn rejects_long_title() -> Result<(), AppError> {
        let test = TestBuilder::new()
            .with_table(entity::prelude::VerificationConfig)
            .build()
            .await
            .unwrap();
        let db = test.db.as_ref().unwrap();
        let service = VerificationService::new(db);

        let mut invalid = config();
        invalid.title = "x".repeat(MAX_TITLE_LEN + 1);

        assert!(matches!(
            service.save(invalid).await,
            Err(AppError::InvalidArgument(_))
        ));
        assert!(service.get(10).await?.is_none());

        Ok(())
    }

    /// Tests that joining members get the unverified role.
    ///
    /// Expected: AddRole for the unverified role
    #[tokio::test]
    async fn join_assigns_unverified_role() -> Result<(), AppError> {
        let test = TestBuilder::new()
            .with_table(entity::prelude::VerificationConfig)
            .build()
            .await
            .unwrap();
        let db = test.db.as_ref().unwrap();
        let platform = FakePlatform::new().with_member(10, 42, &[]);
        let service = VerificationService::new(db);
        service.save(config()).await?;

        service.on_member_join(&platform, 10, 42).await?;

        assert_eq!(platform.roles_of(10, 42), vec![UNVERIFIED]);

        Ok(())
    }
}
