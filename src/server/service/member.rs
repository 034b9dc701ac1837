use sea_orm::DatabaseConnection;

use crate::server::{
    bot::{
        event::MemberEvent,
        platform::{OutgoingMessage, Platform},
    },
    data::guild_config::GuildConfigRepository,
    error::AppError,
    service::verification::VerificationService,
    util::template::{needs_guild_summary, render, TemplateContext},
};

/// Reacts to members joining and leaving a guild.
///
/// Each step is independent: a failed welcome message does not prevent the auto-role, and
/// failures are logged rather than returned since nobody is waiting on a reply.
pub struct MemberService<'a> {
    db: &'a DatabaseConnection,
}

impl<'a> MemberService<'a> {
    pub fn new(db: &'a DatabaseConnection) -> Self {
        Self { db }
    }

    /// Sends the welcome message, grants the auto-role and the unverified role.
    pub async fn on_join(&self, platform: &dyn Platform, event: &MemberEvent) -> Result<(), AppError> {
        let config = GuildConfigRepository::new(self.db)
            .get_or_create(event.guild_id)
            .await?;

        if let (Some(channel_id), Some(template)) =
            (config.welcome_channel_id, config.welcome_message.as_deref())
        {
            if let Err(e) = self.announce(platform, event, channel_id, template).await {
                tracing::warn!(
                    "Failed to welcome user {} in guild {}: {}",
                    event.user.id,
                    event.guild_id,
                    e
                );
            }
        }

        if let Some(role_id) = config.auto_role_id {
            if let Err(e) = platform
                .add_role(event.guild_id, event.user.id, role_id, "Auto-role")
                .await
            {
                tracing::warn!(
                    "Failed to grant auto-role {} to user {}: {}",
                    role_id,
                    event.user.id,
                    e
                );
            }
        }

        if let Err(e) = VerificationService::new(self.db)
            .on_member_join(platform, event.guild_id, event.user.id)
            .await
        {
            tracing::warn!(
                "Failed to assign unverified role to user {}: {}",
                event.user.id,
                e
            );
        }

        Ok(())
    }

    /// Posts the leave message into the welcome channel.
    pub async fn on_leave(&self, platform: &dyn Platform, event: &MemberEvent) -> Result<(), AppError> {
        let config = GuildConfigRepository::new(self.db)
            .get_or_create(event.guild_id)
            .await?;

        if let (Some(channel_id), Some(template)) =
            (config.welcome_channel_id, config.leave_message.as_deref())
        {
            if let Err(e) = self.announce(platform, event, channel_id, template).await {
                tracing::warn!(
                    "Failed to post leave message for user {} in guild {}: {}",
                    event.user.id,
                    event.guild_id,
                    e
                );
            }
        }

        Ok(())
    }

    async fn announce(
        &self,
        platform: &dyn Platform,
        event: &MemberEvent,
        channel_id: u64,
        template: &str,
    ) -> Result<(), AppError> {
        let (server_name, member_count) = if needs_guild_summary(template) {
            let summary = platform.guild_summary(event.guild_id).await?;
            (summary.name, summary.member_count)
        } else {
            (String::new(), 0)
        };

        let text = render(
            template,
            &TemplateContext {
                user_id: event.user.id,
                user_name: &event.user.name,
                server_name: &server_name,
                channel_id: None,
                member_count,
            },
        );

        platform
            .send_message(channel_id, OutgoingMessage::text(text))
            .await?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::server::bot::{
        event::Actor,
        fake::{FakePlatform, GUILD_NAME},
    };
    use test_utils::{builder::TestBuilder, factory::guild_config::GuildConfigFactory};

    fn member(guild_id: u64) -> MemberEvent {
        MemberEvent {
            guild_id,
            user: Actor {
                id: 42,
                name: "ferris".to_string(),
                bot: false,
            },
        }
    }

    /// Tests the join flow with a welcome message and auto-role configured.
    ///
    /// Expected: rendered welcome in the channel, auto-role granted
    #[tokio::test]
    async fn join_welcomes_and_assigns_role() -> Result<(), AppError> {
        let test = TestBuilder::new()
            .with_table(entity::prelude::GuildConfig)
            .with_table(entity::prelude::VerificationConfig)
            .build()
            .await
            .unwrap();
        let db = test.db.as_ref().unwrap();
        GuildConfigFactory::new(db)
            .guild_id("10")
            .welcome("20", "Welcome {user} to {server}! We are {membercount}.")
            .auto_role_id("30")
            .build()
            .await?;
        let platform = FakePlatform::new().with_member(10, 42, &[]);

        MemberService::new(db).on_join(&platform, &member(10)).await?;

        let welcome = platform.messages_to(20);
        assert_eq!(
            welcome[0].content.as_deref(),
            Some(format!("Welcome <@42> to {}! We are 1.", GUILD_NAME).as_str())
        );
        assert_eq!(platform.roles_of(10, 42), vec![30]);

        Ok(())
    }

    /// Tests that a guild without configuration does nothing on join.
    ///
    /// Expected: no calls, config row created with defaults
    #[tokio::test]
    async fn join_without_config_is_quiet() -> Result<(), AppError> {
        let test = TestBuilder::new()
            .with_table(entity::prelude::GuildConfig)
            .with_table(entity::prelude::VerificationConfig)
            .build()
            .await
            .unwrap();
        let db = test.db.as_ref().unwrap();
        let platform = FakePlatform::new();

        MemberService::new(db).on_join(&platform, &member(11)).await?;

        assert!(platform.calls().is_empty());
        assert!(GuildConfigRepository::new(db).find(11).await?.is_some());

        Ok(())
    }

    /// Tests that the leave message goes to the welcome channel.
    ///
    /// Expected: one message with the user's name
    #[tokio::test]
    async fn leave_posts_to_welcome_channel() -> Result<(), AppError> {
        let test = TestBuilder::new()
            .with_table(entity::prelude::GuildConfig)
            .build()
            .await
            .unwrap();
        let db = test.db.as_ref().unwrap();
        GuildConfigFactory::new(db)
            .guild_id("10")
            .welcome("20", "Hi {user}")
            .leave_message("{user.name} left")
            .build()
            .await?;
        let platform = FakePlatform::new();

        MemberService::new(db).on_leave(&platform, &member(10)).await?;

        assert_eq!(
            platform.messages_to(20)[0].content.as_deref(),
            Some("ferris left")
        );

        Ok(())
    }
}
