//! Moderation actions: kick, ban, timeouts, warnings, purge and slowmode.
//!
//! Every action that targets a member first runs [`ModerationService::check_hierarchy`]:
//! nobody can target themselves or the guild owner, the owner can target anyone else, and
//! everyone else needs a highest role strictly above the target's. Completed actions are
//! recorded in the guild's mod-log channel when one is configured. A failure to write the
//! log never fails the action.

use chrono::{DateTime, Duration, Utc};
use sea_orm::DatabaseConnection;

use crate::{
    model::warning::PaginatedWarningsDto,
    server::{
        bot::{
            event::Actor,
            platform::{color, EmbedSpec, OutgoingMessage, Platform},
        },
        data::{guild_config::GuildConfigRepository, total_pages, warning::WarningRepository},
        error::AppError,
        model::warning::{CreateWarningParams, Warning},
    },
};

pub const MAX_TIMEOUT_MINUTES: u32 = 40_320;
pub const MAX_PURGE: u8 = 100;
pub const MAX_SLOWMODE_SECONDS: u16 = 21_600;
pub const MAX_BAN_DELETE_DAYS: u8 = 7;

const NO_REASON: &str = "No reason provided";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModAction {
    Kick,
    Ban,
    Unban,
    Timeout,
    Untimeout,
    Warn,
    ClearWarnings,
}

impl ModAction {
    fn title(self) -> &'static str {
        match self {
            Self::Kick => "Member Kicked",
            Self::Ban => "Member Banned",
            Self::Unban => "Member Unbanned",
            Self::Timeout => "Member Timed Out",
            Self::Untimeout => "Timeout Removed",
            Self::Warn => "Member Warned",
            Self::ClearWarnings => "Warnings Cleared",
        }
    }

    fn color(self) -> u32 {
        match self {
            Self::Ban => color::DANGER,
            Self::Kick | Self::Timeout | Self::Warn => color::WARNING,
            Self::Unban | Self::Untimeout | Self::ClearWarnings => color::SUCCESS,
        }
    }
}

/// One entry for the mod-log channel.
#[derive(Debug, Clone)]
pub struct ModLogEntry<'r> {
    pub action: ModAction,
    pub target_id: u64,
    pub moderator: &'r Actor,
    pub reason: Option<&'r str>,
    /// Extra field such as a timeout end or a warning count.
    pub detail: Option<(&'static str, String)>,
}

pub struct ModerationService<'a> {
    db: &'a DatabaseConnection,
}

impl<'a> ModerationService<'a> {
    pub fn new(db: &'a DatabaseConnection) -> Self {
        Self { db }
    }

    /// Verifies that `actor_id` may moderate `target_id`.
    ///
    /// # Returns
    /// - `Ok(())` - Allowed
    /// - `Err(AppError::InvalidArgument)` - Actor and target are the same user
    /// - `Err(AppError::PermissionDenied)` - Target is the owner or not below the actor
    pub async fn check_hierarchy(
        &self,
        platform: &dyn Platform,
        guild_id: u64,
        actor_id: u64,
        target_id: u64,
    ) -> Result<(), AppError> {
        if actor_id == target_id {
            return Err(AppError::InvalidArgument(
                "You cannot use this on yourself.".to_string(),
            ));
        }

        let guild = platform.guild_summary(guild_id).await?;
        if target_id == guild.owner_id {
            return Err(AppError::PermissionDenied(
                "The server owner cannot be moderated.".to_string(),
            ));
        }
        if actor_id == guild.owner_id {
            return Ok(());
        }

        let actor_position = platform.top_role_position(guild_id, actor_id).await?;
        let target_position = platform.top_role_position(guild_id, target_id).await?;
        if actor_position <= target_position {
            return Err(AppError::PermissionDenied(format!(
                "<@{}>'s highest role is not below yours.",
                target_id
            )));
        }

        Ok(())
    }

    pub async fn kick(
        &self,
        platform: &dyn Platform,
        guild_id: u64,
        actor: &Actor,
        target_id: u64,
        reason: Option<&str>,
    ) -> Result<(), AppError> {
        require_member(platform, guild_id, target_id).await?;
        self.check_hierarchy(platform, guild_id, actor.id, target_id)
            .await?;

        notify_target(platform, guild_id, target_id, "kicked from", reason).await;
        platform
            .kick(guild_id, target_id, &audit_reason(actor, reason))
            .await?;

        self.log_action(
            platform,
            guild_id,
            ModLogEntry {
                action: ModAction::Kick,
                target_id,
                moderator: actor,
                reason,
                detail: None,
            },
        )
        .await;

        Ok(())
    }

    /// Bans a user. The target does not have to be a member, which allows pre-emptive bans.
    pub async fn ban(
        &self,
        platform: &dyn Platform,
        guild_id: u64,
        actor: &Actor,
        target_id: u64,
        reason: Option<&str>,
        delete_message_days: u8,
    ) -> Result<(), AppError> {
        if delete_message_days > MAX_BAN_DELETE_DAYS {
            return Err(AppError::InvalidArgument(format!(
                "Messages can be deleted for at most {} days.",
                MAX_BAN_DELETE_DAYS
            )));
        }

        let is_member = platform.member_role_ids(guild_id, target_id).await?.is_some();
        if is_member {
            self.check_hierarchy(platform, guild_id, actor.id, target_id)
                .await?;
            notify_target(platform, guild_id, target_id, "banned from", reason).await;
        } else if actor.id == target_id {
            return Err(AppError::InvalidArgument(
                "You cannot use this on yourself.".to_string(),
            ));
        }

        platform
            .ban(
                guild_id,
                target_id,
                delete_message_days,
                &audit_reason(actor, reason),
            )
            .await?;

        self.log_action(
            platform,
            guild_id,
            ModLogEntry {
                action: ModAction::Ban,
                target_id,
                moderator: actor,
                reason,
                detail: None,
            },
        )
        .await;

        Ok(())
    }

    pub async fn unban(
        &self,
        platform: &dyn Platform,
        guild_id: u64,
        actor: &Actor,
        user_id: u64,
        reason: Option<&str>,
    ) -> Result<(), AppError> {
        platform
            .unban(guild_id, user_id, &audit_reason(actor, reason))
            .await?;

        self.log_action(
            platform,
            guild_id,
            ModLogEntry {
                action: ModAction::Unban,
                target_id: user_id,
                moderator: actor,
                reason,
                detail: None,
            },
        )
        .await;

        Ok(())
    }

    /// Times a member out for `minutes`, returning when the timeout ends.
    pub async fn timeout(
        &self,
        platform: &dyn Platform,
        guild_id: u64,
        actor: &Actor,
        target_id: u64,
        minutes: u32,
        reason: Option<&str>,
    ) -> Result<DateTime<Utc>, AppError> {
        if minutes == 0 || minutes > MAX_TIMEOUT_MINUTES {
            return Err(AppError::InvalidArgument(format!(
                "Timeouts last between 1 and {} minutes.",
                MAX_TIMEOUT_MINUTES
            )));
        }

        require_member(platform, guild_id, target_id).await?;
        self.check_hierarchy(platform, guild_id, actor.id, target_id)
            .await?;

        let until = Utc::now() + Duration::minutes(minutes as i64);
        platform.timeout(guild_id, target_id, Some(until)).await?;

        self.log_action(
            platform,
            guild_id,
            ModLogEntry {
                action: ModAction::Timeout,
                target_id,
                moderator: actor,
                reason,
                detail: Some(("Until", format!("<t:{}:f>", until.timestamp()))),
            },
        )
        .await;

        Ok(until)
    }

    pub async fn untimeout(
        &self,
        platform: &dyn Platform,
        guild_id: u64,
        actor: &Actor,
        target_id: u64,
    ) -> Result<(), AppError> {
        require_member(platform, guild_id, target_id).await?;
        self.check_hierarchy(platform, guild_id, actor.id, target_id)
            .await?;

        platform.timeout(guild_id, target_id, None).await?;

        self.log_action(
            platform,
            guild_id,
            ModLogEntry {
                action: ModAction::Untimeout,
                target_id,
                moderator: actor,
                reason: None,
                detail: None,
            },
        )
        .await;

        Ok(())
    }

    /// Stores a warning and DMs the member their new total.
    ///
    /// # Returns
    /// - `Ok((Warning, u64))` - The stored warning and the member's warning count
    pub async fn warn(
        &self,
        platform: &dyn Platform,
        guild_id: u64,
        actor: &Actor,
        target_id: u64,
        reason: &str,
    ) -> Result<(Warning, u64), AppError> {
        let reason = reason.trim();
        if reason.is_empty() {
            return Err(AppError::InvalidArgument(
                "A warning needs a reason.".to_string(),
            ));
        }

        require_member(platform, guild_id, target_id).await?;
        self.check_hierarchy(platform, guild_id, actor.id, target_id)
            .await?;

        let repo = WarningRepository::new(self.db);
        let warning = repo
            .create(CreateWarningParams {
                guild_id,
                user_id: target_id,
                moderator_id: actor.id,
                reason: reason.to_string(),
            })
            .await?;
        let total = repo.count(guild_id, target_id).await?;

        let server = server_name(platform, guild_id).await;
        let dm = OutgoingMessage::embed(
            EmbedSpec::new()
                .title(format!("You were warned in {}", server))
                .description(reason)
                .color(color::WARNING)
                .footer(format!("You now have {} warning(s).", total)),
        );
        if let Err(e) = platform.send_direct_message(target_id, dm).await {
            tracing::debug!("Could not DM warning to user {}: {}", target_id, e);
        }

        self.log_action(
            platform,
            guild_id,
            ModLogEntry {
                action: ModAction::Warn,
                target_id,
                moderator: actor,
                reason: Some(reason),
                detail: Some(("Total warnings", total.to_string())),
            },
        )
        .await;

        Ok((warning, total))
    }

    pub async fn warnings(&self, guild_id: u64, user_id: u64) -> Result<Vec<Warning>, AppError> {
        Ok(WarningRepository::new(self.db)
            .list_for_user(guild_id, user_id)
            .await?)
    }

    /// Deletes all of a member's warnings, returning how many were removed.
    pub async fn clear_warnings(&self, guild_id: u64, user_id: u64) -> Result<u64, AppError> {
        let cleared = WarningRepository::new(self.db)
            .clear(guild_id, user_id)
            .await?;

        tracing::info!(
            "Cleared {} warning(s) for user {} in guild {}",
            cleared,
            user_id,
            guild_id
        );

        Ok(cleared)
    }

    /// Gets a page of a guild's warnings, optionally for one member
    pub async fn get_paginated(
        &self,
        guild_id: u64,
        user_id: Option<u64>,
        page: u64,
        per_page: u64,
    ) -> Result<PaginatedWarningsDto, AppError> {
        let (warnings, total) = WarningRepository::new(self.db)
            .get_paginated(guild_id, user_id, page, per_page)
            .await?;

        Ok(PaginatedWarningsDto {
            warnings: warnings.into_iter().map(Warning::into_dto).collect(),
            total,
            page,
            per_page,
            total_pages: total_pages(total, per_page),
        })
    }

    pub async fn purge(
        &self,
        platform: &dyn Platform,
        channel_id: u64,
        amount: u8,
    ) -> Result<usize, AppError> {
        if amount == 0 || amount > MAX_PURGE {
            return Err(AppError::InvalidArgument(format!(
                "You can purge between 1 and {} messages.",
                MAX_PURGE
            )));
        }

        platform.purge(channel_id, amount).await
    }

    pub async fn slowmode(
        &self,
        platform: &dyn Platform,
        channel_id: u64,
        seconds: u16,
    ) -> Result<(), AppError> {
        if seconds > MAX_SLOWMODE_SECONDS {
            return Err(AppError::InvalidArgument(format!(
                "Slowmode can be at most {} seconds.",
                MAX_SLOWMODE_SECONDS
            )));
        }

        platform.set_slowmode(channel_id, seconds).await
    }

    /// Posts `entry` to the mod-log channel, if the guild has one.
    pub async fn log_action(&self, platform: &dyn Platform, guild_id: u64, entry: ModLogEntry<'_>) {
        let channel_id = match GuildConfigRepository::new(self.db).find(guild_id).await {
            Ok(Some(config)) => config.modlog_channel_id,
            Ok(None) => None,
            Err(e) => {
                tracing::warn!("Failed to read mod-log channel for guild {}: {}", guild_id, e);
                None
            }
        };
        let Some(channel_id) = channel_id else {
            return;
        };

        let mut embed = EmbedSpec::new()
            .title(entry.action.title())
            .color(entry.action.color())
            .field("User", format!("<@{}>", entry.target_id), true)
            .field("Moderator", format!("<@{}>", entry.moderator.id), true)
            .field("Reason", entry.reason.unwrap_or(NO_REASON), false)
            .timestamp(Utc::now());
        if let Some((name, value)) = entry.detail {
            embed = embed.field(name, value, true);
        }

        if let Err(e) = platform
            .send_message(channel_id, OutgoingMessage::embed(embed))
            .await
        {
            tracing::warn!(
                "Failed to write mod-log entry in channel {} of guild {}: {}",
                channel_id,
                guild_id,
                e
            );
        }
    }
}

async fn require_member(
    platform: &dyn Platform,
    guild_id: u64,
    user_id: u64,
) -> Result<(), AppError> {
    match platform.member_role_ids(guild_id, user_id).await? {
        Some(_) => Ok(()),
        None => Err(AppError::NotFound(format!(
            "<@{}> is not a member of this server.",
            user_id
        ))),
    }
}

async fn server_name(platform: &dyn Platform, guild_id: u64) -> String {
    match platform.guild_summary(guild_id).await {
        Ok(summary) => summary.name,
        Err(_) => "the server".to_string(),
    }
}

/// DMs the target before the action; a closed DM channel is not an error.
async fn notify_target(
    platform: &dyn Platform,
    guild_id: u64,
    target_id: u64,
    verb: &str,
    reason: Option<&str>,
) {
    let server = server_name(platform, guild_id).await;
    let message = OutgoingMessage::embed(
        EmbedSpec::new()
            .title(format!("You were {} {}", verb, server))
            .description(reason.unwrap_or(NO_REASON))
            .color(color::DANGER),
    );

    if let Err(e) = platform.send_direct_message(target_id, message).await {
        tracing::debug!("Could not DM user {} before moderation: {}", target_id, e);
    }
}

fn audit_reason(actor: &Actor, reason: Option<&str>) -> String {
    format!("{}: {}", actor.name, reason.unwrap_or(NO_REASON))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::server::bot::fake::{Call, FakePlatform};
    use test_utils::{builder::TestBuilder, factory::guild_config::GuildConfigFactory};

    const GUILD: u64 = 10;
    const OWNER: u64 = 1;
    const MOD: u64 = 2;
    const MEMBER: u64 = 3;

    fn actor(id: u64) -> Actor {
        Actor {
            id,
            name: format!("user{}", id),
            bot: false,
        }
    }

    fn platform() -> FakePlatform {
        FakePlatform::new()
            .with_owner(OWNER)
            .with_member(GUILD, OWNER, &[])
            .with_member(GUILD, MOD, &[100])
            .with_member(GUILD, MEMBER, &[])
            .with_position(MOD, 5)
            .with_position(MEMBER, 1)
    }

    /// Tests that a moderator cannot act on a member ranked at or above them.
    ///
    /// Expected: Err(PermissionDenied) and no kick issued
    #[tokio::test]
    async fn denies_equal_or_higher_target() -> Result<(), AppError> {
        let test = TestBuilder::new()
            .with_table(entity::prelude::GuildConfig)
            .build()
            .await
            .unwrap();
        let db = test.db.as_ref().unwrap();
        let platform = platform().with_position(MEMBER, 5);

        let result = ModerationService::new(db)
            .kick(&platform, GUILD, &actor(MOD), MEMBER, None)
            .await;

        assert!(matches!(result, Err(AppError::PermissionDenied(_))));
        assert_eq!(platform.count(|c| matches!(c, Call::Kick { .. })), 0);

        Ok(())
    }

    /// Tests that the owner can never be targeted while the owner can target anyone.
    ///
    /// Expected: PermissionDenied against the owner, Ok for the owner acting
    #[tokio::test]
    async fn owner_rules() -> Result<(), AppError> {
        let test = TestBuilder::new()
            .with_table(entity::prelude::GuildConfig)
            .build()
            .await
            .unwrap();
        let db = test.db.as_ref().unwrap();
        let platform = platform();
        let service = ModerationService::new(db);

        let against_owner = service.check_hierarchy(&platform, GUILD, MOD, OWNER).await;
        let by_owner = service.check_hierarchy(&platform, GUILD, OWNER, MOD).await;
        let on_self = service.check_hierarchy(&platform, GUILD, MOD, MOD).await;

        assert!(matches!(against_owner, Err(AppError::PermissionDenied(_))));
        assert!(by_owner.is_ok());
        assert!(matches!(on_self, Err(AppError::InvalidArgument(_))));

        Ok(())
    }

    /// Tests that a kick DMs the target first and is recorded in the mod-log channel.
    ///
    /// Expected: DM, kick and mod-log embed in that order
    #[tokio::test]
    async fn kick_notifies_then_logs() -> Result<(), AppError> {
        let test = TestBuilder::new()
            .with_table(entity::prelude::GuildConfig)
            .build()
            .await
            .unwrap();
        let db = test.db.as_ref().unwrap();
        GuildConfigFactory::new(db)
            .guild_id(GUILD.to_string())
            .modlog_channel_id("77")
            .build()
            .await?;
        let platform = platform();

        ModerationService::new(db)
            .kick(&platform, GUILD, &actor(MOD), MEMBER, Some("spam"))
            .await?;

        let calls = platform.calls();
        let dm = calls
            .iter()
            .position(|c| matches!(c, Call::DirectMessage { user_id: MEMBER, .. }));
        let kick = calls
            .iter()
            .position(|c| matches!(c, Call::Kick { user_id: MEMBER }));
        assert!(dm.is_some() && kick.is_some() && dm < kick);

        let log = platform.messages_to(77);
        assert_eq!(log.len(), 1);
        let embed = log[0].embed.as_ref().unwrap();
        assert_eq!(embed.title.as_deref(), Some("Member Kicked"));

        Ok(())
    }

    /// Tests that a closed DM channel does not prevent a ban.
    ///
    /// Expected: Ok with a ban issued
    #[tokio::test]
    async fn ban_ignores_dm_failure() -> Result<(), AppError> {
        let test = TestBuilder::new()
            .with_table(entity::prelude::GuildConfig)
            .build()
            .await
            .unwrap();
        let db = test.db.as_ref().unwrap();
        let platform = platform().with_closed_dms(MEMBER);

        ModerationService::new(db)
            .ban(&platform, GUILD, &actor(MOD), MEMBER, None, 1)
            .await?;

        assert_eq!(
            platform.count(|c| matches!(
                c,
                Call::Ban {
                    user_id: MEMBER,
                    delete_message_days: 1
                }
            )),
            1
        );

        Ok(())
    }

    /// Tests that N warnings followed by a clear leave the member with none.
    ///
    /// Expected: counts 1..=3 while warning, 0 after clearing
    #[tokio::test]
    async fn warn_then_clear() -> Result<(), AppError> {
        let test = TestBuilder::new()
            .with_table(entity::prelude::GuildConfig)
            .with_table(entity::prelude::Warning)
            .build()
            .await
            .unwrap();
        let db = test.db.as_ref().unwrap();
        let platform = platform();
        let service = ModerationService::new(db);

        for expected in 1..=3 {
            let (_, total) = service
                .warn(&platform, GUILD, &actor(MOD), MEMBER, "rule 1")
                .await?;
            assert_eq!(total, expected);
        }

        assert_eq!(service.clear_warnings(GUILD, MEMBER).await?, 3);
        assert!(service.warnings(GUILD, MEMBER).await?.is_empty());
        assert_eq!(platform.direct_messages_to(MEMBER).len(), 3);

        Ok(())
    }

    /// Tests that a timeout outside the allowed range is rejected.
    ///
    /// Expected: Err(InvalidArgument)
    #[tokio::test]
    async fn timeout_range_is_checked() -> Result<(), AppError> {
        let test = TestBuilder::new()
            .with_table(entity::prelude::GuildConfig)
            .build()
            .await
            .unwrap();
        let db = test.db.as_ref().unwrap();
        let platform = platform();

        let result = ModerationService::new(db)
            .timeout(&platform, GUILD, &actor(MOD), MEMBER, 40_321, None)
            .await;

        assert!(matches!(result, Err(AppError::InvalidArgument(_))));

        Ok(())
    }
}
