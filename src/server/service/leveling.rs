//! Leveling: XP for chat activity, roles granted at level milestones and leaderboards.
//!
//! A member earns a random amount of XP (15 to 25 by default) for a guild message at most
//! once per [`MESSAGE_XP_COOLDOWN_SECS`]. Level roles are kept in sync whenever a member's
//! level changes through the bot. Dashboard adjustments only store XP; roles catch up on the
//! member's next level change or a moderator's `/setlevel`.

use chrono::{DateTime, Duration, Utc};
use rand::Rng;
use sea_orm::DatabaseConnection;

use crate::{
    model::leveling::PaginatedLeaderboardDto,
    server::{
        bot::{
            event::InboundMessage,
            platform::{color, EmbedSpec, OutgoingMessage, Platform},
        },
        data::{leveling::LevelingRepository, total_pages},
        error::AppError,
        model::leveling::{
            normalize_milestones, role_color_for_level, role_name_for_level, xp_for_level,
            LevelProgress, LevelRole, LevelingConfig, LevelingSetupRequest, MemberXp,
            XpAdjustment, XpChange, MAX_LEVEL,
        },
    },
};

pub const MESSAGE_XP_COOLDOWN_SECS: i64 = 60;

const MAX_XP_PER_MESSAGE: i32 = 1000;
const MAX_XP_ADJUSTMENT: i64 = 1_000_000;
const MAX_MILESTONES: usize = 25;

/// Everything `/rank` shows.
#[derive(Debug, Clone, PartialEq)]
pub struct RankCard {
    pub member: MemberXp,
    /// 1 plus the number of members with more XP.
    pub rank: u64,
    pub progress: LevelProgress,
}

/// Parses a comma-separated milestone list such as `5, 10, 20`.
pub fn parse_milestones(input: &str) -> Result<Vec<u32>, AppError> {
    input
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| {
            s.parse::<u32>()
                .map_err(|_| AppError::InvalidArgument(format!("`{}` is not a level.", s)))
        })
        .collect()
}

fn validate_milestones(milestones: Vec<u32>) -> Result<Vec<u32>, AppError> {
    let milestones = normalize_milestones(milestones);

    if milestones.is_empty() {
        return Err(AppError::InvalidArgument(
            "Give at least one milestone level.".to_string(),
        ));
    }
    if milestones.len() > MAX_MILESTONES {
        return Err(AppError::InvalidArgument(format!(
            "At most {} milestones can be set up at once.",
            MAX_MILESTONES
        )));
    }
    if let Some(bad) = milestones.iter().find(|l| **l == 0 || **l > MAX_LEVEL) {
        return Err(AppError::InvalidArgument(format!(
            "Milestone {} is out of range; levels go from 1 to {}.",
            bad, MAX_LEVEL
        )));
    }

    Ok(milestones)
}

fn validate_role_level(level: u32) -> Result<(), AppError> {
    if level == 0 || level > MAX_LEVEL {
        return Err(AppError::InvalidArgument(format!(
            "Level roles can be set for levels 1 to {}.",
            MAX_LEVEL
        )));
    }
    Ok(())
}

pub struct LevelingService<'a> {
    db: &'a DatabaseConnection,
}

impl<'a> LevelingService<'a> {
    pub fn new(db: &'a DatabaseConnection) -> Self {
        Self { db }
    }

    /// Stored settings, or the defaults for a guild that never changed them.
    pub async fn get_config(&self, guild_id: u64) -> Result<LevelingConfig, AppError> {
        Ok(LevelingRepository::new(self.db)
            .find_config(guild_id)
            .await?
            .unwrap_or_else(|| LevelingConfig::default_for(guild_id)))
    }

    pub async fn save_config(&self, config: LevelingConfig) -> Result<LevelingConfig, AppError> {
        if config.xp_min < 1 || config.xp_max < config.xp_min {
            return Err(AppError::InvalidArgument(
                "XP per message needs a minimum of at least 1 and a maximum no lower than it."
                    .to_string(),
            ));
        }
        if config.xp_max > MAX_XP_PER_MESSAGE {
            return Err(AppError::InvalidArgument(format!(
                "XP per message cannot exceed {}.",
                MAX_XP_PER_MESSAGE
            )));
        }

        Ok(LevelingRepository::new(self.db).upsert_config(config).await?)
    }

    /// Awards message XP to the author, syncs level roles on a level change and announces
    /// level-ups.
    ///
    /// # Returns
    /// - `Ok(Some(XpChange))` - XP was granted
    /// - `Ok(None)` - Leveling is disabled or the author is on cooldown
    pub async fn on_message(
        &self,
        platform: &dyn Platform,
        message: &InboundMessage,
        guild_id: u64,
        now: DateTime<Utc>,
    ) -> Result<Option<XpChange>, AppError> {
        let config = self.get_config(guild_id).await?;
        if !config.enabled {
            return Ok(None);
        }

        let low = config.xp_min.min(config.xp_max).max(0);
        let high = config.xp_max.max(low);
        let amount = i64::from(rand::rng().random_range(low..=high));

        let Some(change) = LevelingRepository::new(self.db)
            .award_message_xp(
                guild_id,
                message.author.id,
                amount,
                now,
                now - Duration::seconds(MESSAGE_XP_COOLDOWN_SECS),
            )
            .await?
        else {
            return Ok(None);
        };

        if change.level_changed() {
            if let Err(e) = self
                .sync_level_roles(platform, guild_id, message.author.id, change.new_level())
                .await
            {
                tracing::warn!(
                    "Failed to sync level roles of user {} in guild {}: {}",
                    message.author.id,
                    guild_id,
                    e
                );
            }
        }

        if change.leveled_up() {
            let channel_id = config.level_up_channel_id.unwrap_or(message.channel_id);
            let announcement = EmbedSpec::new()
                .title("🎉 Level Up!")
                .description(format!(
                    "<@{}> reached **level {}**!",
                    message.author.id,
                    change.new_level()
                ))
                .color(color::SUCCESS);

            if let Err(e) = platform
                .send_message(channel_id, OutgoingMessage::embed(announcement))
                .await
            {
                tracing::warn!(
                    "Failed to announce level {} of user {} in channel {}: {}",
                    change.new_level(),
                    message.author.id,
                    channel_id,
                    e
                );
            }

            tracing::info!(
                "User {} reached level {} in guild {}",
                message.author.id,
                change.new_level(),
                guild_id
            );
        }

        Ok(Some(change))
    }

    pub async fn rank(&self, guild_id: u64, user_id: u64) -> Result<RankCard, AppError> {
        let repo = LevelingRepository::new(self.db);
        let member = repo
            .find_member(guild_id, user_id)
            .await?
            .unwrap_or_else(|| MemberXp::empty(guild_id, user_id));
        let rank = repo.count_ahead(guild_id, member.xp).await? + 1;

        Ok(RankCard {
            progress: LevelProgress::for_xp(member.xp),
            member,
            rank,
        })
    }

    /// The top `limit` members, highest XP first.
    pub async fn leaderboard(&self, guild_id: u64, limit: u64) -> Result<Vec<MemberXp>, AppError> {
        let (members, _) = LevelingRepository::new(self.db)
            .leaderboard(guild_id, 0, limit)
            .await?;

        Ok(members)
    }

    pub async fn get_paginated(
        &self,
        guild_id: u64,
        page: u64,
        per_page: u64,
    ) -> Result<PaginatedLeaderboardDto, AppError> {
        let (members, total) = LevelingRepository::new(self.db)
            .leaderboard(guild_id, page, per_page)
            .await?;

        Ok(PaginatedLeaderboardDto {
            members: members.into_iter().map(MemberXp::into_dto).collect(),
            total,
            page,
            per_page,
            total_pages: total_pages(total, per_page),
        })
    }

    /// Applies a moderator's XP change. Level roles are not touched; callers with a
    /// platform follow up with [`Self::sync_level_roles`].
    ///
    /// # Returns
    /// - `Ok(XpChange)` - Stored total and the level before the change
    /// - `Err(AppError::InvalidArgument)` - Amount or level out of range
    pub async fn adjust(
        &self,
        guild_id: u64,
        user_id: u64,
        adjustment: XpAdjustment,
        now: DateTime<Utc>,
    ) -> Result<XpChange, AppError> {
        let repo = LevelingRepository::new(self.db);

        let change = match adjustment {
            XpAdjustment::Add(amount) => {
                if amount == 0 || amount.abs() > MAX_XP_ADJUSTMENT {
                    return Err(AppError::InvalidArgument(format!(
                        "XP changes must be between 1 and {} in either direction.",
                        MAX_XP_ADJUSTMENT
                    )));
                }
                repo.adjust_xp(guild_id, user_id, now, |xp| xp.saturating_add(amount))
                    .await?
            }
            XpAdjustment::SetLevel(level) => {
                if level > MAX_LEVEL {
                    return Err(AppError::InvalidArgument(format!(
                        "Levels go from 0 to {}.",
                        MAX_LEVEL
                    )));
                }
                let xp = xp_for_level(level);
                repo.adjust_xp(guild_id, user_id, now, |_| xp).await?
            }
        };

        tracing::info!(
            "XP of user {} in guild {} set to {} (level {} -> {})",
            user_id,
            guild_id,
            change.member.xp,
            change.old_level,
            change.new_level()
        );

        Ok(change)
    }

    /// Grants every level role at or below `level` and revokes those above it.
    ///
    /// A failed grant or revoke is logged and skipped so one misconfigured role does not
    /// block the rest.
    ///
    /// # Returns
    /// - `Ok(usize)` - Number of roles granted or revoked; 0 when the user left the guild
    pub async fn sync_level_roles(
        &self,
        platform: &dyn Platform,
        guild_id: u64,
        user_id: u64,
        level: u32,
    ) -> Result<usize, AppError> {
        let roles = LevelingRepository::new(self.db).level_roles(guild_id).await?;
        if roles.is_empty() {
            return Ok(0);
        }
        let Some(held) = platform.member_role_ids(guild_id, user_id).await? else {
            return Ok(0);
        };

        let mut changed = 0;
        for role in roles {
            let has = held.contains(&role.role_id);
            let result = if level >= role.level && !has {
                platform
                    .add_role(
                        guild_id,
                        user_id,
                        role.role_id,
                        &format!("Reached level {}", role.level),
                    )
                    .await
            } else if level < role.level && has {
                platform
                    .remove_role(
                        guild_id,
                        user_id,
                        role.role_id,
                        &format!("No longer level {}", role.level),
                    )
                    .await
            } else {
                continue;
            };

            match result {
                Ok(()) => changed += 1,
                Err(e) => tracing::warn!(
                    "Failed to update level {} role {} of user {}: {}",
                    role.level,
                    role.role_id,
                    user_id,
                    e
                ),
            }
        }

        Ok(changed)
    }

    pub async fn level_roles(&self, guild_id: u64) -> Result<Vec<LevelRole>, AppError> {
        Ok(LevelingRepository::new(self.db).level_roles(guild_id).await?)
    }

    pub async fn set_level_role(
        &self,
        guild_id: u64,
        level: u32,
        role_id: u64,
    ) -> Result<LevelRole, AppError> {
        validate_role_level(level)?;

        Ok(LevelingRepository::new(self.db)
            .upsert_level_role(guild_id, level, role_id, Utc::now())
            .await?)
    }

    pub async fn remove_level_role(&self, guild_id: u64, level: u32) -> Result<(), AppError> {
        if LevelingRepository::new(self.db)
            .delete_level_role(guild_id, level)
            .await?
        {
            Ok(())
        } else {
            Err(AppError::NotFound(format!(
                "No role is set for level {}.",
                level
            )))
        }
    }

    /// Creates (or reuses, by name) one role per milestone and binds it to that level.
    ///
    /// Roles that cannot be created are logged and skipped.
    ///
    /// # Returns
    /// - `Ok(Vec<LevelRole>)` - Bindings stored, lowest level first
    /// - `Err(AppError::InvalidArgument)` - Empty list or a level out of range
    pub async fn setup(
        &self,
        platform: &dyn Platform,
        guild_id: u64,
        milestones: Vec<u32>,
    ) -> Result<Vec<LevelRole>, AppError> {
        let milestones = validate_milestones(milestones)?;
        let repo = LevelingRepository::new(self.db);

        let mut bound = Vec::with_capacity(milestones.len());
        for level in milestones {
            let name = role_name_for_level(level);
            let role_id = match platform
                .ensure_role(guild_id, &name, role_color_for_level(level))
                .await
            {
                Ok(id) => id,
                Err(e) => {
                    tracing::warn!(
                        "Failed to create role '{}' in guild {}: {}",
                        name,
                        guild_id,
                        e
                    );
                    continue;
                }
            };

            bound.push(
                repo.upsert_level_role(guild_id, level, role_id, Utc::now())
                    .await?,
            );
        }

        tracing::info!(
            "Set up {} level role(s) in guild {}",
            bound.len(),
            guild_id
        );

        Ok(bound)
    }

    /// Queues a setup for the bot to run on its next tick. The dashboard has no gateway
    /// connection, so it cannot create roles itself.
    pub async fn queue_setup(
        &self,
        guild_id: u64,
        milestones: Vec<u32>,
        requested_by: u64,
        now: DateTime<Utc>,
    ) -> Result<LevelingSetupRequest, AppError> {
        let milestones = validate_milestones(milestones)?;

        Ok(LevelingRepository::new(self.db)
            .queue_setup(guild_id, &milestones, requested_by, now)
            .await?)
    }

    /// Runs every queued setup once.
    ///
    /// # Returns
    /// - `Ok(usize)` - Number of requests run
    pub async fn process_setup_requests(&self, platform: &dyn Platform) -> Result<usize, AppError> {
        let repo = LevelingRepository::new(self.db);

        let mut processed = 0;
        for request in repo.pending_setups().await? {
            if !repo.take_setup(&request).await? {
                continue;
            }

            match self
                .setup(platform, request.guild_id, request.milestones)
                .await
            {
                Ok(_) => processed += 1,
                Err(e) => tracing::error!(
                    "Queued level role setup for guild {} by user {} failed: {}",
                    request.guild_id,
                    request.requested_by,
                    e
                ),
            }
        }

        Ok(processed)
    }
}
