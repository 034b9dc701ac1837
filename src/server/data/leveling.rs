//! Leveling repository: per-guild settings, member XP, level roles and queued role setups.
//!
//! XP writes are compare-and-set updates filtered on the XP value they were computed from,
//! so two messages or a message and a moderator adjustment can never add onto the same
//! stale total.

use chrono::{DateTime, Utc};
use migration::OnConflict;
use sea_orm::{
    sea_query::Expr, ActiveModelTrait, ActiveValue, ColumnTrait, Condition, DatabaseConnection,
    DbErr, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder,
};

use crate::server::{
    data::is_unique_violation,
    model::leveling::{
        level_for_xp, LevelRole, LevelingConfig, LevelingSetupRequest, MemberXp, XpChange,
    },
};

const MAX_ADJUST_ATTEMPTS: usize = 5;

pub struct LevelingRepository<'a> {
    db: &'a DatabaseConnection,
}

impl<'a> LevelingRepository<'a> {
    pub fn new(db: &'a DatabaseConnection) -> Self {
        Self { db }
    }

    pub async fn find_config(&self, guild_id: u64) -> Result<Option<LevelingConfig>, DbErr> {
        entity::prelude::LevelingConfig::find_by_id(guild_id.to_string())
            .one(self.db)
            .await?
            .map(LevelingConfig::from_entity)
            .transpose()
    }

    pub async fn upsert_config(&self, config: LevelingConfig) -> Result<LevelingConfig, DbErr> {
        use entity::leveling_config::Column;

        let entity = entity::prelude::LevelingConfig::insert(entity::leveling_config::ActiveModel {
            guild_id: ActiveValue::Set(config.guild_id.to_string()),
            enabled: ActiveValue::Set(config.enabled),
            level_up_channel_id: ActiveValue::Set(
                config.level_up_channel_id.map(|id| id.to_string()),
            ),
            xp_min: ActiveValue::Set(config.xp_min),
            xp_max: ActiveValue::Set(config.xp_max),
        })
        .on_conflict(
            OnConflict::column(Column::GuildId)
                .update_columns([
                    Column::Enabled,
                    Column::LevelUpChannelId,
                    Column::XpMin,
                    Column::XpMax,
                ])
                .to_owned(),
        )
        .exec_with_returning(self.db)
        .await?;

        LevelingConfig::from_entity(entity)
    }

    pub async fn find_member(&self, guild_id: u64, user_id: u64) -> Result<Option<MemberXp>, DbErr> {
        entity::prelude::MemberXp::find_by_id((guild_id.to_string(), user_id.to_string()))
            .one(self.db)
            .await?
            .map(MemberXp::from_entity)
            .transpose()
    }

    /// Adds `amount` XP for a chat message unless the member already earned message XP
    /// after `cooldown_cutoff`.
    ///
    /// # Returns
    /// - `Ok(Some(XpChange))` - XP was granted
    /// - `Ok(None)` - Member is on cooldown, or a concurrent write changed their XP first
    pub async fn award_message_xp(
        &self,
        guild_id: u64,
        user_id: u64,
        amount: i64,
        now: DateTime<Utc>,
        cooldown_cutoff: DateTime<Utc>,
    ) -> Result<Option<XpChange>, DbErr> {
        use entity::member_xp::Column;

        let Some(current) = self.find_member(guild_id, user_id).await? else {
            return match self.insert_member(guild_id, user_id, amount, Some(now), now).await {
                Ok(member) => Ok(Some(XpChange {
                    member,
                    old_level: 0,
                })),
                // Another message created the row first and took this cooldown window.
                Err(e) if is_unique_violation(&e) => Ok(None),
                Err(e) => Err(e),
            };
        };

        if current
            .last_message_xp_at
            .is_some_and(|at| at > cooldown_cutoff)
        {
            return Ok(None);
        }

        let new_xp = current.xp.saturating_add(amount).max(0);
        let result = entity::prelude::MemberXp::update_many()
            .col_expr(Column::Xp, Expr::value(new_xp))
            .col_expr(Column::LastMessageXpAt, Expr::value(now))
            .col_expr(Column::UpdatedAt, Expr::value(now))
            .filter(Column::GuildId.eq(guild_id.to_string()))
            .filter(Column::UserId.eq(user_id.to_string()))
            .filter(Column::Xp.eq(current.xp))
            .filter(
                Condition::any()
                    .add(Column::LastMessageXpAt.is_null())
                    .add(Column::LastMessageXpAt.lte(cooldown_cutoff)),
            )
            .exec(self.db)
            .await?;

        if result.rows_affected == 0 {
            return Ok(None);
        }

        Ok(Some(XpChange {
            old_level: level_for_xp(current.xp),
            member: MemberXp {
                xp: new_xp,
                last_message_xp_at: Some(now),
                ..current
            },
        }))
    }

    /// Replaces the member's XP with `change(current)`, clamped at zero. Members without a
    /// row start from zero. The message cooldown is left untouched.
    ///
    /// # Returns
    /// - `Ok(XpChange)` - Stored total and the level before the change
    /// - `Err(DbErr::Custom)` - Concurrent writes kept winning
    pub async fn adjust_xp(
        &self,
        guild_id: u64,
        user_id: u64,
        now: DateTime<Utc>,
        change: impl Fn(i64) -> i64,
    ) -> Result<XpChange, DbErr> {
        use entity::member_xp::Column;

        for _ in 0..MAX_ADJUST_ATTEMPTS {
            let Some(current) = self.find_member(guild_id, user_id).await? else {
                match self
                    .insert_member(guild_id, user_id, change(0).max(0), None, now)
                    .await
                {
                    Ok(member) => {
                        return Ok(XpChange {
                            member,
                            old_level: 0,
                        })
                    }
                    Err(e) if is_unique_violation(&e) => continue,
                    Err(e) => return Err(e),
                }
            };

            let new_xp = change(current.xp).max(0);
            let result = entity::prelude::MemberXp::update_many()
                .col_expr(Column::Xp, Expr::value(new_xp))
                .col_expr(Column::UpdatedAt, Expr::value(now))
                .filter(Column::GuildId.eq(guild_id.to_string()))
                .filter(Column::UserId.eq(user_id.to_string()))
                .filter(Column::Xp.eq(current.xp))
                .exec(self.db)
                .await?;

            if result.rows_affected == 1 {
                return Ok(XpChange {
                    old_level: level_for_xp(current.xp),
                    member: MemberXp {
                        xp: new_xp,
                        ..current
                    },
                });
            }
        }

        Err(DbErr::Custom(format!(
            "XP of member {} in guild {} changed concurrently {} times",
            user_id, guild_id, MAX_ADJUST_ATTEMPTS
        )))
    }

    async fn insert_member(
        &self,
        guild_id: u64,
        user_id: u64,
        xp: i64,
        last_message_xp_at: Option<DateTime<Utc>>,
        now: DateTime<Utc>,
    ) -> Result<MemberXp, DbErr> {
        let entity = entity::member_xp::ActiveModel {
            guild_id: ActiveValue::Set(guild_id.to_string()),
            user_id: ActiveValue::Set(user_id.to_string()),
            xp: ActiveValue::Set(xp),
            last_message_xp_at: ActiveValue::Set(last_message_xp_at),
            updated_at: ActiveValue::Set(now),
        }
        .insert(self.db)
        .await?;

        MemberXp::from_entity(entity)
    }

    /// Highest XP first; ties are ordered by user id so pages are stable.
    ///
    /// # Returns
    /// - `Ok((members, total))` - The requested page and the number of ranked members
    pub async fn leaderboard(
        &self,
        guild_id: u64,
        page: u64,
        per_page: u64,
    ) -> Result<(Vec<MemberXp>, u64), DbErr> {
        use entity::member_xp::Column;

        let paginator = entity::prelude::MemberXp::find()
            .filter(Column::GuildId.eq(guild_id.to_string()))
            .order_by_desc(Column::Xp)
            .order_by_asc(Column::UserId)
            .paginate(self.db, per_page);
        let total = paginator.num_items().await?;
        let members = paginator
            .fetch_page(page)
            .await?
            .into_iter()
            .map(MemberXp::from_entity)
            .collect::<Result<Vec<_>, _>>()?;

        Ok((members, total))
    }

    /// Number of members in the guild with strictly more XP than `xp`.
    pub async fn count_ahead(&self, guild_id: u64, xp: i64) -> Result<u64, DbErr> {
        use entity::member_xp::Column;

        entity::prelude::MemberXp::find()
            .filter(Column::GuildId.eq(guild_id.to_string()))
            .filter(Column::Xp.gt(xp))
            .count(self.db)
            .await
    }

    /// Level roles ordered by level.
    pub async fn level_roles(&self, guild_id: u64) -> Result<Vec<LevelRole>, DbErr> {
        use entity::level_role::Column;

        entity::prelude::LevelRole::find()
            .filter(Column::GuildId.eq(guild_id.to_string()))
            .order_by_asc(Column::Level)
            .all(self.db)
            .await?
            .into_iter()
            .map(LevelRole::from_entity)
            .collect()
    }

    /// Binds `role_id` to `level`, replacing any role already bound to it.
    pub async fn upsert_level_role(
        &self,
        guild_id: u64,
        level: u32,
        role_id: u64,
        now: DateTime<Utc>,
    ) -> Result<LevelRole, DbErr> {
        use entity::level_role::Column;

        let entity = entity::prelude::LevelRole::insert(entity::level_role::ActiveModel {
            guild_id: ActiveValue::Set(guild_id.to_string()),
            level: ActiveValue::Set(level as i32),
            role_id: ActiveValue::Set(role_id.to_string()),
            created_at: ActiveValue::Set(now),
        })
        .on_conflict(
            OnConflict::columns([Column::GuildId, Column::Level])
                .update_columns([Column::RoleId, Column::CreatedAt])
                .to_owned(),
        )
        .exec_with_returning(self.db)
        .await?;

        LevelRole::from_entity(entity)
    }

    /// # Returns
    /// - `Ok(true)` - A binding was removed
    /// - `Ok(false)` - No role was bound to `level`
    pub async fn delete_level_role(&self, guild_id: u64, level: u32) -> Result<bool, DbErr> {
        use entity::level_role::Column;

        let result = entity::prelude::LevelRole::delete_many()
            .filter(Column::GuildId.eq(guild_id.to_string()))
            .filter(Column::Level.eq(level as i32))
            .exec(self.db)
            .await?;

        Ok(result.rows_affected > 0)
    }

    /// Queues a role setup for the bot, replacing an unprocessed request of the same guild.
    pub async fn queue_setup(
        &self,
        guild_id: u64,
        milestones: &[u32],
        requested_by: u64,
        now: DateTime<Utc>,
    ) -> Result<LevelingSetupRequest, DbErr> {
        use entity::leveling_setup_request::Column;

        let joined = milestones
            .iter()
            .map(u32::to_string)
            .collect::<Vec<_>>()
            .join(",");

        let entity = entity::prelude::LevelingSetupRequest::insert(
            entity::leveling_setup_request::ActiveModel {
                guild_id: ActiveValue::Set(guild_id.to_string()),
                milestones: ActiveValue::Set(joined),
                requested_by: ActiveValue::Set(requested_by.to_string()),
                requested_at: ActiveValue::Set(now),
            },
        )
        .on_conflict(
            OnConflict::column(Column::GuildId)
                .update_columns([Column::Milestones, Column::RequestedBy, Column::RequestedAt])
                .to_owned(),
        )
        .exec_with_returning(self.db)
        .await?;

        LevelingSetupRequest::from_entity(entity)
    }

    /// Unprocessed setup requests, oldest first.
    pub async fn pending_setups(&self) -> Result<Vec<LevelingSetupRequest>, DbErr> {
        entity::prelude::LevelingSetupRequest::find()
            .order_by_asc(entity::leveling_setup_request::Column::RequestedAt)
            .all(self.db)
            .await?
            .into_iter()
            .map(LevelingSetupRequest::from_entity)
            .collect()
    }

    /// Deletes the request if it is still the one that was read. A request replaced in the
    /// meantime stays queued for the next pass.
    ///
    /// # Returns
    /// - `Ok(true)` - This caller owns the request and should run it
    /// - `Ok(false)` - Already taken or replaced
    pub async fn take_setup(&self, request: &LevelingSetupRequest) -> Result<bool, DbErr> {
        use entity::leveling_setup_request::Column;

        let result = entity::prelude::LevelingSetupRequest::delete_many()
            .filter(Column::GuildId.eq(request.guild_id.to_string()))
            .filter(Column::RequestedAt.eq(request.requested_at))
            .exec(self.db)
            .await?;

        Ok(result.rows_affected == 1)
    }
}
