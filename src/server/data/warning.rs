//! Warning repository. Warnings are append-only apart from [`WarningRepository::clear`].

use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ActiveValue, ColumnTrait, DatabaseConnection, DbErr, EntityTrait,
    PaginatorTrait, QueryFilter, QueryOrder,
};

use crate::server::model::warning::{CreateWarningParams, Warning};

pub struct WarningRepository<'a> {
    db: &'a DatabaseConnection,
}

impl<'a> WarningRepository<'a> {
    pub fn new(db: &'a DatabaseConnection) -> Self {
        Self { db }
    }

    pub async fn create(&self, params: CreateWarningParams) -> Result<Warning, DbErr> {
        let entity = entity::warning::ActiveModel {
            guild_id: ActiveValue::Set(params.guild_id.to_string()),
            user_id: ActiveValue::Set(params.user_id.to_string()),
            moderator_id: ActiveValue::Set(params.moderator_id.to_string()),
            reason: ActiveValue::Set(params.reason),
            created_at: ActiveValue::Set(Utc::now()),
            ..Default::default()
        }
        .insert(self.db)
        .await?;

        Warning::from_entity(entity)
    }

    pub async fn count(&self, guild_id: u64, user_id: u64) -> Result<u64, DbErr> {
        entity::prelude::Warning::find()
            .filter(entity::warning::Column::GuildId.eq(guild_id.to_string()))
            .filter(entity::warning::Column::UserId.eq(user_id.to_string()))
            .count(self.db)
            .await
    }

    /// A member's warnings, oldest first.
    pub async fn list_for_user(&self, guild_id: u64, user_id: u64) -> Result<Vec<Warning>, DbErr> {
        entity::prelude::Warning::find()
            .filter(entity::warning::Column::GuildId.eq(guild_id.to_string()))
            .filter(entity::warning::Column::UserId.eq(user_id.to_string()))
            .order_by_asc(entity::warning::Column::CreatedAt)
            .order_by_asc(entity::warning::Column::Id)
            .all(self.db)
            .await?
            .into_iter()
            .map(Warning::from_entity)
            .collect()
    }

    /// Newest-first page of a guild's warnings, optionally narrowed to one user.
    ///
    /// # Arguments
    /// - `page` - Zero-based page index
    /// - `per_page` - Rows per page
    ///
    /// # Returns
    /// - `Ok((warnings, total))` - The requested page and the total number of matching rows
    pub async fn get_paginated(
        &self,
        guild_id: u64,
        user_id: Option<u64>,
        page: u64,
        per_page: u64,
    ) -> Result<(Vec<Warning>, u64), DbErr> {
        let mut query = entity::prelude::Warning::find()
            .filter(entity::warning::Column::GuildId.eq(guild_id.to_string()));
        if let Some(user_id) = user_id {
            query = query.filter(entity::warning::Column::UserId.eq(user_id.to_string()));
        }

        let paginator = query
            .order_by_desc(entity::warning::Column::Id)
            .paginate(self.db, per_page);
        let total = paginator.num_items().await?;
        let warnings = paginator
            .fetch_page(page)
            .await?
            .into_iter()
            .map(Warning::from_entity)
            .collect::<Result<Vec<_>, _>>()?;

        Ok((warnings, total))
    }

    /// Deletes every warning of a member in a guild with a single statement.
    ///
    /// # Returns
    /// - `Ok(u64)` - Number of warnings removed
    pub async fn clear(&self, guild_id: u64, user_id: u64) -> Result<u64, DbErr> {
        let result = entity::prelude::Warning::delete_many()
            .filter(entity::warning::Column::GuildId.eq(guild_id.to_string()))
            .filter(entity::warning::Column::UserId.eq(user_id.to_string()))
            .exec(self.db)
            .await?;

        Ok(result.rows_affected)
    }
}
