//! Dashboard operator repository.

use chrono::Utc;
use migration::OnConflict;
use sea_orm::{
    ActiveValue, ColumnTrait, DatabaseConnection, DbErr, EntityTrait, QueryFilter, QueryOrder,
    TransactionTrait,
};

use crate::server::model::operator::{Operator, OperatorGuild, UpsertOperatorParams};

pub struct OperatorRepository<'a> {
    db: &'a DatabaseConnection,
}

impl<'a> OperatorRepository<'a> {
    pub fn new(db: &'a DatabaseConnection) -> Self {
        Self { db }
    }

    /// Stores the operator and replaces their guild permission snapshot.
    ///
    /// Runs in a transaction so the guard never observes a half-written snapshot.
    pub async fn upsert(&self, params: UpsertOperatorParams) -> Result<Operator, DbErr> {
        let txn = self.db.begin().await?;
        let discord_id = params.discord_id.to_string();

        let entity = entity::prelude::Operator::insert(entity::operator::ActiveModel {
            discord_id: ActiveValue::Set(discord_id.clone()),
            name: ActiveValue::Set(params.name),
            guilds_synced_at: ActiveValue::Set(Utc::now()),
        })
        .on_conflict(
            OnConflict::column(entity::operator::Column::DiscordId)
                .update_columns([
                    entity::operator::Column::Name,
                    entity::operator::Column::GuildsSyncedAt,
                ])
                .to_owned(),
        )
        .exec_with_returning(&txn)
        .await?;

        entity::prelude::OperatorGuild::delete_many()
            .filter(entity::operator_guild::Column::OperatorId.eq(discord_id.clone()))
            .exec(&txn)
            .await?;

        if !params.guilds.is_empty() {
            let rows = params
                .guilds
                .into_iter()
                .map(|g| entity::operator_guild::ActiveModel {
                    operator_id: ActiveValue::Set(discord_id.clone()),
                    guild_id: ActiveValue::Set(g.guild_id.to_string()),
                    guild_name: ActiveValue::Set(g.name),
                    permissions: ActiveValue::Set(g.permissions.bits() as i64),
                });
            entity::prelude::OperatorGuild::insert_many(rows)
                .exec(&txn)
                .await?;
        }

        txn.commit().await?;

        Operator::from_entity(entity)
    }

    pub async fn find(&self, discord_id: u64) -> Result<Option<Operator>, DbErr> {
        entity::prelude::Operator::find_by_id(discord_id.to_string())
            .one(self.db)
            .await?
            .map(Operator::from_entity)
            .transpose()
    }

    /// The operator's snapshot for one guild, if they are a member of it.
    pub async fn find_guild(
        &self,
        discord_id: u64,
        guild_id: u64,
    ) -> Result<Option<OperatorGuild>, DbErr> {
        entity::prelude::OperatorGuild::find_by_id((discord_id.to_string(), guild_id.to_string()))
            .one(self.db)
            .await?
            .map(OperatorGuild::from_entity)
            .transpose()
    }

    pub async fn guilds(&self, discord_id: u64) -> Result<Vec<OperatorGuild>, DbErr> {
        entity::prelude::OperatorGuild::find()
            .filter(entity::operator_guild::Column::OperatorId.eq(discord_id.to_string()))
            .order_by_asc(entity::operator_guild::Column::GuildName)
            .all(self.db)
            .await?
            .into_iter()
            .map(OperatorGuild::from_entity)
            .collect()
    }
}
