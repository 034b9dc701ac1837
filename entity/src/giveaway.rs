use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq)]
#[sea_orm(table_name = "giveaway")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub guild_id: String,
    pub channel_id: String,
    #[sea_orm(unique)]
    pub message_id: String,
    pub prize: String,
    #[sea_orm(column_type = "Text", nullable)]
    pub description: Option<String>,
    pub winner_count: i32,
    pub ends_at: DateTimeUtc,
    /// `active`, `resolving` or `ended`.
    pub status: String,
    /// Bumped on every claim so that only one retry of a stalled resolution goes through.
    pub resolution_attempts: i32,
    /// Comma separated user ids, set when the giveaway is resolved.
    #[sea_orm(column_type = "Text", nullable)]
    pub winners: Option<String>,
    pub created_by: String,
    /// Time of the latest claim while resolving; the end time once ended.
    pub ended_at: Option<DateTimeUtc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::giveaway_entry::Entity")]
    GiveawayEntry,
}

impl Related<super::giveaway_entry::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::GiveawayEntry.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
