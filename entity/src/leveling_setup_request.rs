use sea_orm::entity::prelude::*;

/// Role setup queued from the dashboard. At most one per guild; the bot deletes the row
/// when it picks the request up.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq)]
#[sea_orm(table_name = "leveling_setup_request")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub guild_id: String,
    /// Comma-separated milestone levels, ascending.
    pub milestones: String,
    pub requested_by: String,
    pub requested_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
