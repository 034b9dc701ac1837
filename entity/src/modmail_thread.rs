use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq)]
#[sea_orm(table_name = "modmail_thread")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub guild_id: String,
    pub user_id: String,
    pub channel_id: Option<String>,
    pub status: String,
    /// Set to the user id while the thread is open, cleared on close.
    #[sea_orm(unique, nullable)]
    pub open_key: Option<String>,
    pub opened_at: DateTimeUtc,
    pub closed_at: Option<DateTimeUtc>,
    pub closed_by: Option<String>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::modmail_message::Entity")]
    ModmailMessage,
}

impl Related<super::modmail_message::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::ModmailMessage.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
