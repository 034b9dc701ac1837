use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq)]
#[sea_orm(table_name = "modmail_message")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub thread_id: i32,
    pub author_id: String,
    #[sea_orm(column_type = "Text")]
    pub content: String,
    pub is_staff: bool,
    pub created_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::modmail_thread::Entity",
        from = "Column::ThreadId",
        to = "super::modmail_thread::Column::Id",
        on_update = "Cascade",
        on_delete = "Cascade"
    )]
    ModmailThread,
}

impl Related<super::modmail_thread::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::ModmailThread.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
