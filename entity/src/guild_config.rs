use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq)]
#[sea_orm(table_name = "guild_config")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub guild_id: String,
    pub prefix: String,
    pub modlog_channel_id: Option<String>,
    pub welcome_channel_id: Option<String>,
    #[sea_orm(column_type = "Text", nullable)]
    pub welcome_message: Option<String>,
    #[sea_orm(column_type = "Text", nullable)]
    pub leave_message: Option<String>,
    pub auto_role_id: Option<String>,
    pub modmail_enabled: bool,
    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
