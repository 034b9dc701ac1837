use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq)]
#[sea_orm(table_name = "operator")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub discord_id: String,
    pub name: String,
    pub guilds_synced_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::operator_guild::Entity")]
    OperatorGuild,
}

impl Related<super::operator_guild::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::OperatorGuild.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
