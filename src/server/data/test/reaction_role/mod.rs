use crate::server::{
    data::reaction_role::ReactionRoleRepository, model::reaction_role::ReactionRoleBinding,
};
use entity::prelude::ReactionRole;
use sea_orm::{DbErr, EntityTrait, PaginatorTrait};
use test_utils::{builder::TestBuilder, factory};

mod upsert;
