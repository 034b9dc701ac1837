use crate::server::{
    data::operator::OperatorRepository,
    model::operator::{OperatorGuild, UpsertOperatorParams},
};
use sea_orm::DbErr;
use serenity::all::Permissions;
use test_utils::{builder::TestBuilder, factory};

mod upsert;
