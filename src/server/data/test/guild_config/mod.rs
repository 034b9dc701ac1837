use crate::server::{
    data::guild_config::GuildConfigRepository,
    model::guild_config::{GuildSetting, UpdateGuildConfigParams, DEFAULT_PREFIX},
};
use entity::prelude::GuildConfig;
use sea_orm::{DbErr, EntityTrait, PaginatorTrait};
use test_utils::{builder::TestBuilder, factory};

mod apply;
mod get_or_create;
mod update;
