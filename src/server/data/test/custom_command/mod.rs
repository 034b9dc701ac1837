use crate::server::{
    data::{custom_command::CustomCommandRepository, is_unique_violation},
    model::custom_command::{CreateCustomCommandParams, UpdateCustomCommandParams},
};
use entity::prelude::CustomCommand;
use sea_orm::DbErr;
use test_utils::{builder::TestBuilder, factory};

mod create;
mod delete;
mod update;
