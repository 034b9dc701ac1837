use crate::server::{data::warning::WarningRepository, model::warning::CreateWarningParams};
use entity::prelude::Warning;
use sea_orm::DbErr;
use test_utils::{builder::TestBuilder, factory};

mod clear;
mod get_paginated;
