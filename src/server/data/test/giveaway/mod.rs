use crate::server::{
    data::giveaway::GiveawayRepository,
    model::giveaway::{CreateGiveawayParams, GiveawayStatus},
};
use chrono::{Duration, Utc};
use sea_orm::DbErr;
use test_utils::{builder::TestBuilder, factory};

mod claim_resolution;
mod entries;
mod find_due;
