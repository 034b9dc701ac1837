use crate::server::{data::ticket::TicketRepository, model::ticket::TicketConfig};
use sea_orm::DbErr;
use test_utils::{builder::TestBuilder, factory};

mod claim;
mod config;
