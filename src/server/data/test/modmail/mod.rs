use crate::server::{
    data::modmail::ModmailRepository,
    model::modmail::{AppendModmailMessageParams, ThreadStatus},
};
use sea_orm::DbErr;
use test_utils::{builder::TestBuilder, factory};

mod claim_thread;
mod close;
