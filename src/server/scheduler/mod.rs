//! Cron jobs that feed time-based events into the bot dispatcher.

pub mod giveaway;
