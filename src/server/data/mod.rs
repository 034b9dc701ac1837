//! Database repository layer.
//!
//! One repository per table group. Repositories borrow the connection, take and return the
//! domain models from `server::model`, and keep every SeaORM detail (string ids, status
//! columns, unique keys) on this side of the boundary.

pub mod custom_command;
pub mod giveaway;
pub mod guild_config;
pub mod leveling;
pub mod modmail;
pub mod operator;
pub mod reaction_role;
pub mod ticket;
pub mod verification;
pub mod warning;

#[cfg(test)]
mod test;

use sea_orm::{DbErr, SqlErr};

/// True when `err` was raised by a UNIQUE or PRIMARY KEY constraint.
pub(crate) fn is_unique_violation(err: &DbErr) -> bool {
    matches!(err.sql_err(), Some(SqlErr::UniqueConstraintViolation(_)))
}

/// Number of pages needed for `total` rows at `per_page` rows per page.
pub(crate) fn total_pages(total: u64, per_page: u64) -> u64 {
    if per_page == 0 {
        0
    } else {
        total.div_ceil(per_page)
    }
}
