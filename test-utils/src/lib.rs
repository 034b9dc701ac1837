//! Guildhall Test Utils
//!
//! Shared helpers for repository, service and controller tests. Tests describe the tables
//! they need through [`builder::TestBuilder`], receive an in-memory SQLite database (plus an
//! optional session) through [`context::TestContext`], and seed rows with the builders in
//! [`factory`].
//!
//! ```rust,ignore
//! use test_utils::{builder::TestBuilder, factory};
//!
//! #[tokio::test]
//! async fn lists_commands() -> Result<(), sea_orm::DbErr> {
//!     let test = TestBuilder::new().with_table(entity::prelude::CustomCommand).build().await.unwrap();
//!     let db = test.db.as_ref().unwrap();
//!
//!     factory::custom_command::create_custom_command(db, "1", "hello").await?;
//!     Ok(())
//! }
//! ```

pub mod builder;
pub mod context;
pub mod error;
pub mod factory;
