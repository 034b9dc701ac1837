use entity::prelude::*;
use sea_orm::{sea_query::TableCreateStatement, EntityTrait, Schema};

use crate::{context::TestContext, error::TestError};

/// Fluent builder describing which tables a test database needs.
///
/// Tables are created in the order they are added, so parents must be added before the
/// tables holding foreign keys to them. The grouped helpers below already respect that.
///
/// ```rust,ignore
/// let test = TestBuilder::new()
///     .with_table(GuildConfig)
///     .with_giveaway_tables()
///     .build()
///     .await?;
/// ```
pub struct TestBuilder {
    tables: Vec<TableCreateStatement>,
}

impl Default for TestBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl TestBuilder {
    pub fn new() -> Self {
        Self { tables: Vec::new() }
    }

    /// Adds the CREATE TABLE statement generated from `entity` for the SQLite backend.
    pub fn with_table<E: EntityTrait>(mut self, entity: E) -> Self {
        let schema = Schema::new(sea_orm::DbBackend::Sqlite);
        self.tables.push(schema.create_table_from_entity(entity));
        self
    }

    /// Adds the `modmail_thread` and `modmail_message` tables.
    pub fn with_modmail_tables(self) -> Self {
        self.with_table(ModmailThread).with_table(ModmailMessage)
    }

    /// Adds the `giveaway` and `giveaway_entry` tables.
    pub fn with_giveaway_tables(self) -> Self {
        self.with_table(Giveaway).with_table(GiveawayEntry)
    }

    /// Adds the `ticket_config` and `ticket` tables.
    pub fn with_ticket_tables(self) -> Self {
        self.with_table(TicketConfig).with_table(Ticket)
    }

    /// Adds the `leveling_config`, `member_xp`, `level_role` and `leveling_setup_request`
    /// tables.
    pub fn with_leveling_tables(self) -> Self {
        self.with_table(LevelingConfig)
            .with_table(MemberXp)
            .with_table(LevelRole)
            .with_table(LevelingSetupRequest)
    }

    /// Adds the `operator` and `operator_guild` tables used by the dashboard guard.
    pub fn with_operator_tables(self) -> Self {
        self.with_table(Operator).with_table(OperatorGuild)
    }

    /// Adds every table the bot touches.
    ///
    /// Use this for dispatcher tests, where a single event may read guild configuration,
    /// verification settings and feature tables at once.
    pub fn with_all_tables(self) -> Self {
        self.with_table(GuildConfig)
            .with_table(CustomCommand)
            .with_table(Warning)
            .with_table(ReactionRole)
            .with_table(VerificationConfig)
            .with_modmail_tables()
            .with_ticket_tables()
            .with_giveaway_tables()
            .with_leveling_tables()
            .with_operator_tables()
    }

    /// Connects to a fresh in-memory SQLite database and creates the configured tables.
    ///
    /// # Returns
    /// - `Ok(TestContext)` - Context whose `db` is populated
    /// - `Err(TestError::Database)` - Connecting or creating a table failed
    pub async fn build(self) -> Result<TestContext, TestError> {
        let mut context = TestContext::new();
        context.with_tables(self.tables).await?;
        Ok(context)
    }
}
