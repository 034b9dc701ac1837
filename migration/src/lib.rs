pub use sea_orm_migration::prelude::*;

mod m20260301_000001_create_guild_config_table;
mod m20260301_000002_create_custom_command_table;
mod m20260301_000003_create_warning_table;
mod m20260301_000004_create_reaction_role_table;
mod m20260302_000005_create_modmail_thread_table;
mod m20260302_000006_create_modmail_message_table;
mod m20260303_000007_create_verification_config_table;
mod m20260303_000008_create_ticket_tables;
mod m20260304_000009_create_giveaway_tables;
mod m20260305_000010_create_operator_tables;
mod m20260306_000011_create_leveling_tables;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20260301_000001_create_guild_config_table::Migration),
            Box::new(m20260301_000002_create_custom_command_table::Migration),
            Box::new(m20260301_000003_create_warning_table::Migration),
            Box::new(m20260301_000004_create_reaction_role_table::Migration),
            Box::new(m20260302_000005_create_modmail_thread_table::Migration),
            Box::new(m20260302_000006_create_modmail_message_table::Migration),
            Box::new(m20260303_000007_create_verification_config_table::Migration),
            Box::new(m20260303_000008_create_ticket_tables::Migration),
            Box::new(m20260304_000009_create_giveaway_tables::Migration),
            Box::new(m20260305_000010_create_operator_tables::Migration),
            Box::new(m20260306_000011_create_leveling_tables::Migration),
        ]
    }
}
