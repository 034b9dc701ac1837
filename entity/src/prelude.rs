pub use super::custom_command::Entity as CustomCommand;
pub use super::giveaway::Entity as Giveaway;
pub use super::giveaway_entry::Entity as GiveawayEntry;
pub use super::guild_config::Entity as GuildConfig;
pub use super::level_role::Entity as LevelRole;
pub use super::leveling_config::Entity as LevelingConfig;
pub use super::leveling_setup_request::Entity as LevelingSetupRequest;
pub use super::member_xp::Entity as MemberXp;
pub use super::modmail_message::Entity as ModmailMessage;
pub use super::modmail_thread::Entity as ModmailThread;
pub use super::operator::Entity as Operator;
pub use super::operator_guild::Entity as OperatorGuild;
pub use super::reaction_role::Entity as ReactionRole;
pub use super::ticket::Entity as Ticket;
pub use super::ticket_config::Entity as TicketConfig;
pub use super::verification_config::Entity as VerificationConfig;
pub use super::warning::Entity as Warning;
