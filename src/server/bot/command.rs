//! Slash command surface.
//!
//! [`CommandKind`] is the closed set of commands the bot understands and
//! [`CommandKind::definition`] describes each one: name, options with their ranges, and the
//! default member permissions. The same definitions register the commands with Discord and
//! validate incoming arguments, so the two can never drift apart.

use std::collections::{HashMap, HashSet};

use serenity::all::Permissions;

use crate::server::{
    bot::event::ArgValue,
    error::{config::ConfigError, AppError},
    model::leveling::MAX_LEVEL,
    util::parse::parse_user_supplied_id,
};

const MAX_NAME_LEN: usize = 32;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CommandKind {
    Prefix,
    Modlog,
    Welcome,
    Leave,
    AutoRole,
    ModmailSetup,
    ModmailReply,
    ModmailClose,
    ModmailContact,
    ReactionRoleAdd,
    ReactionRoleRemove,
    ReactionRoleList,
    Kick,
    Ban,
    Unban,
    Timeout,
    Untimeout,
    Warn,
    Warnings,
    ClearWarnings,
    Purge,
    Slowmode,
    CustomCmdCreate,
    CustomCmdEdit,
    CustomCmdDelete,
    CustomCmdList,
    VerifySetup,
    TicketSetup,
    Ticket,
    TicketClose,
    GiveawayStart,
    GiveawayEnd,
    Rank,
    Levels,
    SetLevel,
    AddXp,
    LevelRole,
    RemoveLevelRole,
    LevelingSetup,
    LevelingConfig,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArgKind {
    String,
    Integer,
    Boolean,
    User,
    Channel,
    Role,
}

impl ArgKind {
    fn matches(self, value: &ArgValue) -> bool {
        matches!(
            (self, value),
            (Self::String, ArgValue::String(_))
                | (Self::Integer, ArgValue::Integer(_))
                | (Self::Boolean, ArgValue::Boolean(_))
                | (Self::User, ArgValue::User(_))
                | (Self::Channel, ArgValue::Channel(_))
                | (Self::Role, ArgValue::Role(_))
        )
    }
}

/// One option of a command. For strings `min`/`max` bound the length in characters, for
/// integers the value.
#[derive(Debug, Clone, PartialEq)]
pub struct OptionDefinition {
    pub name: &'static str,
    pub description: &'static str,
    pub kind: ArgKind,
    pub required: bool,
    pub min: Option<i64>,
    pub max: Option<i64>,
}

impl OptionDefinition {
    fn required(name: &'static str, description: &'static str, kind: ArgKind) -> Self {
        Self {
            name,
            description,
            kind,
            required: true,
            min: None,
            max: None,
        }
    }

    fn optional(name: &'static str, description: &'static str, kind: ArgKind) -> Self {
        Self {
            required: false,
            ..Self::required(name, description, kind)
        }
    }

    fn range(mut self, min: i64, max: i64) -> Self {
        self.min = Some(min);
        self.max = Some(max);
        self
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct CommandDefinition {
    pub name: &'static str,
    pub description: &'static str,
    pub options: Vec<OptionDefinition>,
    /// `None` lets every member see the command.
    pub permissions: Option<Permissions>,
}

impl CommandDefinition {
    fn new(name: &'static str, description: &'static str, permissions: Permissions) -> Self {
        Self {
            name,
            description,
            options: Vec::new(),
            permissions: Some(permissions),
        }
    }

    fn public(name: &'static str, description: &'static str) -> Self {
        Self {
            permissions: None,
            ..Self::new(name, description, Permissions::empty())
        }
    }

    fn option(mut self, option: OptionDefinition) -> Self {
        self.options.push(option);
        self
    }
}

impl CommandKind {
    pub const ALL: [CommandKind; 40] = [
        Self::Prefix,
        Self::Modlog,
        Self::Welcome,
        Self::Leave,
        Self::AutoRole,
        Self::ModmailSetup,
        Self::ModmailReply,
        Self::ModmailClose,
        Self::ModmailContact,
        Self::ReactionRoleAdd,
        Self::ReactionRoleRemove,
        Self::ReactionRoleList,
        Self::Kick,
        Self::Ban,
        Self::Unban,
        Self::Timeout,
        Self::Untimeout,
        Self::Warn,
        Self::Warnings,
        Self::ClearWarnings,
        Self::Purge,
        Self::Slowmode,
        Self::CustomCmdCreate,
        Self::CustomCmdEdit,
        Self::CustomCmdDelete,
        Self::CustomCmdList,
        Self::VerifySetup,
        Self::TicketSetup,
        Self::Ticket,
        Self::TicketClose,
        Self::GiveawayStart,
        Self::GiveawayEnd,
        Self::Rank,
        Self::Levels,
        Self::SetLevel,
        Self::AddXp,
        Self::LevelRole,
        Self::RemoveLevelRole,
        Self::LevelingSetup,
        Self::LevelingConfig,
    ];

    pub fn definition(self) -> CommandDefinition {
        use ArgKind::*;
        use OptionDefinition as Opt;

        let manage_guild = Permissions::MANAGE_GUILD;
        let manage_roles = Permissions::MANAGE_ROLES;
        let manage_messages = Permissions::MANAGE_MESSAGES;
        let moderate = Permissions::MODERATE_MEMBERS;
        let administrator = Permissions::ADMINISTRATOR;
        let reason = || Opt::optional("reason", "Reason", String).range(1, 512);

        match self {
            Self::Prefix => CommandDefinition::new("prefix", "Set the custom command prefix", manage_guild)
                .option(Opt::required("value", "New prefix", String).range(1, 5)),
            Self::Modlog => CommandDefinition::new("modlog", "Set the moderation log channel", manage_guild)
                .option(Opt::required("channel", "Channel receiving moderation logs", Channel)),
            Self::Welcome => CommandDefinition::new("welcome", "Set the welcome channel and message", manage_guild)
                .option(Opt::required("channel", "Welcome channel", Channel))
                .option(Opt::required("message", "Message; supports {user} {user.name} {server} {membercount}", String).range(1, 2000)),
            Self::Leave => CommandDefinition::new("leave", "Set the leave message", manage_guild)
                .option(Opt::required("message", "Message; supports {user.name} {server} {membercount}", String).range(1, 2000)),
            Self::AutoRole => CommandDefinition::new("autorole", "Set or clear the role given to new members", manage_guild)
                .option(Opt::optional("role", "Role to assign; omit to clear", Role)),
            Self::ModmailSetup => CommandDefinition::new("modmail_setup", "Enable or disable modmail", manage_guild)
                .option(Opt::required("enabled", "Whether members can open threads by DM", Boolean)),
            Self::ModmailReply => CommandDefinition::new("modmail_reply", "Reply to the user of this modmail thread", manage_messages)
                .option(Opt::required("message", "Reply text", String).range(1, 2000)),
            Self::ModmailClose => CommandDefinition::new("modmail_close", "Close this modmail thread", manage_messages)
                .option(reason()),
            Self::ModmailContact => CommandDefinition::new("modmail_contact", "Open a modmail thread with a member", manage_messages)
                .option(Opt::required("user", "Member to contact", User))
                .option(Opt::required("message", "First message", String).range(1, 2000)),
            Self::ReactionRoleAdd => CommandDefinition::new("reactionrole_add", "Bind an emoji on a message to a role", manage_roles)
                .option(Opt::required("message_id", "Message id", String).range(1, 20))
                .option(Opt::required("emoji", "Emoji", String).range(1, 64))
                .option(Opt::required("role", "Role to grant", Role))
                .option(Opt::optional("channel", "Channel of the message; defaults to this one", Channel)),
            Self::ReactionRoleRemove => CommandDefinition::new("reactionrole_remove", "Remove a reaction-role binding", manage_roles)
                .option(Opt::required("message_id", "Message id", String).range(1, 20))
                .option(Opt::required("emoji", "Emoji", String).range(1, 64)),
            Self::ReactionRoleList => CommandDefinition::new("reactionrole_list", "List reaction-role bindings", manage_roles),
            Self::Kick => CommandDefinition::new("kick", "Kick a member", Permissions::KICK_MEMBERS)
                .option(Opt::required("member", "Member to kick", User))
                .option(reason()),
            Self::Ban => CommandDefinition::new("ban", "Ban a member", Permissions::BAN_MEMBERS)
                .option(Opt::required("member", "Member to ban", User))
                .option(reason())
                .option(Opt::optional("delete_days", "Days of messages to delete", Integer).range(0, 7)),
            Self::Unban => CommandDefinition::new("unban", "Lift a ban", Permissions::BAN_MEMBERS)
                .option(Opt::required("user_id", "Id of the banned user", String).range(1, 24))
                .option(reason()),
            Self::Timeout => CommandDefinition::new("timeout", "Time out a member", moderate)
                .option(Opt::required("member", "Member to time out", User))
                .option(Opt::required("minutes", "Duration in minutes", Integer).range(1, 40320))
                .option(reason()),
            Self::Untimeout => CommandDefinition::new("untimeout", "Remove a member's timeout", moderate)
                .option(Opt::required("member", "Member", User)),
            Self::Warn => CommandDefinition::new("warn", "Warn a member", moderate)
                .option(Opt::required("member", "Member to warn", User))
                .option(Opt::required("reason", "Reason", String).range(1, 512)),
            Self::Warnings => CommandDefinition::new("warnings", "List a member's warnings", moderate)
                .option(Opt::required("member", "Member", User)),
            Self::ClearWarnings => CommandDefinition::new("clearwarnings", "Delete all of a member's warnings", moderate)
                .option(Opt::required("member", "Member", User)),
            Self::Purge => CommandDefinition::new("purge", "Bulk delete recent messages", manage_messages)
                .option(Opt::required("amount", "Number of messages", Integer).range(1, 100)),
            Self::Slowmode => CommandDefinition::new("slowmode", "Set channel slowmode", Permissions::MANAGE_CHANNELS)
                .option(Opt::required("seconds", "Delay between messages; 0 disables", Integer).range(0, 21600))
                .option(Opt::optional("channel", "Channel; defaults to this one", Channel)),
            Self::CustomCmdCreate => CommandDefinition::new("customcmd_create", "Create a custom command", manage_guild)
                .option(Opt::required("name", "Command name", String).range(1, 32))
                .option(Opt::required("response", "Response text", String).range(1, 2000))
                .option(Opt::optional("embed", "Send the response as an embed", Boolean)),
            Self::CustomCmdEdit => CommandDefinition::new("customcmd_edit", "Edit a custom command", manage_guild)
                .option(Opt::required("name", "Command name", String).range(1, 32))
                .option(Opt::optional("response", "New response text", String).range(1, 2000))
                .option(Opt::optional("embed", "Send the response as an embed", Boolean)),
            Self::CustomCmdDelete => CommandDefinition::new("customcmd_delete", "Delete a custom command", manage_guild)
                .option(Opt::required("name", "Command name", String).range(1, 32)),
            Self::CustomCmdList => CommandDefinition::new("customcmd_list", "List custom commands", manage_guild),
            Self::VerifySetup => CommandDefinition::new("verify_setup", "Post a verification panel", manage_guild)
                .option(Opt::required("role", "Role granted on verification", Role))
                .option(Opt::required("channel", "Channel for the panel", Channel))
                .option(Opt::optional("title", "Panel title", String).range(1, 256))
                .option(Opt::optional("message", "Panel text", String).range(1, 2000))
                .option(Opt::optional("unverified_role", "Role given on join and removed on verification", Role)),
            Self::TicketSetup => CommandDefinition::new("ticket_setup", "Configure support tickets", manage_guild)
                .option(Opt::required("category", "Category for ticket channels", Channel))
                .option(Opt::required("staff_role", "Role that can see tickets", Role))
                .option(Opt::optional("log_channel", "Channel receiving transcripts", Channel)),
            Self::Ticket => CommandDefinition::public("ticket", "Open a support ticket")
                .option(Opt::optional("topic", "What do you need help with?", String).range(1, 200)),
            Self::TicketClose => CommandDefinition::public("ticket_close", "Close this ticket")
                .option(reason()),
            Self::GiveawayStart => CommandDefinition::new("giveaway_start", "Start a giveaway in this channel", manage_guild)
                .option(Opt::required("prize", "Prize", String).range(1, 256))
                .option(Opt::required("minutes", "Duration in minutes", Integer).range(0, 40320))
                .option(Opt::required("winners", "Number of winners", Integer).range(1, 20))
                .option(Opt::optional("description", "Extra details", String).range(1, 1000)),
            Self::GiveawayEnd => CommandDefinition::new("giveaway_end", "End a giveaway now", manage_guild)
                .option(Opt::required("message_id", "Giveaway message id", String).range(1, 20)),
            Self::Rank => CommandDefinition::public("rank", "Show a member's level and XP")
                .option(Opt::optional("user", "Member; defaults to you", User)),
            Self::Levels => CommandDefinition::public("levels", "Show the server's XP leaderboard"),
            Self::SetLevel => CommandDefinition::new("setlevel", "Set a member's level", administrator)
                .option(Opt::required("user", "Member", User))
                .option(Opt::required("level", "New level", Integer).range(0, MAX_LEVEL as i64)),
            Self::AddXp => CommandDefinition::new("addxp", "Give or take XP from a member", administrator)
                .option(Opt::required("user", "Member", User))
                .option(Opt::required("amount", "XP to add; negative removes", Integer).range(-1_000_000, 1_000_000)),
            Self::LevelRole => CommandDefinition::new("levelrole", "Grant a role when members reach a level", manage_roles)
                .option(Opt::required("level", "Level", Integer).range(1, MAX_LEVEL as i64))
                .option(Opt::required("role", "Role to grant", Role)),
            Self::RemoveLevelRole => CommandDefinition::new("removelevelrole", "Stop granting a role at a level", manage_roles)
                .option(Opt::required("level", "Level", Integer).range(1, MAX_LEVEL as i64)),
            Self::LevelingSetup => CommandDefinition::new("leveling_setup", "Create roles for level milestones", administrator)
                .option(Opt::optional("milestones", "Comma-separated levels; defaults to 5,10,20,30,50,80,100", String).range(1, 200)),
            Self::LevelingConfig => CommandDefinition::new("leveling_config", "Configure leveling", manage_guild)
                .option(Opt::required("enabled", "Whether messages earn XP", Boolean))
                .option(Opt::optional("channel", "Level-up announcement channel; omit to announce where the member chatted", Channel))
                .option(Opt::optional("xp_min", "Least XP per message", Integer).range(1, 1000))
                .option(Opt::optional("xp_max", "Most XP per message", Integer).range(1, 1000)),
        }
    }
}

fn is_valid_name(name: &str) -> bool {
    !name.is_empty()
        && name.len() <= MAX_NAME_LEN
        && name
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_' || c == '-')
}

/// Name to command lookup, validated once at startup.
pub struct CommandRegistry {
    definitions: Vec<(CommandKind, CommandDefinition)>,
    by_name: HashMap<&'static str, usize>,
}

impl CommandRegistry {
    /// Registry of every [`CommandKind`].
    pub fn new() -> Result<Self, ConfigError> {
        Self::from_definitions(
            CommandKind::ALL
                .iter()
                .map(|kind| (*kind, kind.definition()))
                .collect(),
        )
    }

    /// Builds a registry, rejecting duplicate or malformed names.
    ///
    /// # Returns
    /// - `Ok(CommandRegistry)` - Every name and option is valid and unique
    /// - `Err(ConfigError::InvalidCommandRegistry)` - First problem found
    pub fn from_definitions(
        definitions: Vec<(CommandKind, CommandDefinition)>,
    ) -> Result<Self, ConfigError> {
        let invalid = |msg: String| Err(ConfigError::InvalidCommandRegistry(msg));

        let mut by_name = HashMap::new();
        let mut kinds = HashSet::new();

        for (index, (kind, definition)) in definitions.iter().enumerate() {
            if !is_valid_name(definition.name) {
                return invalid(format!("invalid command name '{}'", definition.name));
            }
            if by_name.insert(definition.name, index).is_some() {
                return invalid(format!("duplicate command name '{}'", definition.name));
            }
            if !kinds.insert(*kind) {
                return invalid(format!("{:?} is registered twice", kind));
            }

            let mut option_names = HashSet::new();
            let mut seen_optional = false;
            for option in &definition.options {
                if !is_valid_name(option.name) {
                    return invalid(format!(
                        "invalid option name '{}' on '{}'",
                        option.name, definition.name
                    ));
                }
                if !option_names.insert(option.name) {
                    return invalid(format!(
                        "duplicate option '{}' on '{}'",
                        option.name, definition.name
                    ));
                }
                if option.required && seen_optional {
                    return invalid(format!(
                        "required option '{}' follows an optional one on '{}'",
                        option.name, definition.name
                    ));
                }
                seen_optional |= !option.required;
            }
        }

        Ok(Self {
            definitions,
            by_name,
        })
    }

    pub fn resolve(&self, name: &str) -> Option<(CommandKind, &CommandDefinition)> {
        self.by_name
            .get(name)
            .map(|index| &self.definitions[*index])
            .map(|(kind, definition)| (*kind, definition))
    }

    pub fn definitions(&self) -> impl Iterator<Item = &CommandDefinition> {
        self.definitions.iter().map(|(_, definition)| definition)
    }
}

/// Arguments checked against a [`CommandDefinition`].
#[derive(Debug)]
pub struct CommandArgs {
    values: HashMap<String, ArgValue>,
}

impl CommandArgs {
    /// Checks presence, type and range of every argument.
    pub fn validate(
        definition: &CommandDefinition,
        args: Vec<(String, ArgValue)>,
    ) -> Result<Self, AppError> {
        let values: HashMap<String, ArgValue> = args.into_iter().collect();

        for name in values.keys() {
            if !definition.options.iter().any(|o| o.name == name) {
                return Err(AppError::InvalidArgument(format!(
                    "`/{}` has no option `{}`.",
                    definition.name, name
                )));
            }
        }

        for option in &definition.options {
            let Some(value) = values.get(option.name) else {
                if option.required {
                    return Err(AppError::InvalidArgument(format!(
                        "Missing required option `{}`.",
                        option.name
                    )));
                }
                continue;
            };

            if !option.kind.matches(value) {
                return Err(AppError::InvalidArgument(format!(
                    "Option `{}` has the wrong type.",
                    option.name
                )));
            }

            let (measured, unit) = match value {
                ArgValue::Integer(v) => (*v, ""),
                ArgValue::String(s) => (s.chars().count() as i64, " characters"),
                _ => continue,
            };
            let below = option.min.is_some_and(|min| measured < min);
            let above = option.max.is_some_and(|max| measured > max);
            if below || above {
                return Err(AppError::InvalidArgument(format!(
                    "`{}` must be between {} and {}{}.",
                    option.name,
                    option.min.unwrap_or(i64::MIN),
                    option.max.unwrap_or(i64::MAX),
                    unit
                )));
            }
        }

        Ok(Self { values })
    }

    fn missing(name: &str) -> AppError {
        AppError::InvalidArgument(format!("Missing required option `{}`.", name))
    }

    pub fn opt_string(&self, name: &str) -> Option<String> {
        match self.values.get(name) {
            Some(ArgValue::String(s)) => Some(s.trim().to_string()),
            _ => None,
        }
    }

    pub fn string(&self, name: &str) -> Result<String, AppError> {
        self.opt_string(name).ok_or_else(|| Self::missing(name))
    }

    pub fn opt_integer(&self, name: &str) -> Option<i64> {
        match self.values.get(name) {
            Some(ArgValue::Integer(v)) => Some(*v),
            _ => None,
        }
    }

    /// Integer converted to the target type; the range was already checked.
    pub fn integer<T: TryFrom<i64>>(&self, name: &str) -> Result<T, AppError> {
        let value = self.opt_integer(name).ok_or_else(|| Self::missing(name))?;
        T::try_from(value)
            .map_err(|_| AppError::InvalidArgument(format!("`{}` is out of range.", name)))
    }

    pub fn opt_boolean(&self, name: &str) -> Option<bool> {
        match self.values.get(name) {
            Some(ArgValue::Boolean(v)) => Some(*v),
            _ => None,
        }
    }

    fn opt_id(&self, name: &str) -> Option<u64> {
        match self.values.get(name) {
            Some(ArgValue::User(id) | ArgValue::Channel(id) | ArgValue::Role(id)) => Some(*id),
            _ => None,
        }
    }

    pub fn opt_user(&self, name: &str) -> Option<u64> {
        self.opt_id(name)
    }

    pub fn user(&self, name: &str) -> Result<u64, AppError> {
        self.opt_id(name).ok_or_else(|| Self::missing(name))
    }

    pub fn opt_channel(&self, name: &str) -> Option<u64> {
        self.opt_id(name)
    }

    pub fn channel(&self, name: &str) -> Result<u64, AppError> {
        self.opt_id(name).ok_or_else(|| Self::missing(name))
    }

    pub fn opt_role(&self, name: &str) -> Option<u64> {
        self.opt_id(name)
    }

    pub fn role(&self, name: &str) -> Result<u64, AppError> {
        self.opt_id(name).ok_or_else(|| Self::missing(name))
    }

    /// A snowflake typed as text, such as a message id.
    pub fn snowflake(&self, name: &str) -> Result<u64, AppError> {
        parse_user_supplied_id(name, &self.string(name)?)
    }
}

/// A command with its arguments extracted and typed.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Prefix { value: String },
    Modlog { channel_id: u64 },
    Welcome { channel_id: u64, message: String },
    Leave { message: String },
    AutoRole { role_id: Option<u64> },
    ModmailSetup { enabled: bool },
    ModmailReply { message: String },
    ModmailClose { reason: Option<String> },
    ModmailContact { user_id: u64, message: String },
    ReactionRoleAdd { message_id: u64, emoji: String, role_id: u64, channel_id: Option<u64> },
    ReactionRoleRemove { message_id: u64, emoji: String },
    ReactionRoleList,
    Kick { user_id: u64, reason: Option<String> },
    Ban { user_id: u64, reason: Option<String>, delete_days: u8 },
    Unban { user_id: u64, reason: Option<String> },
    Timeout { user_id: u64, minutes: u32, reason: Option<String> },
    Untimeout { user_id: u64 },
    Warn { user_id: u64, reason: String },
    Warnings { user_id: u64 },
    ClearWarnings { user_id: u64 },
    Purge { amount: u8 },
    Slowmode { seconds: u16, channel_id: Option<u64> },
    CustomCmdCreate { name: String, response: String, embed: bool },
    CustomCmdEdit { name: String, response: Option<String>, embed: Option<bool> },
    CustomCmdDelete { name: String },
    CustomCmdList,
    VerifySetup {
        role_id: u64,
        channel_id: u64,
        title: Option<String>,
        message: Option<String>,
        unverified_role_id: Option<u64>,
    },
    TicketSetup { category_id: u64, staff_role_id: u64, log_channel_id: Option<u64> },
    Ticket { topic: Option<String> },
    TicketClose { reason: Option<String> },
    GiveawayStart { prize: String, minutes: u32, winners: u32, description: Option<String> },
    GiveawayEnd { message_id: u64 },
    Rank { user_id: Option<u64> },
    Levels,
    SetLevel { user_id: u64, level: u32 },
    AddXp { user_id: u64, amount: i64 },
    LevelRole { level: u32, role_id: u64 },
    RemoveLevelRole { level: u32 },
    /// `None` uses the default milestones.
    LevelingSetup { milestones: Option<String> },
    /// `None` XP bounds keep the stored values.
    LevelingConfig {
        enabled: bool,
        channel_id: Option<u64>,
        xp_min: Option<i32>,
        xp_max: Option<i32>,
    },
}

impl Command {
    pub fn parse(kind: CommandKind, args: &CommandArgs) -> Result<Self, AppError> {
        let command = match kind {
            CommandKind::Prefix => Self::Prefix {
                value: args.string("value")?,
            },
            CommandKind::Modlog => Self::Modlog {
                channel_id: args.channel("channel")?,
            },
            CommandKind::Welcome => Self::Welcome {
                channel_id: args.channel("channel")?,
                message: args.string("message")?,
            },
            CommandKind::Leave => Self::Leave {
                message: args.string("message")?,
            },
            CommandKind::AutoRole => Self::AutoRole {
                role_id: args.opt_role("role"),
            },
            CommandKind::ModmailSetup => Self::ModmailSetup {
                enabled: args
                    .opt_boolean("enabled")
                    .ok_or_else(|| CommandArgs::missing("enabled"))?,
            },
            CommandKind::ModmailReply => Self::ModmailReply {
                message: args.string("message")?,
            },
            CommandKind::ModmailClose => Self::ModmailClose {
                reason: args.opt_string("reason"),
            },
            CommandKind::ModmailContact => Self::ModmailContact {
                user_id: args.user("user")?,
                message: args.string("message")?,
            },
            CommandKind::ReactionRoleAdd => Self::ReactionRoleAdd {
                message_id: args.snowflake("message_id")?,
                emoji: args.string("emoji")?,
                role_id: args.role("role")?,
                channel_id: args.opt_channel("channel"),
            },
            CommandKind::ReactionRoleRemove => Self::ReactionRoleRemove {
                message_id: args.snowflake("message_id")?,
                emoji: args.string("emoji")?,
            },
            CommandKind::ReactionRoleList => Self::ReactionRoleList,
            CommandKind::Kick => Self::Kick {
                user_id: args.user("member")?,
                reason: args.opt_string("reason"),
            },
            CommandKind::Ban => Self::Ban {
                user_id: args.user("member")?,
                reason: args.opt_string("reason"),
                delete_days: match args.opt_integer("delete_days") {
                    Some(_) => args.integer("delete_days")?,
                    None => 0,
                },
            },
            CommandKind::Unban => Self::Unban {
                user_id: args.snowflake("user_id")?,
                reason: args.opt_string("reason"),
            },
            CommandKind::Timeout => Self::Timeout {
                user_id: args.user("member")?,
                minutes: args.integer("minutes")?,
                reason: args.opt_string("reason"),
            },
            CommandKind::Untimeout => Self::Untimeout {
                user_id: args.user("member")?,
            },
            CommandKind::Warn => Self::Warn {
                user_id: args.user("member")?,
                reason: args.string("reason")?,
            },
            CommandKind::Warnings => Self::Warnings {
                user_id: args.user("member")?,
            },
            CommandKind::ClearWarnings => Self::ClearWarnings {
                user_id: args.user("member")?,
            },
            CommandKind::Purge => Self::Purge {
                amount: args.integer("amount")?,
            },
            CommandKind::Slowmode => Self::Slowmode {
                seconds: args.integer("seconds")?,
                channel_id: args.opt_channel("channel"),
            },
            CommandKind::CustomCmdCreate => Self::CustomCmdCreate {
                name: args.string("name")?,
                response: args.string("response")?,
                embed: args.opt_boolean("embed").unwrap_or(false),
            },
            CommandKind::CustomCmdEdit => Self::CustomCmdEdit {
                name: args.string("name")?,
                response: args.opt_string("response"),
                embed: args.opt_boolean("embed"),
            },
            CommandKind::CustomCmdDelete => Self::CustomCmdDelete {
                name: args.string("name")?,
            },
            CommandKind::CustomCmdList => Self::CustomCmdList,
            CommandKind::VerifySetup => Self::VerifySetup {
                role_id: args.role("role")?,
                channel_id: args.channel("channel")?,
                title: args.opt_string("title"),
                message: args.opt_string("message"),
                unverified_role_id: args.opt_role("unverified_role"),
            },
            CommandKind::TicketSetup => Self::TicketSetup {
                category_id: args.channel("category")?,
                staff_role_id: args.role("staff_role")?,
                log_channel_id: args.opt_channel("log_channel"),
            },
            CommandKind::Ticket => Self::Ticket {
                topic: args.opt_string("topic"),
            },
            CommandKind::TicketClose => Self::TicketClose {
                reason: args.opt_string("reason"),
            },
            CommandKind::GiveawayStart => Self::GiveawayStart {
                prize: args.string("prize")?,
                minutes: args.integer("minutes")?,
                winners: args.integer("winners")?,
                description: args.opt_string("description"),
            },
            CommandKind::GiveawayEnd => Self::GiveawayEnd {
                message_id: args.snowflake("message_id")?,
            },
            CommandKind::Rank => Self::Rank {
                user_id: args.opt_user("user"),
            },
            CommandKind::Levels => Self::Levels,
            CommandKind::SetLevel => Self::SetLevel {
                user_id: args.user("user")?,
                level: args.integer("level")?,
            },
            CommandKind::AddXp => Self::AddXp {
                user_id: args.user("user")?,
                amount: args.integer("amount")?,
            },
            CommandKind::LevelRole => Self::LevelRole {
                level: args.integer("level")?,
                role_id: args.role("role")?,
            },
            CommandKind::RemoveLevelRole => Self::RemoveLevelRole {
                level: args.integer("level")?,
            },
            CommandKind::LevelingSetup => Self::LevelingSetup {
                milestones: args.opt_string("milestones"),
            },
            CommandKind::LevelingConfig => Self::LevelingConfig {
                enabled: args
                    .opt_boolean("enabled")
                    .ok_or_else(|| CommandArgs::missing("enabled"))?,
                channel_id: args.opt_channel("channel"),
                xp_min: match args.opt_integer("xp_min") {
                    Some(_) => Some(args.integer("xp_min")?),
                    None => None,
                },
                xp_max: match args.opt_integer("xp_max") {
                    Some(_) => Some(args.integer("xp_max")?),
                    None => None,
                },
            },
        };

        Ok(command)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(kind: CommandKind, args: Vec<(&str, ArgValue)>) -> Result<Command, AppError> {
        let args = args
            .into_iter()
            .map(|(name, value)| (name.to_string(), value))
            .collect();
        let validated = CommandArgs::validate(&kind.definition(), args)?;
        Command::parse(kind, &validated)
    }

    #[test]
    fn builtin_registry_is_valid() {
        let registry = CommandRegistry::new().unwrap();

        assert_eq!(registry.definitions().count(), CommandKind::ALL.len());
        assert_eq!(
            registry.resolve("giveaway_start").map(|(kind, _)| kind),
            Some(CommandKind::GiveawayStart)
        );
        assert!(registry.resolve("reroll").is_none());
    }

    #[test]
    fn rejects_duplicate_command_names() {
        let result = CommandRegistry::from_definitions(vec![
            (CommandKind::Kick, CommandKind::Kick.definition()),
            (CommandKind::Ban, CommandKind::Kick.definition()),
        ]);

        assert!(matches!(
            result,
            Err(ConfigError::InvalidCommandRegistry(msg)) if msg.contains("duplicate command name")
        ));
    }

    #[test]
    fn rejects_invalid_names() {
        let mut definition = CommandKind::Purge.definition();
        definition.name = "Purge";

        let result = CommandRegistry::from_definitions(vec![(CommandKind::Purge, definition)]);

        assert!(matches!(result, Err(ConfigError::InvalidCommandRegistry(_))));
    }

    #[test]
    fn rejects_duplicate_options() {
        let definition = CommandKind::Purge.definition().option(OptionDefinition::required(
            "amount",
            "again",
            ArgKind::Integer,
        ));

        let result = CommandRegistry::from_definitions(vec![(CommandKind::Purge, definition)]);

        assert!(matches!(
            result,
            Err(ConfigError::InvalidCommandRegistry(msg)) if msg.contains("duplicate option")
        ));
    }

    #[test]
    fn parses_typed_arguments() {
        let command = parse(
            CommandKind::Timeout,
            vec![
                ("member", ArgValue::User(42)),
                ("minutes", ArgValue::Integer(60)),
            ],
        )
        .unwrap();

        assert_eq!(
            command,
            Command::Timeout {
                user_id: 42,
                minutes: 60,
                reason: None
            }
        );
    }

    #[test]
    fn integer_out_of_range_is_invalid_argument() {
        let too_many = parse(CommandKind::Purge, vec![("amount", ArgValue::Integer(101))]);
        let too_few = parse(CommandKind::Purge, vec![("amount", ArgValue::Integer(0))]);

        assert!(matches!(too_many, Err(AppError::InvalidArgument(_))));
        assert!(matches!(too_few, Err(AppError::InvalidArgument(_))));
    }

    #[test]
    fn prefix_longer_than_five_characters_is_rejected() {
        let result = parse(
            CommandKind::Prefix,
            vec![("value", ArgValue::String("!!!!!!".to_string()))],
        );

        assert!(matches!(result, Err(AppError::InvalidArgument(_))));
    }

    #[test]
    fn missing_required_option_is_invalid_argument() {
        let result = parse(CommandKind::Warn, vec![("member", ArgValue::User(1))]);

        assert!(matches!(result, Err(AppError::InvalidArgument(msg)) if msg.contains("reason")));
    }

    #[test]
    fn message_id_accepts_text_snowflake() {
        let command = parse(
            CommandKind::GiveawayEnd,
            vec![("message_id", ArgValue::String("1234567890123".to_string()))],
        )
        .unwrap();

        assert_eq!(
            command,
            Command::GiveawayEnd {
                message_id: 1234567890123
            }
        );
    }

    #[test]
    fn addxp_accepts_negative_amounts() {
        let command = parse(
            CommandKind::AddXp,
            vec![
                ("user", ArgValue::User(9)),
                ("amount", ArgValue::Integer(-250)),
            ],
        )
        .unwrap();

        assert_eq!(
            command,
            Command::AddXp {
                user_id: 9,
                amount: -250
            }
        );
    }

    #[test]
    fn setlevel_above_max_is_rejected() {
        let result = parse(
            CommandKind::SetLevel,
            vec![
                ("user", ArgValue::User(9)),
                ("level", ArgValue::Integer(MAX_LEVEL as i64 + 1)),
            ],
        );

        assert!(matches!(result, Err(AppError::InvalidArgument(_))));
    }

    #[test]
    fn ban_defaults_to_keeping_messages() {
        let command = parse(CommandKind::Ban, vec![("member", ArgValue::User(9))]).unwrap();

        assert!(matches!(command, Command::Ban { delete_days: 0, .. }));
    }
}
