//! Ready event handler for bot initialization.
//!
//! Fired once per gateway session after authentication. Besides logging the connection,
//! this is where the command registry is published to Discord as global application
//! commands, so the commands users see always match the ones the dispatcher resolves.

use serenity::all::{
    Command as DiscordCommand, CommandOptionType, Context, CreateCommand, CreateCommandOption,
    Ready,
};

use crate::server::bot::{
    command::{ArgKind, CommandDefinition, OptionDefinition},
    dispatch::Dispatcher,
};

/// Handles the ready event when the bot connects to Discord.
///
/// # Arguments
/// - `dispatcher` - Holds the command registry to publish
/// - `ctx` - Discord context used for the registration request
/// - `ready` - Ready event data containing bot user information
pub async fn handle_ready(dispatcher: &Dispatcher, ctx: Context, ready: Ready) {
    tracing::info!(
        "{} is connected to Discord in {} guild(s)",
        ready.user.name,
        ready.guilds.len()
    );

    let commands: Vec<CreateCommand> = dispatcher
        .registry()
        .definitions()
        .map(create_command)
        .collect();

    match DiscordCommand::set_global_commands(&ctx.http, commands).await {
        Ok(registered) => tracing::info!("Registered {} global commands", registered.len()),
        Err(e) => tracing::error!("Failed to register global commands: {}", e),
    }
}

#[allow(deprecated)]
fn create_command(definition: &CommandDefinition) -> CreateCommand {
    let mut command = CreateCommand::new(definition.name)
        .description(definition.description)
        .dm_permission(false);

    if let Some(permissions) = definition.permissions {
        command = command.default_member_permissions(permissions);
    }

    for option in &definition.options {
        command = command.add_option(create_option(option));
    }

    command
}

fn create_option(option: &OptionDefinition) -> CreateCommandOption {
    let kind = match option.kind {
        ArgKind::String => CommandOptionType::String,
        ArgKind::Integer => CommandOptionType::Integer,
        ArgKind::Boolean => CommandOptionType::Boolean,
        ArgKind::User => CommandOptionType::User,
        ArgKind::Channel => CommandOptionType::Channel,
        ArgKind::Role => CommandOptionType::Role,
    };

    let mut created = CreateCommandOption::new(kind, option.name, option.description)
        .required(option.required);

    match option.kind {
        ArgKind::String => {
            if let Some(min) = option.min.and_then(|v| u16::try_from(v).ok()) {
                created = created.min_length(min);
            }
            if let Some(max) = option.max.and_then(|v| u16::try_from(v).ok()) {
                created = created.max_length(max);
            }
        }
        ArgKind::Integer => {
            if let Some(min) = option.min.and_then(|v| u64::try_from(v).ok()) {
                created = created.min_int_value(min);
            }
            if let Some(max) = option.max.and_then(|v| u64::try_from(v).ok()) {
                created = created.max_int_value(max);
            }
        }
        _ => {}
    }

    created
}
