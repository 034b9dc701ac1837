use serenity::all::{CommandDataOptionValue, CommandInteraction, ComponentInteraction, Interaction};

use crate::server::bot::{
    dispatch::Dispatcher,
    event::{ArgValue, BotEvent, CommandInvocation, ComponentInvocation},
    handler::actor,
    platform::InteractionRef,
};

/// Routes slash commands and button presses; other interaction types are ignored.
pub async fn handle_interaction(dispatcher: &Dispatcher, interaction: Interaction) {
    match interaction {
        Interaction::Command(command) => {
            dispatcher
                .dispatch(BotEvent::Command(command_invocation(command)))
                .await
        }
        Interaction::Component(component) => {
            dispatcher
                .dispatch(BotEvent::Component(component_invocation(component)))
                .await
        }
        other => tracing::debug!("Ignoring {:?} interaction", other.kind()),
    }
}

fn command_invocation(command: CommandInteraction) -> CommandInvocation {
    let args = command
        .data
        .options
        .iter()
        .filter_map(|option| match arg_value(&option.value) {
            Some(value) => Some((option.name.clone(), value)),
            None => {
                tracing::debug!(
                    "Dropping unsupported value for option {} of /{}",
                    option.name,
                    command.data.name
                );
                None
            }
        })
        .collect();

    CommandInvocation {
        interaction: InteractionRef {
            id: command.id.get(),
            token: command.token,
        },
        name: command.data.name,
        guild_id: command.guild_id.map(|id| id.get()),
        channel_id: command.channel_id.get(),
        actor: actor(&command.user),
        args,
    }
}

fn component_invocation(component: ComponentInteraction) -> ComponentInvocation {
    ComponentInvocation {
        interaction: InteractionRef {
            id: component.id.get(),
            token: component.token,
        },
        custom_id: component.data.custom_id,
        guild_id: component.guild_id.map(|id| id.get()),
        channel_id: component.channel_id.get(),
        actor: actor(&component.user),
    }
}

/// Converts a top-level option value; subcommands, attachments and numbers are not used.
pub fn arg_value(value: &CommandDataOptionValue) -> Option<ArgValue> {
    match value {
        CommandDataOptionValue::String(s) => Some(ArgValue::String(s.clone())),
        CommandDataOptionValue::Integer(i) => Some(ArgValue::Integer(*i)),
        CommandDataOptionValue::Boolean(b) => Some(ArgValue::Boolean(*b)),
        CommandDataOptionValue::User(id) => Some(ArgValue::User(id.get())),
        CommandDataOptionValue::Channel(id) => Some(ArgValue::Channel(id.get())),
        CommandDataOptionValue::Role(id) => Some(ArgValue::Role(id.get())),
        _ => None,
    }
}
