use serenity::all::Reaction;

use crate::server::bot::{
    dispatch::Dispatcher,
    event::{BotEvent, ReactionEvent},
};

/// Handles reaction add and remove in guild channels.
///
/// Reactions in DMs and reactions without a user id are ignored. Custom emoji are passed on
/// in their `<:name:id>` form; bindings key them by id.
pub async fn handle_reaction(dispatcher: &Dispatcher, reaction: Reaction, added: bool) {
    let (Some(guild_id), Some(user_id)) = (reaction.guild_id, reaction.user_id) else {
        tracing::debug!("Ignoring reaction on message {} outside a guild", reaction.message_id);
        return;
    };

    let event = ReactionEvent {
        guild_id: guild_id.get(),
        channel_id: reaction.channel_id.get(),
        message_id: reaction.message_id.get(),
        user_id: user_id.get(),
        emoji: reaction.emoji.to_string(),
    };

    dispatcher
        .dispatch(if added {
            BotEvent::ReactionAdd(event)
        } else {
            BotEvent::ReactionRemove(event)
        })
        .await;
}
