use serenity::all::Message;

use crate::server::bot::{
    dispatch::Dispatcher,
    event::{BotEvent, InboundMessage},
    handler::actor,
};

/// Handle message creation in a guild channel or a DM
pub async fn handle_message(dispatcher: &Dispatcher, message: Message) {
    let inbound = InboundMessage {
        id: message.id.get(),
        channel_id: message.channel_id.get(),
        guild_id: message.guild_id.map(|id| id.get()),
        author: actor(&message.author),
        content: message.content,
    };

    let event = if inbound.guild_id.is_some() {
        BotEvent::GuildMessage(inbound)
    } else {
        BotEvent::DirectMessage(inbound)
    };

    dispatcher.dispatch(event).await;
}
