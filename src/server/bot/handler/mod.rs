use std::sync::{Arc, OnceLock};

use serenity::all::{
    Context, EventHandler, GuildId, Interaction, Member, Message, Reaction, Ready, User,
};
use serenity::async_trait;

use crate::server::bot::{dispatch::Dispatcher, event::Actor};

pub mod interaction;
pub mod member;
pub mod message;
pub mod reaction;
pub mod ready;

/// Discord bot event handler
///
/// Converts gateway events into [`BotEvent`](crate::server::bot::event::BotEvent)s and
/// hands them to the dispatcher. Events caused by this bot are dropped here.
pub struct Handler {
    pub dispatcher: Arc<Dispatcher>,
    /// Set from the ready payload.
    pub bot_id: OnceLock<u64>,
}

impl Handler {
    pub fn new(dispatcher: Arc<Dispatcher>) -> Self {
        Self {
            dispatcher,
            bot_id: OnceLock::new(),
        }
    }

    fn is_self(&self, user_id: u64) -> bool {
        self.bot_id.get() == Some(&user_id)
    }
}

pub(crate) fn actor(user: &User) -> Actor {
    Actor {
        id: user.id.get(),
        name: user.name.clone(),
        bot: user.bot,
    }
}

#[async_trait]
impl EventHandler for Handler {
    /// Called when the bot is ready and connected to Discord
    async fn ready(&self, ctx: Context, ready: Ready) {
        let _ = self.bot_id.set(ready.user.id.get());
        ready::handle_ready(&self.dispatcher, ctx, ready).await;
    }

    /// Called when a message is sent in a guild channel or a DM
    async fn message(&self, _ctx: Context, message: Message) {
        if message.author.bot || self.is_self(message.author.id.get()) {
            return;
        }
        message::handle_message(&self.dispatcher, message).await;
    }

    async fn reaction_add(&self, _ctx: Context, reaction: Reaction) {
        if reaction.user_id.is_some_and(|id| self.is_self(id.get())) {
            return;
        }
        reaction::handle_reaction(&self.dispatcher, reaction, true).await;
    }

    async fn reaction_remove(&self, _ctx: Context, reaction: Reaction) {
        if reaction.user_id.is_some_and(|id| self.is_self(id.get())) {
            return;
        }
        reaction::handle_reaction(&self.dispatcher, reaction, false).await;
    }

    /// Called when a member joins a guild
    async fn guild_member_addition(&self, _ctx: Context, new_member: Member) {
        if self.is_self(new_member.user.id.get()) {
            return;
        }
        member::handle_guild_member_addition(&self.dispatcher, new_member).await;
    }

    /// Called when a member leaves a guild
    async fn guild_member_removal(
        &self,
        _ctx: Context,
        guild_id: GuildId,
        user: User,
        _member_data_if_available: Option<Member>,
    ) {
        if self.is_self(user.id.get()) {
            return;
        }
        member::handle_guild_member_removal(&self.dispatcher, guild_id, user).await;
    }

    /// Called for slash commands and button presses
    async fn interaction_create(&self, _ctx: Context, interaction: Interaction) {
        interaction::handle_interaction(&self.dispatcher, interaction).await;
    }
}
