use serenity::all::{GuildId, Member, User};

use crate::server::bot::{
    dispatch::Dispatcher,
    event::{BotEvent, MemberEvent},
    handler::actor,
};

/// Handles the guild_member_addition event when a member joins a guild
pub async fn handle_guild_member_addition(dispatcher: &Dispatcher, new_member: Member) {
    tracing::debug!(
        "User {} joined guild {}",
        new_member.user.id,
        new_member.guild_id
    );

    dispatcher
        .dispatch(BotEvent::MemberJoin(MemberEvent {
            guild_id: new_member.guild_id.get(),
            user: actor(&new_member.user),
        }))
        .await;
}

/// Handles the guild_member_removal event when a member leaves a guild
pub async fn handle_guild_member_removal(dispatcher: &Dispatcher, guild_id: GuildId, user: User) {
    tracing::debug!("User {} left guild {}", user.id, guild_id);

    dispatcher
        .dispatch(BotEvent::MemberLeave(MemberEvent {
            guild_id: guild_id.get(),
            user: actor(&user),
        }))
        .await;
}
