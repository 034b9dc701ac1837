//! [`Platform`] implementation backed by serenity's HTTP client.
//!
//! One instance is created at startup and shared by the dispatcher, so handlers and the
//! giveaway scheduler talk to Discord through a single rate-limited connection pool.

use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use serenity::{
    all::{
        ButtonStyle, ChannelId, ChannelType, CreateActionRow, CreateButton, CreateChannel,
        CreateEmbed, CreateEmbedFooter, CreateInteractionResponse,
        CreateInteractionResponseFollowup, CreateInteractionResponseMessage, CreateMessage,
        EditChannel, EditInteractionResponse, EditMember, EditMessage, EditRole,
        GetMessages, GuildId, InteractionId, MessageId, PermissionOverwrite,
        PermissionOverwriteType, Permissions, ReactionType, RoleId, Timestamp, UserId,
    },
    async_trait,
    builder::Builder,
    http::{Http, HttpError},
};

use crate::server::{
    bot::platform::{
        EmbedSpec, GuildSummary, InteractionRef, NewTextChannel, OutgoingMessage, Platform, Reply,
    },
    error::{internal::InternalError, AppError},
};

/// Discord refuses to bulk delete messages older than two weeks.
const BULK_DELETE_MAX_AGE_DAYS: i64 = 14;
const MAX_CHANNEL_NAME_LEN: usize = 100;

pub struct DiscordPlatform {
    http: Arc<Http>,
}

impl DiscordPlatform {
    pub fn new(http: Arc<Http>) -> Self {
        Self { http }
    }
}

fn is_not_found(err: &serenity::Error) -> bool {
    matches!(
        err,
        serenity::Error::Http(HttpError::UnsuccessfulRequest(response))
            if response.status_code.as_u16() == 404
    )
}

fn timestamp(at: DateTime<Utc>) -> Result<Timestamp, AppError> {
    Timestamp::from_unix_timestamp(at.timestamp()).map_err(|e| {
        AppError::InternalErr(InternalError::InvalidDiscordTimestamp {
            timestamp: at.timestamp(),
            reason: e.to_string(),
        })
    })
}

fn build_embed(spec: EmbedSpec) -> Result<CreateEmbed, AppError> {
    let mut embed = CreateEmbed::new();

    if let Some(title) = spec.title {
        embed = embed.title(title);
    }
    if let Some(description) = spec.description {
        embed = embed.description(description);
    }
    if let Some(color) = spec.color {
        embed = embed.color(color);
    }
    for field in spec.fields {
        embed = embed.field(field.name, field.value, field.inline);
    }
    if let Some(footer) = spec.footer {
        embed = embed.footer(CreateEmbedFooter::new(footer));
    }
    if let Some(at) = spec.timestamp {
        embed = embed.timestamp(timestamp(at)?);
    }

    Ok(embed)
}

fn build_components(message: &OutgoingMessage) -> Vec<CreateActionRow> {
    if message.buttons.is_empty() {
        return Vec::new();
    }

    let buttons = message
        .buttons
        .iter()
        .map(|b| {
            CreateButton::new(b.custom_id.clone())
                .label(b.label.clone())
                .style(ButtonStyle::Primary)
        })
        .collect();

    vec![CreateActionRow::Buttons(buttons)]
}

fn build_message(message: OutgoingMessage) -> Result<CreateMessage, AppError> {
    let mut builder = CreateMessage::new().components(build_components(&message));

    if let Some(content) = message.content {
        builder = builder.content(content);
    }
    if let Some(embed) = message.embed {
        builder = builder.embed(build_embed(embed)?);
    }

    Ok(builder)
}

fn parse_reaction(emoji: &str) -> Result<ReactionType, AppError> {
    ReactionType::try_from(emoji)
        .map_err(|_| AppError::InvalidArgument(format!("`{}` is not a usable emoji.", emoji)))
}

#[async_trait]
impl Platform for DiscordPlatform {
    async fn send_message(
        &self,
        channel_id: u64,
        message: OutgoingMessage,
    ) -> Result<u64, AppError> {
        let sent = ChannelId::new(channel_id)
            .send_message(&self.http, build_message(message)?)
            .await?;

        Ok(sent.id.get())
    }

    async fn edit_message(
        &self,
        channel_id: u64,
        message_id: u64,
        message: OutgoingMessage,
    ) -> Result<(), AppError> {
        let mut builder = EditMessage::new().components(build_components(&message));
        if let Some(content) = message.content {
            builder = builder.content(content);
        }
        if let Some(embed) = message.embed {
            builder = builder.embed(build_embed(embed)?);
        }

        ChannelId::new(channel_id)
            .edit_message(&self.http, MessageId::new(message_id), builder)
            .await?;

        Ok(())
    }

    async fn delete_message(&self, channel_id: u64, message_id: u64) -> Result<(), AppError> {
        ChannelId::new(channel_id)
            .delete_message(&self.http, MessageId::new(message_id))
            .await?;

        Ok(())
    }

    async fn send_direct_message(
        &self,
        user_id: u64,
        message: OutgoingMessage,
    ) -> Result<u64, AppError> {
        let dm = UserId::new(user_id).create_dm_channel(&self.http).await?;
        let sent = dm.id.send_message(&self.http, build_message(message)?).await?;

        Ok(sent.id.get())
    }

    async fn add_reaction(
        &self,
        channel_id: u64,
        message_id: u64,
        emoji: &str,
    ) -> Result<(), AppError> {
        let reaction = parse_reaction(emoji)?;

        match self
            .http
            .create_reaction(ChannelId::new(channel_id), MessageId::new(message_id), &reaction)
            .await
        {
            Ok(()) => Ok(()),
            Err(e) if is_not_found(&e) => Err(AppError::NotFound(
                "That message could not be found in this channel.".to_string(),
            )),
            Err(e) => Err(e.into()),
        }
    }

    async fn ensure_category(&self, guild_id: u64, name: &str) -> Result<u64, AppError> {
        let guild = GuildId::new(guild_id);
        let channels = guild.channels(&self.http).await?;

        if let Some(existing) = channels
            .values()
            .find(|c| c.kind == ChannelType::Category && c.name.eq_ignore_ascii_case(name))
        {
            return Ok(existing.id.get());
        }

        let created = guild
            .create_channel(&self.http, CreateChannel::new(name).kind(ChannelType::Category))
            .await?;

        tracing::info!("Created category '{}' in guild {}", name, guild_id);

        Ok(created.id.get())
    }

    async fn create_text_channel(
        &self,
        guild_id: u64,
        channel: NewTextChannel,
    ) -> Result<u64, AppError> {
        let mut builder = CreateChannel::new(channel.name).kind(ChannelType::Text);

        if let Some(category_id) = channel.category_id {
            builder = builder.category(ChannelId::new(category_id));
        }
        if let Some(topic) = channel.topic {
            builder = builder.topic(topic);
        }
        if let Some(access) = channel.private_to {
            let visible = Permissions::VIEW_CHANNEL
                | Permissions::SEND_MESSAGES
                | Permissions::READ_MESSAGE_HISTORY;

            // The @everyone role shares the guild's id.
            let mut overwrites = vec![PermissionOverwrite {
                allow: Permissions::empty(),
                deny: Permissions::VIEW_CHANNEL,
                kind: PermissionOverwriteType::Role(RoleId::new(guild_id)),
            }];
            // Keep the bot in its own private channels.
            let me = self.http.get_current_user().await?;
            overwrites.push(PermissionOverwrite {
                allow: visible | Permissions::MANAGE_CHANNELS,
                deny: Permissions::empty(),
                kind: PermissionOverwriteType::Member(me.id),
            });
            overwrites.extend(access.member_ids.iter().map(|id| PermissionOverwrite {
                allow: visible,
                deny: Permissions::empty(),
                kind: PermissionOverwriteType::Member(UserId::new(*id)),
            }));
            overwrites.extend(access.role_ids.iter().map(|id| PermissionOverwrite {
                allow: visible,
                deny: Permissions::empty(),
                kind: PermissionOverwriteType::Role(RoleId::new(*id)),
            }));

            builder = builder.permissions(overwrites);
        }

        let created = GuildId::new(guild_id)
            .create_channel(&self.http, builder)
            .await?;

        Ok(created.id.get())
    }

    async fn ensure_role(&self, guild_id: u64, name: &str, color: u32) -> Result<u64, AppError> {
        let guild = GuildId::new(guild_id);
        let roles = guild.roles(&self.http).await?;

        if let Some(existing) = roles.values().find(|r| r.name == name) {
            return Ok(existing.id.get());
        }

        let created = guild
            .create_role(
                &self.http,
                EditRole::new()
                    .name(name)
                    .colour(color)
                    .hoist(false)
                    .mentionable(false),
            )
            .await?;

        tracing::info!("Created role '{}' in guild {}", name, guild_id);

        Ok(created.id.get())
    }

    async fn archive_channel(
        &self,
        channel_id: u64,
        category_id: Option<u64>,
    ) -> Result<(), AppError> {
        let channel = ChannelId::new(channel_id);
        let Some(current) = channel.to_channel(&self.http).await?.guild() else {
            return Err(AppError::NotFound(
                "Only server channels can be archived.".to_string(),
            ));
        };

        let mut name = format!("closed-{}", current.name);
        name.truncate(MAX_CHANNEL_NAME_LEN);

        let mut edit = EditChannel::new().name(name);
        if let Some(category_id) = category_id {
            edit = edit.category(Some(ChannelId::new(category_id)));
        }

        channel.edit(&self.http, edit).await?;

        Ok(())
    }

    async fn channel_transcript(
        &self,
        channel_id: u64,
        limit: u8,
    ) -> Result<Vec<String>, AppError> {
        let messages = ChannelId::new(channel_id)
            .messages(&self.http, GetMessages::new().limit(limit))
            .await?;

        // Discord returns newest first.
        Ok(messages
            .iter()
            .rev()
            .map(|m| format!("{}: {}", m.author.name, m.content))
            .collect())
    }

    async fn guild_summary(&self, guild_id: u64) -> Result<GuildSummary, AppError> {
        let guild = GuildId::new(guild_id)
            .to_partial_guild_with_counts(&self.http)
            .await?;

        Ok(GuildSummary {
            name: guild.name,
            owner_id: guild.owner_id.get(),
            member_count: guild.approximate_member_count.unwrap_or_default(),
        })
    }

    async fn member_role_ids(
        &self,
        guild_id: u64,
        user_id: u64,
    ) -> Result<Option<Vec<u64>>, AppError> {
        match GuildId::new(guild_id)
            .member(&self.http, UserId::new(user_id))
            .await
        {
            Ok(member) => Ok(Some(member.roles.iter().map(|r| r.get()).collect())),
            Err(e) if is_not_found(&e) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    async fn top_role_position(&self, guild_id: u64, user_id: u64) -> Result<u16, AppError> {
        let Some(role_ids) = self.member_role_ids(guild_id, user_id).await? else {
            return Err(AppError::NotFound(format!(
                "<@{}> is not a member of this server.",
                user_id
            )));
        };

        let roles = GuildId::new(guild_id).roles(&self.http).await?;

        Ok(role_ids
            .iter()
            .filter_map(|id| roles.get(&RoleId::new(*id)))
            .map(|role| role.position)
            .max()
            .unwrap_or(0))
    }

    async fn add_role(
        &self,
        guild_id: u64,
        user_id: u64,
        role_id: u64,
        reason: &str,
    ) -> Result<(), AppError> {
        self.http
            .add_member_role(
                GuildId::new(guild_id),
                UserId::new(user_id),
                RoleId::new(role_id),
                Some(reason),
            )
            .await?;
        Ok(())
    }

    async fn remove_role(
        &self,
        guild_id: u64,
        user_id: u64,
        role_id: u64,
        reason: &str,
    ) -> Result<(), AppError> {
        self.http
            .remove_member_role(
                GuildId::new(guild_id),
                UserId::new(user_id),
                RoleId::new(role_id),
                Some(reason),
            )
            .await?;
        Ok(())
    }

    async fn kick(&self, guild_id: u64, user_id: u64, reason: &str) -> Result<(), AppError> {
        GuildId::new(guild_id)
            .kick_with_reason(&self.http, UserId::new(user_id), reason)
            .await?;
        Ok(())
    }

    async fn ban(
        &self,
        guild_id: u64,
        user_id: u64,
        delete_message_days: u8,
        reason: &str,
    ) -> Result<(), AppError> {
        GuildId::new(guild_id)
            .ban_with_reason(&self.http, UserId::new(user_id), delete_message_days, reason)
            .await?;
        Ok(())
    }

    async fn unban(&self, guild_id: u64, user_id: u64, _reason: &str) -> Result<(), AppError> {
        match GuildId::new(guild_id)
            .unban(&self.http, UserId::new(user_id))
            .await
        {
            Ok(()) => Ok(()),
            Err(e) if is_not_found(&e) => Err(AppError::NotFound(format!(
                "<@{}> is not banned.",
                user_id
            ))),
            Err(e) => Err(e.into()),
        }
    }

    async fn timeout(
        &self,
        guild_id: u64,
        user_id: u64,
        until: Option<DateTime<Utc>>,
    ) -> Result<(), AppError> {
        let edit = match until {
            Some(until) => EditMember::new().disable_communication_until(until.to_rfc3339()),
            None => EditMember::new().enable_communication(),
        };

        GuildId::new(guild_id)
            .edit_member(&self.http, UserId::new(user_id), edit)
            .await?;
        Ok(())
    }

    async fn purge(&self, channel_id: u64, amount: u8) -> Result<usize, AppError> {
        let channel = ChannelId::new(channel_id);
        let cutoff = (Utc::now() - Duration::days(BULK_DELETE_MAX_AGE_DAYS)).timestamp();

        let ids: Vec<MessageId> = channel
            .messages(&self.http, GetMessages::new().limit(amount))
            .await?
            .into_iter()
            .filter(|m| m.timestamp.unix_timestamp() > cutoff)
            .map(|m| m.id)
            .collect();

        match ids.as_slice() {
            [] => {}
            [single] => channel.delete_message(&self.http, *single).await?,
            many => {
                let body = serde_json::json!({
                    "messages": many.iter().map(|id| id.to_string()).collect::<Vec<_>>()
                });
                self.http
                    .delete_messages(channel, &body, Some("Purge"))
                    .await?;
            }
        }

        Ok(ids.len())
    }

    async fn set_slowmode(&self, channel_id: u64, seconds: u16) -> Result<(), AppError> {
        ChannelId::new(channel_id)
            .edit(&self.http, EditChannel::new().rate_limit_per_user(seconds))
            .await?;
        Ok(())
    }

    async fn respond(&self, interaction: &InteractionRef, reply: Reply) -> Result<(), AppError> {
        let mut message = CreateInteractionResponseMessage::new().ephemeral(reply.ephemeral);
        if let Some(content) = reply.content {
            message = message.content(content);
        }
        if let Some(embed) = reply.embed {
            message = message.embed(build_embed(embed)?);
        }

        CreateInteractionResponse::Message(message)
            .execute(
                &self.http,
                (InteractionId::new(interaction.id), interaction.token.as_str()),
            )
            .await?;

        Ok(())
    }

    async fn defer(&self, interaction: &InteractionRef, ephemeral: bool) -> Result<(), AppError> {
        CreateInteractionResponse::Defer(
            CreateInteractionResponseMessage::new().ephemeral(ephemeral),
        )
        .execute(
            &self.http,
            (InteractionId::new(interaction.id), interaction.token.as_str()),
        )
        .await?;

        Ok(())
    }

    async fn edit_response(
        &self,
        interaction: &InteractionRef,
        reply: Reply,
    ) -> Result<(), AppError> {
        let mut edit = EditInteractionResponse::new();
        if let Some(content) = reply.content {
            edit = edit.content(content);
        }
        if let Some(embed) = reply.embed {
            edit = edit.embed(build_embed(embed)?);
        }

        edit.execute(&self.http, interaction.token.as_str()).await?;

        Ok(())
    }

    async fn delete_response(&self, interaction: &InteractionRef) -> Result<(), AppError> {
        self.http
            .delete_original_interaction_response(&interaction.token)
            .await?;

        Ok(())
    }

    async fn follow_up(&self, interaction: &InteractionRef, reply: Reply) -> Result<(), AppError> {
        let mut message = CreateInteractionResponseFollowup::new().ephemeral(reply.ephemeral);
        if let Some(content) = reply.content {
            message = message.content(content);
        }
        if let Some(embed) = reply.embed {
            message = message.embed(build_embed(embed)?);
        }

        message
            .execute(&self.http, (None, interaction.token.as_str()))
            .await?;

        Ok(())
    }
}
