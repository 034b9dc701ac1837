//! Support tickets: private channels between one member and the staff role.

use chrono::Utc;
use sea_orm::DatabaseConnection;

use crate::{
    model::ticket::PaginatedTicketsDto,
    server::{
        bot::{
            event::Actor,
            platform::{color, ChannelAccess, EmbedSpec, NewTextChannel, OutgoingMessage, Platform},
        },
        data::{ticket::TicketRepository, total_pages},
        error::AppError,
        model::ticket::{Ticket, TicketConfig},
        util::naming::{channel_name, truncate},
    },
};

/// Messages captured into the transcript when a ticket closes.
pub const TRANSCRIPT_LIMIT: u8 = 100;

/// Embed descriptions are capped at 4096 characters; leave room for the code fence.
const LOG_TRANSCRIPT_LEN: usize = 4000;

pub struct TicketService<'a> {
    db: &'a DatabaseConnection,
}

impl<'a> TicketService<'a> {
    pub fn new(db: &'a DatabaseConnection) -> Self {
        Self { db }
    }

    pub async fn configure(&self, config: TicketConfig) -> Result<TicketConfig, AppError> {
        Ok(TicketRepository::new(self.db).upsert_config(config).await?)
    }

    pub async fn config(&self, guild_id: u64) -> Result<Option<TicketConfig>, AppError> {
        Ok(TicketRepository::new(self.db).find_config(guild_id).await?)
    }

    /// Opens a ticket for `opener` and creates its private channel.
    ///
    /// # Returns
    /// - `Ok(Ticket)` - Ticket with its channel bound
    /// - `Err(AppError::NotFound)` - Tickets are not configured in this guild
    /// - `Err(AppError::Conflict)` - The opener already has an open ticket
    pub async fn open(
        &self,
        platform: &dyn Platform,
        guild_id: u64,
        opener: &Actor,
        topic: Option<String>,
    ) -> Result<Ticket, AppError> {
        let repo = TicketRepository::new(self.db);
        let config = repo.find_config(guild_id).await?.ok_or_else(|| {
            AppError::NotFound("Tickets are not set up on this server.".to_string())
        })?;

        let Some(ticket) = repo.claim(guild_id, opener.id, topic.clone()).await? else {
            let existing = repo.find_open_by_opener(guild_id, opener.id).await?;
            return Err(AppError::Conflict(
                match existing.and_then(|t| t.channel_id) {
                    Some(channel_id) => format!("You already have an open ticket: <#{}>", channel_id),
                    None => "You already have an open ticket.".to_string(),
                },
            ));
        };

        let channel = NewTextChannel {
            name: channel_name("ticket", &opener.name, opener.id),
            category_id: Some(config.category_id),
            topic: Some(match &topic {
                Some(topic) => format!("Ticket by {}: {}", opener.name, topic),
                None => format!("Ticket by {}", opener.name),
            }),
            private_to: Some(ChannelAccess {
                member_ids: vec![opener.id],
                role_ids: vec![config.staff_role_id],
            }),
        };
        let channel_id = match platform.create_text_channel(guild_id, channel).await {
            Ok(channel_id) => channel_id,
            Err(e) => {
                if let Err(discard) = repo.discard(ticket.id).await {
                    tracing::warn!("Failed to release ticket {}: {}", ticket.id, discard);
                }
                return Err(e);
            }
        };
        let ticket = repo.set_channel(ticket.id, channel_id).await?;

        let opening = EmbedSpec::new()
            .title("Ticket opened")
            .description(
                topic
                    .as_deref()
                    .unwrap_or("Describe your issue and staff will be with you shortly."),
            )
            .color(color::INFO)
            .field("Opened by", format!("<@{}>", opener.id), true)
            .footer("Close this ticket with /ticket_close")
            .timestamp(Utc::now());
        platform
            .send_message(
                channel_id,
                OutgoingMessage::embed(opening).with_content(format!(
                    "<@{}> <@&{}>",
                    opener.id, config.staff_role_id
                )),
            )
            .await?;

        tracing::info!(
            "Opened ticket {} for user {} in guild {}",
            ticket.id,
            opener.id,
            guild_id
        );

        Ok(ticket)
    }

    /// Closes the ticket bound to `channel_id`.
    ///
    /// Only the opener or a holder of the staff role may close. The transcript is captured
    /// before the conditional close so the winner of a concurrent close stores it.
    pub async fn close(
        &self,
        platform: &dyn Platform,
        guild_id: u64,
        channel_id: u64,
        actor: &Actor,
        reason: Option<&str>,
    ) -> Result<Ticket, AppError> {
        let repo = TicketRepository::new(self.db);
        let ticket = repo
            .find_latest_by_channel(channel_id)
            .await?
            .filter(|t| t.guild_id == guild_id)
            .ok_or_else(|| AppError::NotFound("This channel is not a ticket.".to_string()))?;

        if !ticket.open {
            return Err(already_closed());
        }

        let config = repo.find_config(guild_id).await?.ok_or_else(|| {
            AppError::NotFound("Tickets are not set up on this server.".to_string())
        })?;

        if actor.id != ticket.opener_id {
            let roles = platform
                .member_role_ids(guild_id, actor.id)
                .await?
                .unwrap_or_default();
            if !roles.contains(&config.staff_role_id) {
                return Err(AppError::PermissionDenied(
                    "Only the ticket opener or staff can close this ticket.".to_string(),
                ));
            }
        }

        let transcript = platform
            .channel_transcript(channel_id, TRANSCRIPT_LIMIT)
            .await?
            .join("\n");

        if !repo.close(ticket.id, actor.id, transcript.clone()).await? {
            return Err(already_closed());
        }

        if let Some(log_channel_id) = config.log_channel_id {
            let mut log = EmbedSpec::new()
                .title(format!("Ticket #{} closed", ticket.id))
                .description(format!(
                    "```\n{}\n```",
                    truncate(&transcript, LOG_TRANSCRIPT_LEN)
                ))
                .color(color::WARNING)
                .field("Opened by", format!("<@{}>", ticket.opener_id), true)
                .field("Closed by", format!("<@{}>", actor.id), true)
                .timestamp(Utc::now());
            if let Some(reason) = reason {
                log = log.field("Reason", reason, false);
            }
            if let Err(e) = platform
                .send_message(log_channel_id, OutgoingMessage::embed(log))
                .await
            {
                tracing::warn!("Failed to log closed ticket {}: {}", ticket.id, e);
            }
        }

        let notice = EmbedSpec::new()
            .title("Ticket closed")
            .description(format!(
                "Closed by <@{}>{}",
                actor.id,
                reason.map(|r| format!(": {}", r)).unwrap_or_default()
            ))
            .color(color::WARNING);
        if let Err(e) = platform
            .send_message(channel_id, OutgoingMessage::embed(notice))
            .await
        {
            tracing::warn!("Failed to post close notice for ticket {}: {}", ticket.id, e);
        }

        if let Err(e) = platform.archive_channel(channel_id, None).await {
            tracing::warn!("Failed to archive ticket channel {}: {}", channel_id, e);
        }

        tracing::info!("Closed ticket {} by {}", ticket.id, actor.id);

        Ok(ticket)
    }

    pub async fn get_paginated(
        &self,
        guild_id: u64,
        page: u64,
        per_page: u64,
    ) -> Result<PaginatedTicketsDto, AppError> {
        let (tickets, total) = TicketRepository::new(self.db)
            .get_paginated(guild_id, page, per_page)
            .await?;

        Ok(PaginatedTicketsDto {
            tickets: tickets.into_iter().map(Ticket::into_dto).collect(),
            total,
            page,
            per_page,
            total_pages: total_pages(total, per_page),
        })
    }
}

fn already_closed() -> AppError {
    AppError::Conflict("This ticket is already closed.".to_string())
}
