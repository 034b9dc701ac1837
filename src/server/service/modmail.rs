//! Modmail: private channels relaying DMs between a member and a guild's staff.
//!
//! A user has at most one open thread at a time. The thread row is claimed before its channel
//! is created, so two DMs arriving together cannot open two channels; the loser gets a
//! `Conflict`. Closing archives the channel, and the next DM from the user starts a new
//! thread with a new id.

use chrono::Utc;
use sea_orm::DatabaseConnection;

use crate::{
    model::modmail::PaginatedModmailThreadsDto,
    server::{
        bot::{
            event::{Actor, InboundMessage},
            platform::{color, EmbedSpec, NewTextChannel, OutgoingMessage, Platform},
        },
        data::{guild_config::GuildConfigRepository, modmail::ModmailRepository, total_pages},
        error::AppError,
        model::modmail::{AppendModmailMessageParams, ModmailThread, ThreadStatus},
        util::naming::channel_name,
    },
};

pub const OPEN_CATEGORY: &str = "Modmail";
pub const CLOSED_CATEGORY: &str = "Modmail - Closed";

const GUILD_SELECTOR: &str = "guild:";
const RECEIVED_EMOJI: &str = "✅";
const EMPTY_CONTENT: &str = "*(no text content)*";

pub struct ModmailService<'a> {
    db: &'a DatabaseConnection,
}

impl<'a> ModmailService<'a> {
    pub fn new(db: &'a DatabaseConnection) -> Self {
        Self { db }
    }

    /// Handles a DM sent to the bot.
    ///
    /// With an open thread the message is forwarded into it. Otherwise the user's guild is
    /// determined (asking them to pick with `guild:<id>` when several qualify) and a new
    /// thread is opened.
    pub async fn handle_direct_message(
        &self,
        platform: &dyn Platform,
        message: &InboundMessage,
    ) -> Result<(), AppError> {
        let repo = ModmailRepository::new(self.db);

        if let Some(thread) = repo.find_open_by_user(message.author.id).await? {
            return self.forward(platform, &thread, message).await;
        }

        let Some((guild_id, content)) = self.select_guild(platform, message).await? else {
            return Ok(());
        };

        let thread = self
            .open_thread(platform, guild_id, message.author.id, &message.author.name)
            .await?;
        let channel_id = bound_channel(&thread)?;

        repo.append_message(AppendModmailMessageParams {
            thread_id: thread.id,
            author_id: message.author.id,
            content: content.clone(),
            is_staff: false,
        })
        .await?;

        let opening = EmbedSpec::new()
            .title(format!("New modmail from {}", message.author.name))
            .description(content)
            .color(color::INFO)
            .field("User", format!("<@{}>", message.author.id), true)
            .footer(format!("User ID: {}", message.author.id))
            .timestamp(Utc::now());
        platform
            .send_message(channel_id, OutgoingMessage::embed(opening))
            .await?;

        let server = platform.guild_summary(guild_id).await?.name;
        let confirmation = EmbedSpec::new()
            .title("Message sent")
            .description(format!(
                "Your message was delivered to the staff of **{}**. Replies will arrive here.",
                server
            ))
            .color(color::SUCCESS);
        platform
            .send_direct_message(message.author.id, OutgoingMessage::embed(confirmation))
            .await?;

        tracing::info!(
            "Opened modmail thread {} for user {} in guild {}",
            thread.id,
            message.author.id,
            guild_id
        );

        Ok(())
    }

    /// Relays a staff reply from a thread channel to the user.
    pub async fn reply(
        &self,
        platform: &dyn Platform,
        channel_id: u64,
        staff: &Actor,
        text: &str,
    ) -> Result<(), AppError> {
        let repo = ModmailRepository::new(self.db);
        let thread = repo
            .find_open_by_channel(channel_id)
            .await?
            .ok_or_else(not_a_thread)?;

        let server = platform.guild_summary(thread.guild_id).await?.name;
        let dm = EmbedSpec::new()
            .title(format!("Reply from {} staff", server))
            .description(text)
            .color(color::SUCCESS)
            .timestamp(Utc::now());
        platform
            .send_direct_message(thread.user_id, OutgoingMessage::embed(dm))
            .await
            .map_err(|e| {
                tracing::debug!("Modmail reply to user {} failed: {}", thread.user_id, e);
                AppError::Upstream(
                    "The reply could not be delivered; the user may have closed their DMs."
                        .to_string(),
                )
            })?;

        repo.append_message(AppendModmailMessageParams {
            thread_id: thread.id,
            author_id: staff.id,
            content: text.to_string(),
            is_staff: true,
        })
        .await?;

        let echo = EmbedSpec::new()
            .title(format!("Staff reply from {}", staff.name))
            .description(text)
            .color(color::SUCCESS)
            .timestamp(Utc::now());
        platform
            .send_message(channel_id, OutgoingMessage::embed(echo))
            .await?;

        Ok(())
    }

    /// Closes the thread bound to `channel_id` and archives its channel.
    ///
    /// # Returns
    /// - `Ok(ModmailThread)` - The thread as it was before closing
    /// - `Err(AppError::NotFound)` - The channel is not a modmail thread
    /// - `Err(AppError::Conflict)` - The thread is already closed
    pub async fn close(
        &self,
        platform: &dyn Platform,
        channel_id: u64,
        actor_id: u64,
        reason: Option<&str>,
    ) -> Result<ModmailThread, AppError> {
        let repo = ModmailRepository::new(self.db);
        let thread = repo
            .find_latest_by_channel(channel_id)
            .await?
            .ok_or_else(not_a_thread)?;

        if thread.status == ThreadStatus::Closed || !repo.close(thread.id, actor_id).await? {
            return Err(AppError::Conflict(
                "This modmail thread is already closed.".to_string(),
            ));
        }

        let archived = async {
            let category = platform
                .ensure_category(thread.guild_id, CLOSED_CATEGORY)
                .await?;
            platform.archive_channel(channel_id, Some(category)).await
        };
        if let Err(e) = archived.await {
            tracing::warn!("Failed to archive modmail channel {}: {}", channel_id, e);
        }

        let mut notice = EmbedSpec::new()
            .title("Modmail thread closed")
            .description("Staff closed this conversation. Send a new message to start a new thread.")
            .color(color::WARNING);
        if let Some(reason) = reason {
            notice = notice.field("Reason", reason, false);
        }
        if let Err(e) = platform
            .send_direct_message(thread.user_id, OutgoingMessage::embed(notice))
            .await
        {
            tracing::warn!(
                "Failed to notify user {} about closed thread {}: {}",
                thread.user_id,
                thread.id,
                e
            );
        }

        tracing::info!("Closed modmail thread {} by {}", thread.id, actor_id);

        Ok(thread)
    }

    /// Staff-initiated thread toward a member of `guild_id`.
    pub async fn contact(
        &self,
        platform: &dyn Platform,
        guild_id: u64,
        staff: &Actor,
        user_id: u64,
        text: &str,
    ) -> Result<ModmailThread, AppError> {
        if platform.member_role_ids(guild_id, user_id).await?.is_none() {
            return Err(AppError::NotFound(format!(
                "<@{}> is not a member of this server.",
                user_id
            )));
        }

        let repo = ModmailRepository::new(self.db);
        if let Some(existing) = repo.find_open_by_user(user_id).await? {
            return Err(AppError::Conflict(match existing.channel_id {
                Some(channel_id) => format!(
                    "<@{}> already has an open modmail thread in <#{}>.",
                    user_id, channel_id
                ),
                None => format!("<@{}> already has an open modmail thread.", user_id),
            }));
        }

        let thread = self.open_thread(platform, guild_id, user_id, "").await?;
        let channel_id = bound_channel(&thread)?;

        repo.append_message(AppendModmailMessageParams {
            thread_id: thread.id,
            author_id: staff.id,
            content: text.to_string(),
            is_staff: true,
        })
        .await?;

        let server = platform.guild_summary(guild_id).await?.name;
        let dm = EmbedSpec::new()
            .title(format!("Message from {} staff", server))
            .description(text)
            .color(color::INFO)
            .footer("Reply here to answer.");
        let delivered = platform
            .send_direct_message(user_id, OutgoingMessage::embed(dm))
            .await;

        let mut opening = EmbedSpec::new()
            .title(format!("Modmail opened by {}", staff.name))
            .description(text)
            .color(color::INFO)
            .field("User", format!("<@{}>", user_id), true);
        if let Err(e) = delivered {
            tracing::warn!("Failed to DM user {} for modmail contact: {}", user_id, e);
            opening = opening.field(
                "Delivery",
                "The user could not be reached by DM.",
                false,
            );
        }
        platform
            .send_message(channel_id, OutgoingMessage::embed(opening))
            .await?;

        Ok(thread)
    }

    /// Gets a page of the guild's threads, newest first
    pub async fn get_paginated(
        &self,
        guild_id: u64,
        page: u64,
        per_page: u64,
    ) -> Result<PaginatedModmailThreadsDto, AppError> {
        let (threads, total) = ModmailRepository::new(self.db)
            .get_paginated(guild_id, page, per_page)
            .await?;

        Ok(PaginatedModmailThreadsDto {
            threads: threads.into_iter().map(ModmailThread::into_dto).collect(),
            total,
            page,
            per_page,
            total_pages: total_pages(total, per_page),
        })
    }

    /// Claims a thread, then creates its channel. The claim is released if the channel
    /// cannot be created or bound to the thread.
    async fn open_thread(
        &self,
        platform: &dyn Platform,
        guild_id: u64,
        user_id: u64,
        user_name: &str,
    ) -> Result<ModmailThread, AppError> {
        let repo = ModmailRepository::new(self.db);

        let Some(thread) = repo.claim_thread(guild_id, user_id).await? else {
            return Err(AppError::Conflict(
                "A modmail thread is already open for this user.".to_string(),
            ));
        };

        let created = async {
            let category_id = platform.ensure_category(guild_id, OPEN_CATEGORY).await?;
            let topic = if user_name.is_empty() {
                format!("Modmail thread with <@{}> ({})", user_id, user_id)
            } else {
                format!("Modmail thread with {} ({})", user_name, user_id)
            };
            platform
                .create_text_channel(
                    guild_id,
                    NewTextChannel {
                        name: channel_name("modmail", user_name, user_id),
                        category_id: Some(category_id),
                        topic: Some(topic),
                        private_to: None,
                    },
                )
                .await
        };

        let bound = match created.await {
            Ok(channel_id) => repo.set_channel(thread.id, channel_id).await.map_err(|e| {
                tracing::error!(
                    "Failed to bind modmail thread {} to channel {}; channel {} is orphaned: {}",
                    thread.id,
                    channel_id,
                    channel_id,
                    e
                );
                AppError::from(e)
            }),
            Err(e) => Err(e),
        };

        if bound.is_err() {
            if let Err(discard) = repo.discard(thread.id).await {
                tracing::warn!("Failed to release modmail thread {}: {}", thread.id, discard);
            }
        }
        bound
    }

    async fn forward(
        &self,
        platform: &dyn Platform,
        thread: &ModmailThread,
        message: &InboundMessage,
    ) -> Result<(), AppError> {
        let channel_id = bound_channel(thread)?;
        let content = non_empty(&message.content);

        ModmailRepository::new(self.db)
            .append_message(AppendModmailMessageParams {
                thread_id: thread.id,
                author_id: message.author.id,
                content: content.clone(),
                is_staff: false,
            })
            .await?;

        let embed = EmbedSpec::new()
            .title(message.author.name.clone())
            .description(content)
            .color(color::INFO)
            .footer(format!("User ID: {}", message.author.id))
            .timestamp(Utc::now());
        platform
            .send_message(channel_id, OutgoingMessage::embed(embed))
            .await?;

        if let Err(e) = platform
            .add_reaction(message.channel_id, message.id, RECEIVED_EMOJI)
            .await
        {
            tracing::debug!("Failed to acknowledge DM {}: {}", message.id, e);
        }

        Ok(())
    }

    /// Picks the guild a new thread goes to.
    ///
    /// # Returns
    /// - `Ok(Some((guild_id, content)))` - Guild chosen; `content` has any selector removed
    /// - `Ok(None)` - Several guilds qualify and the user was asked to choose
    /// - `Err(AppError::NotFound)` - No modmail-enabled guild shares the user
    async fn select_guild(
        &self,
        platform: &dyn Platform,
        message: &InboundMessage,
    ) -> Result<Option<(u64, String)>, AppError> {
        let mut candidates = Vec::new();
        for guild_id in GuildConfigRepository::new(self.db).modmail_guild_ids().await? {
            if platform
                .member_role_ids(guild_id, message.author.id)
                .await?
                .is_some()
            {
                candidates.push(guild_id);
            }
        }

        if candidates.is_empty() {
            return Err(AppError::NotFound(
                "You don't share a server with me that accepts modmail.".to_string(),
            ));
        }

        let (selected, rest) = parse_guild_selector(&message.content);
        match selected {
            Some(guild_id) if candidates.contains(&guild_id) => {
                return Ok(Some((guild_id, non_empty(rest))));
            }
            None if candidates.len() == 1 => {
                return Ok(Some((candidates[0], non_empty(&message.content))));
            }
            _ => {}
        }

        let mut lines = Vec::with_capacity(candidates.len());
        for guild_id in &candidates {
            let name = platform.guild_summary(*guild_id).await?.name;
            lines.push(format!("`{}{}` **{}**", GUILD_SELECTOR, guild_id, name));
        }
        let prompt = EmbedSpec::new()
            .title("Which server is this for?")
            .description(format!(
                "{}\n\nStart your message with one of the codes above, for example `{}{} Hello`.",
                lines.join("\n"),
                GUILD_SELECTOR,
                candidates[0]
            ))
            .color(color::INFO);
        platform
            .send_direct_message(message.author.id, OutgoingMessage::embed(prompt))
            .await?;

        Ok(None)
    }
}

/// Splits a leading `guild:<id>` selector from a DM.
fn parse_guild_selector(content: &str) -> (Option<u64>, &str) {
    let Some(rest) = content.trim_start().strip_prefix(GUILD_SELECTOR) else {
        return (None, content);
    };
    let (id, remainder) = rest.split_once(char::is_whitespace).unwrap_or((rest, ""));

    match id.parse::<u64>() {
        Ok(guild_id) => (Some(guild_id), remainder.trim_start()),
        Err(_) => (None, content),
    }
}

fn non_empty(content: &str) -> String {
    let trimmed = content.trim();
    if trimmed.is_empty() {
        EMPTY_CONTENT.to_string()
    } else {
        trimmed.to_string()
    }
}

fn bound_channel(thread: &ModmailThread) -> Result<u64, AppError> {
    thread.channel_id.ok_or_else(|| {
        AppError::Conflict(
            "Your modmail thread is still being set up. Please try again in a moment."
                .to_string(),
        )
    })
}

fn not_a_thread() -> AppError {
    AppError::NotFound("This channel is not an open modmail thread.".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::server::bot::fake::{Call, FakePlatform};
    use sea_orm::ConnectionTrait;
    use test_utils::{builder::TestBuilder, factory::guild_config::GuildConfigFactory};

    const USER: u64 = 42;

    fn dm(content: &str) -> InboundMessage {
        InboundMessage {
            id: 7,
            channel_id: 8,
            guild_id: None,
            author: Actor {
                id: USER,
                name: "ferris".to_string(),
                bot: false,
            },
            content: content.to_string(),
        }
    }

    fn staff() -> Actor {
        Actor {
            id: 2,
            name: "mod".to_string(),
            bot: false,
        }
    }

    async fn enable_modmail(db: &DatabaseConnection, guild_id: u64) -> Result<(), AppError> {
        GuildConfigFactory::new(db)
            .guild_id(guild_id.to_string())
            .modmail_enabled(true)
            .build()
            .await?;
        Ok(())
    }

    #[test]
    fn splits_guild_selector() {
        assert_eq!(parse_guild_selector("guild:123 hello"), (Some(123), "hello"));
        assert_eq!(parse_guild_selector("guild:abc hi"), (None, "guild:abc hi"));
        assert_eq!(parse_guild_selector("hello"), (None, "hello"));
    }

    /// Tests the first DM of a user opening a thread with its own channel.
    ///
    /// Expected: channel created, message forwarded, user confirmed, history stored
    #[tokio::test]
    async fn first_dm_opens_thread() -> Result<(), AppError> {
        let test = TestBuilder::new()
            .with_table(entity::prelude::GuildConfig)
            .with_modmail_tables()
            .build()
            .await
            .unwrap();
        let db = test.db.as_ref().unwrap();
        enable_modmail(db, 10).await?;
        let platform = FakePlatform::new().with_member(10, USER, &[]);
        let service = ModmailService::new(db);

        service.handle_direct_message(&platform, &dm("I need help")).await?;

        let repo = ModmailRepository::new(db);
        let thread = repo.find_open_by_user(USER).await?.unwrap();
        let channel_id = thread.channel_id.unwrap();
        assert_eq!(
            platform.last_created_channel().map(|c| c.name),
            Some("modmail-ferris".to_string())
        );
        assert_eq!(platform.messages_to(channel_id).len(), 1);
        assert_eq!(platform.direct_messages_to(USER).len(), 1);
        assert_eq!(repo.messages(thread.id).await?.len(), 1);

        Ok(())
    }

    /// Tests that a thread whose channel cannot be recorded is released.
    ///
    /// Expected: Err(DbErr), no thread left behind, the next DM opens a thread normally
    #[tokio::test]
    async fn unbound_channel_releases_claim() -> Result<(), AppError> {
        let test = TestBuilder::new()
            .with_table(entity::prelude::GuildConfig)
            .with_modmail_tables()
            .build()
            .await
            .unwrap();
        let db = test.db.as_ref().unwrap();
        enable_modmail(db, 10).await?;
        db.execute_unprepared(
            "CREATE TRIGGER refuse_bind BEFORE UPDATE OF channel_id ON modmail_thread \
             BEGIN SELECT RAISE(ABORT, 'bind refused'); END",
        )
        .await?;
        let platform = FakePlatform::new().with_member(10, USER, &[]);
        let service = ModmailService::new(db);

        let result = service.handle_direct_message(&platform, &dm("I need help")).await;

        assert!(matches!(result, Err(AppError::DbErr(_))));
        assert!(platform.last_created_channel().is_some());
        let repo = ModmailRepository::new(db);
        assert!(repo.find_open_by_user(USER).await?.is_none());

        db.execute_unprepared("DROP TRIGGER refuse_bind").await?;
        service.handle_direct_message(&platform, &dm("still there?")).await?;
        assert!(repo.find_open_by_user(USER).await?.unwrap().channel_id.is_some());

        Ok(())
    }

    /// Tests that a follow-up DM is forwarded into the existing thread and acknowledged.
    ///
    /// Expected: a single channel, two forwarded messages, a ✅ reaction
    #[tokio::test]
    async fn follow_up_dm_is_forwarded() -> Result<(), AppError> {
        let test = TestBuilder::new()
            .with_table(entity::prelude::GuildConfig)
            .with_modmail_tables()
            .build()
            .await
            .unwrap();
        let db = test.db.as_ref().unwrap();
        enable_modmail(db, 10).await?;
        let platform = FakePlatform::new().with_member(10, USER, &[]);
        let service = ModmailService::new(db);

        service.handle_direct_message(&platform, &dm("first")).await?;
        service.handle_direct_message(&platform, &dm("second")).await?;

        assert_eq!(
            platform.count(|c| matches!(c, Call::CreateChannel { .. })),
            1
        );
        assert_eq!(
            platform.count(|c| matches!(c, Call::AddReaction { emoji, .. } if emoji == "✅")),
            1
        );

        Ok(())
    }

    /// Tests that a user in two modmail guilds is asked to choose, then can choose.
    ///
    /// Expected: no thread after the bare DM, a thread in guild 11 after `guild:11`
    #[tokio::test]
    async fn asks_to_choose_between_guilds() -> Result<(), AppError> {
        let test = TestBuilder::new()
            .with_table(entity::prelude::GuildConfig)
            .with_modmail_tables()
            .build()
            .await
            .unwrap();
        let db = test.db.as_ref().unwrap();
        enable_modmail(db, 10).await?;
        enable_modmail(db, 11).await?;
        let platform = FakePlatform::new()
            .with_member(10, USER, &[])
            .with_member(11, USER, &[]);
        let service = ModmailService::new(db);
        let repo = ModmailRepository::new(db);

        service.handle_direct_message(&platform, &dm("hello")).await?;
        assert!(repo.find_open_by_user(USER).await?.is_none());
        assert_eq!(platform.direct_messages_to(USER).len(), 1);

        service
            .handle_direct_message(&platform, &dm("guild:11 hello"))
            .await?;
        let thread = repo.find_open_by_user(USER).await?.unwrap();
        assert_eq!(thread.guild_id, 11);

        Ok(())
    }

    /// Tests that a user without any modmail guild gets NotFound.
    ///
    /// Expected: Err(NotFound)
    #[tokio::test]
    async fn no_shared_guild_is_not_found() -> Result<(), AppError> {
        let test = TestBuilder::new()
            .with_table(entity::prelude::GuildConfig)
            .with_modmail_tables()
            .build()
            .await
            .unwrap();
        let db = test.db.as_ref().unwrap();
        enable_modmail(db, 10).await?;
        let platform = FakePlatform::new();

        let result = ModmailService::new(db)
            .handle_direct_message(&platform, &dm("hello"))
            .await;

        assert!(matches!(result, Err(AppError::NotFound(_))));

        Ok(())
    }

    /// Tests close followed by a new DM opening a distinct thread, and a second close.
    ///
    /// Expected: channel archived, user notified, new thread id, second close Conflict
    #[tokio::test]
    async fn close_then_reopen_creates_new_thread() -> Result<(), AppError> {
        let test = TestBuilder::new()
            .with_table(entity::prelude::GuildConfig)
            .with_modmail_tables()
            .build()
            .await
            .unwrap();
        let db = test.db.as_ref().unwrap();
        enable_modmail(db, 10).await?;
        let platform = FakePlatform::new().with_member(10, USER, &[]);
        let service = ModmailService::new(db);
        let repo = ModmailRepository::new(db);

        service.handle_direct_message(&platform, &dm("first")).await?;
        let first = repo.find_open_by_user(USER).await?.unwrap();
        let channel_id = first.channel_id.unwrap();

        service.close(&platform, channel_id, 2, Some("solved")).await?;
        assert_eq!(
            platform.count(|c| matches!(c, Call::ArchiveChannel { channel_id: id, .. } if *id == channel_id)),
            1
        );
        assert!(matches!(
            service.close(&platform, channel_id, 2, None).await,
            Err(AppError::Conflict(_))
        ));

        service.handle_direct_message(&platform, &dm("again")).await?;
        let second = repo.find_open_by_user(USER).await?.unwrap();
        assert_ne!(first.id, second.id);

        Ok(())
    }

    /// Tests that a staff reply reaches the user and is recorded as a staff message.
    ///
    /// Expected: DM to the user, staff message in history, NotFound outside a thread
    #[tokio::test]
    async fn reply_relays_to_user() -> Result<(), AppError> {
        let test = TestBuilder::new()
            .with_table(entity::prelude::GuildConfig)
            .with_modmail_tables()
            .build()
            .await
            .unwrap();
        let db = test.db.as_ref().unwrap();
        enable_modmail(db, 10).await?;
        let platform = FakePlatform::new().with_member(10, USER, &[]);
        let service = ModmailService::new(db);
        let repo = ModmailRepository::new(db);

        service.handle_direct_message(&platform, &dm("help")).await?;
        let thread = repo.find_open_by_user(USER).await?.unwrap();

        service
            .reply(&platform, thread.channel_id.unwrap(), &staff(), "On it")
            .await?;

        let history = repo.messages(thread.id).await?;
        assert!(history.last().unwrap().is_staff);
        assert_eq!(platform.direct_messages_to(USER).len(), 2);
        assert!(matches!(
            service.reply(&platform, 999, &staff(), "hi").await,
            Err(AppError::NotFound(_))
        ));

        Ok(())
    }

    /// Tests that staff cannot open a second thread toward a user who already has one.
    ///
    /// Expected: first contact Ok, second Err(Conflict)
    #[tokio::test]
    async fn contact_conflicts_with_open_thread() -> Result<(), AppError> {
        let test = TestBuilder::new()
            .with_table(entity::prelude::GuildConfig)
            .with_modmail_tables()
            .build()
            .await
            .unwrap();
        let db = test.db.as_ref().unwrap();
        let platform = FakePlatform::new().with_member(10, USER, &[]);
        let service = ModmailService::new(db);

        service
            .contact(&platform, 10, &staff(), USER, "Hello from staff")
            .await?;
        let again = service
            .contact(&platform, 10, &staff(), USER, "Hello again")
            .await;

        assert!(matches!(again, Err(AppError::Conflict(_))));

        Ok(())
    }
}
