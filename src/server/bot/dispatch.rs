//! Routes [`BotEvent`]s to the services that handle them.
//!
//! The dispatcher owns the only catch-all for handler errors. Every error is logged and,
//! where someone is waiting on an answer, turned into a user-facing reply: an interaction
//! response for commands and buttons, a DM for modmail. Nothing returned by a handler can
//! stop the gateway loop.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use sea_orm::DatabaseConnection;

use crate::server::{
    bot::{
        command::{Command, CommandArgs, CommandDefinition, CommandKind, CommandRegistry},
        event::{BotEvent, CommandInvocation, ComponentInvocation, InboundMessage, ReactionEvent},
        execute,
        platform::{OutgoingMessage, Platform, Reply},
    },
    data::guild_config::GuildConfigRepository,
    error::AppError,
    service::{
        custom_command::CustomCommandService, giveaway::GiveawayService,
        leveling::LevelingService, member::MemberService, modmail::ModmailService,
        reaction_role::ReactionRoleService,
    },
};

/// Commands are acknowledged privately; public answers are re-posted as follow-ups.
const DEFER_EPHEMERAL: bool = true;

/// What every handler receives alongside its event payload.
#[derive(Clone, Copy)]
pub struct HandlerContext<'a> {
    pub db: &'a DatabaseConnection,
    pub platform: &'a dyn Platform,
}

pub struct Dispatcher {
    db: DatabaseConnection,
    platform: Arc<dyn Platform>,
    registry: CommandRegistry,
}

impl Dispatcher {
    pub fn new(db: DatabaseConnection, platform: Arc<dyn Platform>, registry: CommandRegistry) -> Self {
        Self {
            db,
            platform,
            registry,
        }
    }

    pub fn registry(&self) -> &CommandRegistry {
        &self.registry
    }

    fn context(&self) -> HandlerContext<'_> {
        HandlerContext {
            db: &self.db,
            platform: self.platform.as_ref(),
        }
    }

    /// Handles one event to completion.
    pub async fn dispatch(&self, event: BotEvent) {
        let kind = event.kind();

        let result = match event {
            BotEvent::GuildMessage(message) => self.on_guild_message(&message).await,
            BotEvent::DirectMessage(message) => self.on_direct_message(&message).await,
            BotEvent::ReactionAdd(reaction) => self.on_reaction(&reaction, true).await,
            BotEvent::ReactionRemove(reaction) => self.on_reaction(&reaction, false).await,
            BotEvent::MemberJoin(member) => {
                MemberService::new(&self.db)
                    .on_join(self.platform.as_ref(), &member)
                    .await
            }
            BotEvent::MemberLeave(member) => {
                MemberService::new(&self.db)
                    .on_leave(self.platform.as_ref(), &member)
                    .await
            }
            BotEvent::Command(invocation) => {
                self.on_command(&invocation).await;
                Ok(())
            }
            BotEvent::Component(invocation) => {
                self.on_component(&invocation).await;
                Ok(())
            }
            BotEvent::Tick(now) => self.on_tick(now).await,
        };

        if let Err(e) = result {
            tracing::error!("Failed to handle {} event: {}", kind, e);
        }
    }

    async fn on_guild_message(&self, message: &InboundMessage) -> Result<(), AppError> {
        let Some(guild_id) = message.guild_id else {
            return Ok(());
        };
        if message.author.bot {
            return Ok(());
        }

        if let Err(e) = LevelingService::new(&self.db)
            .on_message(self.platform.as_ref(), message, guild_id, Utc::now())
            .await
        {
            tracing::warn!(
                "Failed to award message XP to user {} in guild {}: {}",
                message.author.id,
                guild_id,
                e
            );
        }

        let config = GuildConfigRepository::new(&self.db)
            .get_or_create(guild_id)
            .await?;

        CustomCommandService::new(&self.db)
            .respond(self.platform.as_ref(), message, guild_id, &config.prefix)
            .await?;

        Ok(())
    }

    /// Runs level role setups queued from the dashboard, then resolves due giveaways.
    async fn on_tick(&self, now: DateTime<Utc>) -> Result<(), AppError> {
        match LevelingService::new(&self.db)
            .process_setup_requests(self.platform.as_ref())
            .await
        {
            Ok(0) => {}
            Ok(processed) => tracing::info!("Ran {} queued level role setup(s)", processed),
            Err(e) => tracing::error!("Failed to run queued level role setups: {}", e),
        }

        let resolved = GiveawayService::new(&self.db)
            .resolve_due(self.platform.as_ref(), now)
            .await?;
        if resolved > 0 {
            tracing::info!("Resolved {} due giveaway(s)", resolved);
        }

        Ok(())
    }

    async fn on_direct_message(&self, message: &InboundMessage) -> Result<(), AppError> {
        if message.author.bot {
            return Ok(());
        }

        let Err(e) = ModmailService::new(&self.db)
            .handle_direct_message(self.platform.as_ref(), message)
            .await
        else {
            return Ok(());
        };

        log_handler_error("direct_message", message.author.id, &e);
        self.platform
            .send_direct_message(message.author.id, OutgoingMessage::text(e.user_message()))
            .await
            .map(|_| ())
    }

    async fn on_reaction(&self, reaction: &ReactionEvent, added: bool) -> Result<(), AppError> {
        let roles = ReactionRoleService::new(&self.db);
        let role_result = if added {
            roles.on_reaction_add(self.platform.as_ref(), reaction).await
        } else {
            roles.on_reaction_remove(self.platform.as_ref(), reaction).await
        };
        if let Err(e) = role_result {
            tracing::warn!(
                "Failed to apply reaction role on message {}: {}",
                reaction.message_id,
                e
            );
        }

        GiveawayService::new(&self.db)
            .on_reaction(reaction, added)
            .await?;

        Ok(())
    }

    /// Defers the interaction before running the command so that slow handlers do not miss
    /// Discord's three second acknowledgement window, then delivers the answer.
    async fn on_command(&self, invocation: &CommandInvocation) {
        let Some((kind, definition)) = self.registry.resolve(&invocation.name) else {
            tracing::debug!("Ignoring unknown command /{}", invocation.name);
            return;
        };

        let deferred = match self
            .platform
            .defer(&invocation.interaction, DEFER_EPHEMERAL)
            .await
        {
            Ok(()) => true,
            Err(e) => {
                tracing::warn!("Failed to defer /{}: {}", invocation.name, e);
                false
            }
        };

        let reply = match self.run_command(invocation, kind, definition).await {
            Ok(reply) => reply,
            Err(e) => {
                log_handler_error(&invocation.name, invocation.actor.id, &e);
                Reply::private(e.user_message())
            }
        };

        if let Err(e) = self.deliver(invocation, deferred, reply).await {
            tracing::error!(
                "Failed to respond to /{} from user {}: {}",
                invocation.name,
                invocation.actor.id,
                e
            );
        }
    }

    async fn deliver(
        &self,
        invocation: &CommandInvocation,
        deferred: bool,
        reply: Reply,
    ) -> Result<(), AppError> {
        let interaction = &invocation.interaction;
        if !deferred {
            return self.platform.respond(interaction, reply).await;
        }
        if reply.ephemeral == DEFER_EPHEMERAL {
            return self.platform.edit_response(interaction, reply).await;
        }

        // The placeholder's visibility cannot change, so replace it with a new message.
        self.platform.delete_response(interaction).await?;
        self.platform.follow_up(interaction, reply).await
    }

    async fn run_command(
        &self,
        invocation: &CommandInvocation,
        kind: CommandKind,
        definition: &CommandDefinition,
    ) -> Result<Reply, AppError> {
        let Some(guild_id) = invocation.guild_id else {
            return Err(AppError::InvalidArgument(
                "This command can only be used in a server.".to_string(),
            ));
        };

        let args = CommandArgs::validate(definition, invocation.args.clone())?;
        let command = Command::parse(kind, &args)?;

        let config = GuildConfigRepository::new(&self.db)
            .get_or_create(guild_id)
            .await?;

        tracing::debug!(
            "User {} ran /{} in guild {}",
            invocation.actor.id,
            invocation.name,
            guild_id
        );

        execute::run_command(self.context(), &config, invocation, command).await
    }

    async fn on_component(&self, invocation: &ComponentInvocation) {
        let reply = match invocation.guild_id {
            None => None,
            Some(guild_id) => match execute::run_component(self.context(), guild_id, invocation).await {
                Ok(reply) => reply,
                Err(e) => {
                    log_handler_error(&invocation.custom_id, invocation.actor.id, &e);
                    Some(Reply::private(e.user_message()))
                }
            },
        };

        let Some(reply) = reply else {
            tracing::debug!("Ignoring unknown component {}", invocation.custom_id);
            return;
        };

        if let Err(e) = self.platform.respond(&invocation.interaction, reply).await {
            tracing::error!(
                "Failed to respond to component {} from user {}: {}",
                invocation.custom_id,
                invocation.actor.id,
                e
            );
        }
    }
}

/// Domain errors are expected outcomes of user input; everything else is a fault.
fn log_handler_error(source: &str, user_id: u64, error: &AppError) {
    match error {
        AppError::PermissionDenied(_)
        | AppError::NotFound(_)
        | AppError::InvalidArgument(_)
        | AppError::Conflict(_) => {
            tracing::debug!("{} from user {} rejected: {}", source, user_id, error)
        }
        _ => tracing::error!("{} from user {} failed: {}", source, user_id, error),
    }
}
