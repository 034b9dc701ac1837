//! Runs a parsed [`Command`] against the services and turns the outcome into a reply.

use chrono::Utc;

use crate::server::{
    bot::{
        command::Command,
        dispatch::HandlerContext,
        event::{CommandInvocation, ComponentInvocation},
        platform::{color, EmbedSpec, Reply},
    },
    error::AppError,
    model::{
        custom_command::{CreateCustomCommandParams, UpdateCustomCommandParams},
        guild_config::{GuildConfig, GuildSetting},
        leveling::{xp_for_level, XpAdjustment, DEFAULT_MILESTONES},
        reaction_role::{display_emoji, ReactionRoleBinding},
        ticket::TicketConfig,
        verification::{VerificationConfig, DEFAULT_MESSAGE, DEFAULT_TITLE},
    },
    service::{
        custom_command::CustomCommandService,
        giveaway::{GiveawayService, StartGiveawayParams},
        guild_config::GuildConfigService,
        leveling::{parse_milestones, LevelingService},
        moderation::{ModAction, ModLogEntry, ModerationService},
        modmail::ModmailService,
        reaction_role::ReactionRoleService,
        ticket::TicketService,
        verification::{VerificationService, VerifyOutcome, VERIFY_BUTTON_ID},
    },
};

const LEADERBOARD_SIZE: u64 = 10;
const RANK_BAR_WIDTH: usize = 20;

/// Executes a guild command. `config` is the invoking guild's configuration.
pub async fn run_command(
    ctx: HandlerContext<'_>,
    config: &GuildConfig,
    invocation: &CommandInvocation,
    command: Command,
) -> Result<Reply, AppError> {
    let guild_id = config.guild_id;
    let actor = &invocation.actor;
    let channel_id = invocation.channel_id;

    let reply = match command {
        Command::Prefix { value } => {
            let config = apply(ctx, guild_id, GuildSetting::Prefix(value)).await?;
            Reply::private(format!("Custom commands now use the prefix `{}`.", config.prefix))
        }
        Command::Modlog { channel_id } => {
            apply(ctx, guild_id, GuildSetting::ModlogChannel(channel_id)).await?;
            Reply::private(format!("Moderation logs will be posted in <#{}>.", channel_id))
        }
        Command::Welcome {
            channel_id,
            message,
        } => {
            apply(ctx, guild_id, GuildSetting::Welcome { channel_id, message }).await?;
            Reply::private(format!("Welcome messages will be posted in <#{}>.", channel_id))
        }
        Command::Leave { message } => {
            let config = apply(ctx, guild_id, GuildSetting::LeaveMessage(message)).await?;
            match config.welcome_channel_id {
                Some(channel_id) => Reply::private(format!(
                    "Leave message saved. It will be posted in <#{}>.",
                    channel_id
                )),
                None => Reply::private(
                    "Leave message saved. Set a welcome channel with /welcome for it to be posted.",
                ),
            }
        }
        Command::AutoRole { role_id } => {
            apply(ctx, guild_id, GuildSetting::AutoRole(role_id)).await?;
            match role_id {
                Some(role_id) => Reply::private(format!("New members will receive <@&{}>.", role_id)),
                None => Reply::private("Auto-role cleared."),
            }
        }
        Command::ModmailSetup { enabled } => {
            apply(ctx, guild_id, GuildSetting::Modmail(enabled)).await?;
            Reply::private(if enabled {
                "Modmail enabled. Members can now DM me to reach staff."
            } else {
                "Modmail disabled."
            })
        }

        Command::ModmailReply { message } => {
            ModmailService::new(ctx.db)
                .reply(ctx.platform, channel_id, actor, &message)
                .await?;
            Reply::private("Reply sent.")
        }
        Command::ModmailClose { reason } => {
            ModmailService::new(ctx.db)
                .close(ctx.platform, channel_id, actor.id, reason.as_deref())
                .await?;
            Reply::public("Modmail thread closed.")
        }
        Command::ModmailContact { user_id, message } => {
            let thread = ModmailService::new(ctx.db)
                .contact(ctx.platform, guild_id, actor, user_id, &message)
                .await?;
            match thread.channel_id {
                Some(channel_id) => Reply::private(format!("Opened <#{}>.", channel_id)),
                None => Reply::private("Modmail thread opened."),
            }
        }

        Command::ReactionRoleAdd {
            message_id,
            emoji,
            role_id,
            channel_id: target_channel,
        } => {
            let binding = ReactionRoleService::new(ctx.db)
                .add(
                    ctx.platform,
                    ReactionRoleBinding {
                        guild_id,
                        channel_id: target_channel.unwrap_or(channel_id),
                        message_id,
                        emoji,
                        role_id,
                    },
                )
                .await?;
            Reply::private(format!(
                "Reacting with {} on that message now grants <@&{}>.",
                display_emoji(&binding.emoji),
                binding.role_id
            ))
        }
        Command::ReactionRoleRemove { message_id, emoji } => {
            ReactionRoleService::new(ctx.db)
                .remove(guild_id, message_id, &emoji)
                .await?;
            Reply::private("Reaction role removed.")
        }
        Command::ReactionRoleList => {
            let bindings = ReactionRoleService::new(ctx.db).list(guild_id).await?;
            if bindings.is_empty() {
                Reply::private("No reaction roles are set up.")
            } else {
                let lines = bindings
                    .iter()
                    .map(|b| {
                        format!(
                            "{} on [message](https://discord.com/channels/{}/{}/{}) grants <@&{}>",
                            display_emoji(&b.emoji),
                            b.guild_id,
                            b.channel_id,
                            b.message_id,
                            b.role_id
                        )
                    })
                    .collect::<Vec<_>>();
                Reply::embed(
                    EmbedSpec::new()
                        .title("Reaction roles")
                        .description(lines.join("\n"))
                        .color(color::INFO),
                    true,
                )
            }
        }

        Command::Kick { user_id, reason } => {
            ModerationService::new(ctx.db)
                .kick(ctx.platform, guild_id, actor, user_id, reason.as_deref())
                .await?;
            Reply::public(format!("<@{}> was kicked.", user_id))
        }
        Command::Ban {
            user_id,
            reason,
            delete_days,
        } => {
            ModerationService::new(ctx.db)
                .ban(ctx.platform, guild_id, actor, user_id, reason.as_deref(), delete_days)
                .await?;
            Reply::public(format!("<@{}> was banned.", user_id))
        }
        Command::Unban { user_id, reason } => {
            ModerationService::new(ctx.db)
                .unban(ctx.platform, guild_id, actor, user_id, reason.as_deref())
                .await?;
            Reply::public(format!("<@{}> was unbanned.", user_id))
        }
        Command::Timeout {
            user_id,
            minutes,
            reason,
        } => {
            let until = ModerationService::new(ctx.db)
                .timeout(ctx.platform, guild_id, actor, user_id, minutes, reason.as_deref())
                .await?;
            Reply::public(format!(
                "<@{}> is timed out until <t:{}:f>.",
                user_id,
                until.timestamp()
            ))
        }
        Command::Untimeout { user_id } => {
            ModerationService::new(ctx.db)
                .untimeout(ctx.platform, guild_id, actor, user_id)
                .await?;
            Reply::public(format!("<@{}>'s timeout was removed.", user_id))
        }
        Command::Warn { user_id, reason } => {
            let (_, total) = ModerationService::new(ctx.db)
                .warn(ctx.platform, guild_id, actor, user_id, &reason)
                .await?;
            Reply::public(format!(
                "<@{}> has been warned. They now have {} warning(s).",
                user_id, total
            ))
        }
        Command::Warnings { user_id } => {
            let warnings = ModerationService::new(ctx.db)
                .warnings(guild_id, user_id)
                .await?;
            if warnings.is_empty() {
                Reply::private(format!("<@{}> has no warnings.", user_id))
            } else {
                let mut embed = EmbedSpec::new()
                    .title(format!("{} warning(s)", warnings.len()))
                    .description(format!("<@{}>", user_id))
                    .color(color::WARNING);
                // Embeds hold at most 25 fields; show the most recent.
                for warning in warnings.iter().rev().take(25) {
                    embed = embed.field(
                        format!("#{} <t:{}:d>", warning.id, warning.created_at.timestamp()),
                        format!("{} (by <@{}>)", warning.reason, warning.moderator_id),
                        false,
                    );
                }
                Reply::embed(embed, true)
            }
        }
        Command::ClearWarnings { user_id } => {
            let moderation = ModerationService::new(ctx.db);
            let cleared = moderation.clear_warnings(guild_id, user_id).await?;
            moderation
                .log_action(
                    ctx.platform,
                    guild_id,
                    ModLogEntry {
                        action: ModAction::ClearWarnings,
                        target_id: user_id,
                        moderator: actor,
                        reason: None,
                        detail: Some(("Removed", cleared.to_string())),
                    },
                )
                .await;
            Reply::public(format!("Cleared {} warning(s) for <@{}>.", cleared, user_id))
        }
        Command::Purge { amount } => {
            let deleted = ModerationService::new(ctx.db)
                .purge(ctx.platform, channel_id, amount)
                .await?;
            Reply::private(format!("Deleted {} message(s).", deleted))
        }
        Command::Slowmode {
            seconds,
            channel_id: target_channel,
        } => {
            let target = target_channel.unwrap_or(channel_id);
            ModerationService::new(ctx.db)
                .slowmode(ctx.platform, target, seconds)
                .await?;
            Reply::private(if seconds == 0 {
                format!("Slowmode disabled in <#{}>.", target)
            } else {
                format!("Slowmode in <#{}> set to {} second(s).", target, seconds)
            })
        }

        Command::CustomCmdCreate {
            name,
            response,
            embed,
        } => {
            let command = CustomCommandService::new(ctx.db)
                .create(CreateCustomCommandParams {
                    guild_id,
                    name,
                    response,
                    embed,
                    created_by: actor.id,
                })
                .await?;
            Reply::private(format!("Created `{}{}`.", config.prefix, command.name))
        }
        Command::CustomCmdEdit {
            name,
            response,
            embed,
        } => {
            let command = CustomCommandService::new(ctx.db)
                .update(UpdateCustomCommandParams {
                    guild_id,
                    name,
                    response,
                    embed,
                })
                .await?;
            Reply::private(format!("Updated `{}{}`.", config.prefix, command.name))
        }
        Command::CustomCmdDelete { name } => {
            CustomCommandService::new(ctx.db)
                .delete(guild_id, &name)
                .await?;
            Reply::private(format!("Deleted `{}{}`.", config.prefix, name.trim().to_lowercase()))
        }
        Command::CustomCmdList => {
            let commands = CustomCommandService::new(ctx.db).list(guild_id).await?;
            if commands.is_empty() {
                Reply::private("This server has no custom commands.")
            } else {
                let names = commands
                    .iter()
                    .map(|c| format!("`{}{}`", config.prefix, c.name))
                    .collect::<Vec<_>>();
                Reply::embed(
                    EmbedSpec::new()
                        .title(format!("Custom commands ({})", commands.len()))
                        .description(names.join(", "))
                        .color(color::INFO),
                    true,
                )
            }
        }

        Command::VerifySetup {
            role_id,
            channel_id: panel_channel,
            title,
            message,
            unverified_role_id,
        } => {
            let (config, _) = VerificationService::new(ctx.db)
                .setup(
                    ctx.platform,
                    VerificationConfig {
                        guild_id,
                        verified_role_id: role_id,
                        unverified_role_id,
                        channel_id: panel_channel,
                        title: title.unwrap_or_else(|| DEFAULT_TITLE.to_string()),
                        message: message.unwrap_or_else(|| DEFAULT_MESSAGE.to_string()),
                    },
                )
                .await?;
            Reply::private(format!("Verification panel posted in <#{}>.", config.channel_id))
        }

        Command::TicketSetup {
            category_id,
            staff_role_id,
            log_channel_id,
        } => {
            TicketService::new(ctx.db)
                .configure(TicketConfig {
                    guild_id,
                    category_id,
                    staff_role_id,
                    log_channel_id,
                })
                .await?;
            Reply::private("Tickets configured. Members can open one with /ticket.")
        }
        Command::Ticket { topic } => {
            let ticket = TicketService::new(ctx.db)
                .open(ctx.platform, guild_id, actor, topic)
                .await?;
            match ticket.channel_id {
                Some(channel_id) => Reply::private(format!("Your ticket is open: <#{}>", channel_id)),
                None => Reply::private("Your ticket is open."),
            }
        }
        Command::TicketClose { reason } => {
            TicketService::new(ctx.db)
                .close(ctx.platform, guild_id, channel_id, actor, reason.as_deref())
                .await?;
            Reply::public("Ticket closed.")
        }

        Command::GiveawayStart {
            prize,
            minutes,
            winners,
            description,
        } => {
            let giveaway = GiveawayService::new(ctx.db)
                .start(
                    ctx.platform,
                    StartGiveawayParams {
                        guild_id,
                        channel_id,
                        prize,
                        description,
                        minutes,
                        winner_count: winners,
                        created_by: actor.id,
                    },
                    Utc::now(),
                )
                .await?;
            Reply::private(format!(
                "Giveaway started. It ends <t:{}:R>.",
                giveaway.ends_at.timestamp()
            ))
        }
        Command::GiveawayEnd { message_id } => {
            let winners = GiveawayService::new(ctx.db)
                .end(ctx.platform, guild_id, message_id, Utc::now())
                .await?;
            Reply::private(format!("Giveaway ended with {} winner(s).", winners.len()))
        }

        Command::Rank { user_id } => {
            let user_id = user_id.unwrap_or(actor.id);
            let card = LevelingService::new(ctx.db).rank(guild_id, user_id).await?;
            let next_level_xp = xp_for_level(card.progress.level + 1);
            Reply::embed(
                EmbedSpec::new()
                    .title("📊 Rank")
                    .description(format!("<@{}>", user_id))
                    .field("Level", card.progress.level.to_string(), true)
                    .field("XP", format!("{} / {}", card.member.xp, next_level_xp), true)
                    .field("Rank", format!("#{}", card.rank), true)
                    .field(
                        "Progress",
                        format!(
                            "{} {}%",
                            card.progress.bar(RANK_BAR_WIDTH),
                            card.progress.percent()
                        ),
                        false,
                    )
                    .color(color::INFO),
                false,
            )
        }
        Command::Levels => {
            let members = LevelingService::new(ctx.db)
                .leaderboard(guild_id, LEADERBOARD_SIZE)
                .await?;
            if members.is_empty() {
                Reply::private("No leveling data yet!")
            } else {
                let lines = members
                    .iter()
                    .enumerate()
                    .map(|(index, member)| {
                        let place = match index {
                            0 => "🥇".to_string(),
                            1 => "🥈".to_string(),
                            2 => "🥉".to_string(),
                            n => format!("**{}.**", n + 1),
                        };
                        format!(
                            "{} <@{}> - Level {} ({} XP)",
                            place,
                            member.user_id,
                            member.level(),
                            member.xp
                        )
                    })
                    .collect::<Vec<_>>();
                Reply::embed(
                    EmbedSpec::new()
                        .title("🏆 XP Leaderboard")
                        .description(lines.join("\n"))
                        .color(color::GIVEAWAY),
                    false,
                )
            }
        }
        Command::SetLevel { user_id, level } => {
            let leveling = LevelingService::new(ctx.db);
            let change = leveling
                .adjust(guild_id, user_id, XpAdjustment::SetLevel(level), Utc::now())
                .await?;
            leveling
                .sync_level_roles(ctx.platform, guild_id, user_id, change.new_level())
                .await?;
            Reply::public(format!(
                "Set <@{}> to level {} ({} XP).",
                user_id,
                change.new_level(),
                change.member.xp
            ))
        }
        Command::AddXp { user_id, amount } => {
            let leveling = LevelingService::new(ctx.db);
            let change = leveling
                .adjust(guild_id, user_id, XpAdjustment::Add(amount), Utc::now())
                .await?;
            if change.level_changed() {
                leveling
                    .sync_level_roles(ctx.platform, guild_id, user_id, change.new_level())
                    .await?;
            }
            let mut text = if amount >= 0 {
                format!("Gave {} XP to <@{}>.", amount, user_id)
            } else {
                format!("Removed {} XP from <@{}>.", amount.unsigned_abs(), user_id)
            };
            if change.leveled_up() {
                text.push_str(&format!(" They leveled up to level {}!", change.new_level()));
            }
            Reply::public(text)
        }
        Command::LevelRole { level, role_id } => {
            LevelingService::new(ctx.db)
                .set_level_role(guild_id, level, role_id)
                .await?;
            Reply::private(format!(
                "Members reaching level {} will receive <@&{}>.",
                level, role_id
            ))
        }
        Command::RemoveLevelRole { level } => {
            LevelingService::new(ctx.db)
                .remove_level_role(guild_id, level)
                .await?;
            Reply::private(format!("Level {} no longer grants a role.", level))
        }
        Command::LevelingSetup { milestones } => {
            let milestones = match milestones {
                Some(input) => parse_milestones(&input)?,
                None => DEFAULT_MILESTONES.to_vec(),
            };
            let bound = LevelingService::new(ctx.db)
                .setup(ctx.platform, guild_id, milestones)
                .await?;
            if bound.is_empty() {
                Reply::private(
                    "No level roles could be created. Check that I have the Manage Roles permission.",
                )
            } else {
                let lines = bound
                    .iter()
                    .map(|r| format!("Level {}: <@&{}>", r.level, r.role_id))
                    .collect::<Vec<_>>();
                Reply::embed(
                    EmbedSpec::new()
                        .title("Level roles set up")
                        .description(lines.join("\n"))
                        .color(color::SUCCESS),
                    true,
                )
            }
        }
        Command::LevelingConfig {
            enabled,
            channel_id,
            xp_min,
            xp_max,
        } => {
            let leveling = LevelingService::new(ctx.db);
            let mut settings = leveling.get_config(guild_id).await?;
            settings.enabled = enabled;
            settings.level_up_channel_id = channel_id;
            settings.xp_min = xp_min.unwrap_or(settings.xp_min);
            settings.xp_max = xp_max.unwrap_or(settings.xp_max);
            let settings = leveling.save_config(settings).await?;

            let announce = match settings.level_up_channel_id {
                Some(channel_id) => format!("<#{}>", channel_id),
                None => "the member's channel".to_string(),
            };
            Reply::private(format!(
                "Leveling {}. Messages earn {} to {} XP; level-ups are announced in {}.",
                if settings.enabled { "enabled" } else { "disabled" },
                settings.xp_min,
                settings.xp_max,
                announce
            ))
        }
    };

    Ok(reply)
}

/// Executes a button press. Returns `None` for buttons this bot does not own.
pub async fn run_component(
    ctx: HandlerContext<'_>,
    guild_id: u64,
    invocation: &ComponentInvocation,
) -> Result<Option<Reply>, AppError> {
    if invocation.custom_id != VERIFY_BUTTON_ID {
        return Ok(None);
    }

    let outcome = VerificationService::new(ctx.db)
        .accept(ctx.platform, guild_id, invocation.actor.id)
        .await?;

    Ok(Some(match outcome {
        VerifyOutcome::Verified => Reply::private("✅ You are now verified. Welcome!"),
        VerifyOutcome::AlreadyVerified => Reply::private("You are already verified."),
    }))
}

async fn apply(
    ctx: HandlerContext<'_>,
    guild_id: u64,
    setting: GuildSetting,
) -> Result<GuildConfig, AppError> {
    GuildConfigService::new(ctx.db).apply(guild_id, setting).await
}

