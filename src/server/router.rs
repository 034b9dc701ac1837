use axum::{
    routing::{get, post},
    Json, Router,
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use utoipa::OpenApi;

use crate::{
    model::{
        api::ErrorDto,
        custom_command::{CreateCustomCommandDto, CustomCommandDto, UpdateCustomCommandDto},
        giveaway::{GiveawayDto, PaginatedGiveawaysDto},
        guild_config::{GuildConfigDto, UpdateGuildConfigDto},
        leveling::{
            LevelRoleDto, LevelingConfigDto, LevelingSetupDto, LevelingSetupRequestDto,
            MemberXpActionDto, MemberXpDto, PaginatedLeaderboardDto, SetLevelRoleDto,
        },
        modmail::{ModmailThreadDto, PaginatedModmailThreadsDto},
        operator::{ManagedGuildDto, OperatorDto},
        reaction_role::ReactionRoleDto,
        ticket::{PaginatedTicketsDto, TicketConfigDto, TicketDto},
        verification::VerificationConfigDto,
        warning::{ClearedWarningsDto, PaginatedWarningsDto, WarningDto},
    },
    server::{
        controller::{
            auth::{self, callback, get_user, login, logout, AUTH_TAG},
            custom_command::{
                self, create_custom_command, delete_custom_command, get_custom_command,
                get_custom_commands, update_custom_command,
            },
            giveaway::{self, get_giveaways},
            guild_config::{self, get_guild_config, update_guild_config},
            leveling::{
                self, delete_level_role, get_leaderboard, get_level_roles, get_leveling_config,
                queue_leveling_setup, set_level_role, update_leveling_config, update_member_xp,
            },
            modmail::{self, get_modmail_threads},
            reaction_role::{self, delete_reaction_role, get_reaction_roles},
            ticket::{self, get_ticket_config, get_tickets, update_ticket_config},
            verification::{self, get_verification, update_verification},
            warning::{self, clear_warnings, get_warnings},
            GUILD_TAG,
        },
        state::AppState,
    },
};

#[derive(OpenApi)]
#[openapi(
    paths(
        auth::login,
        auth::callback,
        auth::logout,
        auth::get_user,
        guild_config::get_guild_config,
        guild_config::update_guild_config,
        custom_command::get_custom_commands,
        custom_command::create_custom_command,
        custom_command::get_custom_command,
        custom_command::update_custom_command,
        custom_command::delete_custom_command,
        warning::get_warnings,
        warning::clear_warnings,
        reaction_role::get_reaction_roles,
        reaction_role::delete_reaction_role,
        modmail::get_modmail_threads,
        verification::get_verification,
        verification::update_verification,
        ticket::get_ticket_config,
        ticket::update_ticket_config,
        ticket::get_tickets,
        giveaway::get_giveaways,
        leveling::get_leveling_config,
        leveling::update_leveling_config,
        leveling::get_leaderboard,
        leveling::update_member_xp,
        leveling::get_level_roles,
        leveling::set_level_role,
        leveling::delete_level_role,
        leveling::queue_leveling_setup,
    ),
    components(schemas(
        ErrorDto,
        OperatorDto,
        ManagedGuildDto,
        GuildConfigDto,
        UpdateGuildConfigDto,
        CustomCommandDto,
        CreateCustomCommandDto,
        UpdateCustomCommandDto,
        WarningDto,
        PaginatedWarningsDto,
        ClearedWarningsDto,
        ReactionRoleDto,
        ModmailThreadDto,
        PaginatedModmailThreadsDto,
        VerificationConfigDto,
        TicketConfigDto,
        TicketDto,
        PaginatedTicketsDto,
        GiveawayDto,
        PaginatedGiveawaysDto,
        LevelingConfigDto,
        MemberXpDto,
        PaginatedLeaderboardDto,
        MemberXpActionDto,
        LevelRoleDto,
        SetLevelRoleDto,
        LevelingSetupDto,
        LevelingSetupRequestDto,
    )),
    tags(
        (name = AUTH_TAG, description = "Discord OAuth login and session"),
        (name = GUILD_TAG, description = "Per-guild settings and records"),
    )
)]
pub struct ApiDoc;

/// Builds the dashboard API. The session layer is added by the caller.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/openapi.json", get(|| async { Json(ApiDoc::openapi()) }))
        .route("/api/auth/login", get(login))
        .route("/api/auth/callback", get(callback))
        .route("/api/auth/logout", get(logout))
        .route("/api/auth/user", get(get_user))
        .route(
            "/api/guilds/{guild_id}/config",
            get(get_guild_config).put(update_guild_config),
        )
        .route(
            "/api/guilds/{guild_id}/commands",
            get(get_custom_commands).post(create_custom_command),
        )
        .route(
            "/api/guilds/{guild_id}/commands/{name}",
            get(get_custom_command)
                .put(update_custom_command)
                .delete(delete_custom_command),
        )
        .route("/api/guilds/{guild_id}/warnings", get(get_warnings))
        .route(
            "/api/guilds/{guild_id}/warnings/{user_id}",
            axum::routing::delete(clear_warnings),
        )
        .route(
            "/api/guilds/{guild_id}/reaction-roles",
            get(get_reaction_roles),
        )
        .route(
            "/api/guilds/{guild_id}/reaction-roles/{message_id}/{emoji}",
            axum::routing::delete(delete_reaction_role),
        )
        .route("/api/guilds/{guild_id}/modmail", get(get_modmail_threads))
        .route(
            "/api/guilds/{guild_id}/verification",
            get(get_verification).put(update_verification),
        )
        .route(
            "/api/guilds/{guild_id}/tickets/config",
            get(get_ticket_config).put(update_ticket_config),
        )
        .route("/api/guilds/{guild_id}/tickets", get(get_tickets))
        .route("/api/guilds/{guild_id}/giveaways", get(get_giveaways))
        .route(
            "/api/guilds/{guild_id}/leveling/config",
            get(get_leveling_config).put(update_leveling_config),
        )
        .route(
            "/api/guilds/{guild_id}/leveling/leaderboard",
            get(get_leaderboard),
        )
        .route(
            "/api/guilds/{guild_id}/leveling/members/{user_id}",
            post(update_member_xp),
        )
        .route(
            "/api/guilds/{guild_id}/leveling/setup",
            post(queue_leveling_setup),
        )
        .route("/api/guilds/{guild_id}/level-roles", get(get_level_roles))
        .route(
            "/api/guilds/{guild_id}/level-roles/{level}",
            axum::routing::put(set_level_role).delete(delete_level_role),
        )
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
}
