use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use chrono::Utc;
use tower_sessions::Session;

use crate::{
    model::{
        api::ErrorDto,
        leveling::{
            LevelRoleDto, LevelingConfigDto, LevelingSetupDto, LevelingSetupRequestDto,
            MemberXpActionDto, MemberXpDto, PaginatedLeaderboardDto, SetLevelRoleDto,
        },
    },
    server::{
        controller::{PaginationParams, GUILD_TAG},
        error::AppError,
        middleware::auth::{AuthGuard, Permission},
        model::leveling::{LevelRole, LevelingConfig, XpAdjustment, DEFAULT_MILESTONES},
        service::leveling::LevelingService,
        state::AppState,
    },
};

/// Leveling settings; defaults when the guild never changed them.
#[utoipa::path(
    get,
    path = "/api/guilds/{guild_id}/leveling/config",
    tag = GUILD_TAG,
    params(
        ("guild_id" = u64, Path, description = "Discord guild ID")
    ),
    responses(
        (status = 200, description = "Leveling settings", body = LevelingConfigDto),
        (status = 401, description = "Not logged in or session expired", body = ErrorDto),
        (status = 403, description = "Operator cannot manage this guild", body = ErrorDto),
        (status = 500, description = "Internal server error", body = ErrorDto)
    ),
)]
pub async fn get_leveling_config(
    State(state): State<AppState>,
    session: Session,
    Path(guild_id): Path<u64>,
) -> Result<impl IntoResponse, AppError> {
    let _ = AuthGuard::new(&state.db, &session)
        .require(&[Permission::ManageGuild(guild_id)])
        .await?;

    let config = LevelingService::new(&state.db).get_config(guild_id).await?;

    Ok((StatusCode::OK, Json(config.into_dto())))
}

#[utoipa::path(
    put,
    path = "/api/guilds/{guild_id}/leveling/config",
    tag = GUILD_TAG,
    params(
        ("guild_id" = u64, Path, description = "Discord guild ID")
    ),
    request_body = LevelingConfigDto,
    responses(
        (status = 200, description = "Stored settings", body = LevelingConfigDto),
        (status = 400, description = "XP range invalid", body = ErrorDto),
        (status = 401, description = "Not logged in or session expired", body = ErrorDto),
        (status = 403, description = "Operator cannot manage this guild", body = ErrorDto),
        (status = 500, description = "Internal server error", body = ErrorDto)
    ),
)]
pub async fn update_leveling_config(
    State(state): State<AppState>,
    session: Session,
    Path(guild_id): Path<u64>,
    Json(payload): Json<LevelingConfigDto>,
) -> Result<impl IntoResponse, AppError> {
    let _ = AuthGuard::new(&state.db, &session)
        .require(&[Permission::ManageGuild(guild_id)])
        .await?;

    let config = LevelingService::new(&state.db)
        .save_config(LevelingConfig::from_dto(guild_id, payload))
        .await?;

    Ok((StatusCode::OK, Json(config.into_dto())))
}

/// Members ranked by XP, highest first.
#[utoipa::path(
    get,
    path = "/api/guilds/{guild_id}/leveling/leaderboard",
    tag = GUILD_TAG,
    params(
        ("guild_id" = u64, Path, description = "Discord guild ID"),
        ("page" = Option<u64>, Query, description = "Page number (default: 0)"),
        ("entries" = Option<u64>, Query, description = "Items per page (default: 10)")
    ),
    responses(
        (status = 200, description = "Page of ranked members", body = PaginatedLeaderboardDto),
        (status = 401, description = "Not logged in or session expired", body = ErrorDto),
        (status = 403, description = "Operator cannot manage this guild", body = ErrorDto),
        (status = 500, description = "Internal server error", body = ErrorDto)
    ),
)]
pub async fn get_leaderboard(
    State(state): State<AppState>,
    session: Session,
    Path(guild_id): Path<u64>,
    Query(params): Query<PaginationParams>,
) -> Result<impl IntoResponse, AppError> {
    let _ = AuthGuard::new(&state.db, &session)
        .require(&[Permission::ManageGuild(guild_id)])
        .await?;

    let leaderboard = LevelingService::new(&state.db)
        .get_paginated(guild_id, params.page, params.per_page())
        .await?;

    Ok((StatusCode::OK, Json(leaderboard)))
}

/// Add XP to or set the level of a member.
///
/// Only XP is stored. Level roles are brought in line the next time the member's level
/// changes through the bot.
#[utoipa::path(
    post,
    path = "/api/guilds/{guild_id}/leveling/members/{user_id}",
    tag = GUILD_TAG,
    params(
        ("guild_id" = u64, Path, description = "Discord guild ID"),
        ("user_id" = u64, Path, description = "Member whose XP changes")
    ),
    request_body = MemberXpActionDto,
    responses(
        (status = 200, description = "Member's XP after the change", body = MemberXpDto),
        (status = 400, description = "Amount or level out of range", body = ErrorDto),
        (status = 401, description = "Not logged in or session expired", body = ErrorDto),
        (status = 403, description = "Operator cannot manage this guild", body = ErrorDto),
        (status = 500, description = "Internal server error", body = ErrorDto)
    ),
)]
pub async fn update_member_xp(
    State(state): State<AppState>,
    session: Session,
    Path((guild_id, user_id)): Path<(u64, u64)>,
    Json(payload): Json<MemberXpActionDto>,
) -> Result<impl IntoResponse, AppError> {
    let _ = AuthGuard::new(&state.db, &session)
        .require(&[Permission::ManageGuild(guild_id)])
        .await?;

    let adjustment = match payload {
        MemberXpActionDto::AddXp { amount } => XpAdjustment::Add(amount),
        MemberXpActionDto::SetLevel { level } => XpAdjustment::SetLevel(level),
    };
    let change = LevelingService::new(&state.db)
        .adjust(guild_id, user_id, adjustment, Utc::now())
        .await?;

    Ok((StatusCode::OK, Json(change.member.into_dto())))
}

#[utoipa::path(
    get,
    path = "/api/guilds/{guild_id}/level-roles",
    tag = GUILD_TAG,
    params(
        ("guild_id" = u64, Path, description = "Discord guild ID")
    ),
    responses(
        (status = 200, description = "Level roles, lowest level first", body = Vec<LevelRoleDto>),
        (status = 401, description = "Not logged in or session expired", body = ErrorDto),
        (status = 403, description = "Operator cannot manage this guild", body = ErrorDto),
        (status = 500, description = "Internal server error", body = ErrorDto)
    ),
)]
pub async fn get_level_roles(
    State(state): State<AppState>,
    session: Session,
    Path(guild_id): Path<u64>,
) -> Result<impl IntoResponse, AppError> {
    let _ = AuthGuard::new(&state.db, &session)
        .require(&[Permission::ManageGuild(guild_id)])
        .await?;

    let roles = LevelingService::new(&state.db)
        .level_roles(guild_id)
        .await?
        .into_iter()
        .map(LevelRole::into_dto)
        .collect::<Vec<_>>();

    Ok((StatusCode::OK, Json(roles)))
}

/// Bind a role to a level, replacing the role bound before.
#[utoipa::path(
    put,
    path = "/api/guilds/{guild_id}/level-roles/{level}",
    tag = GUILD_TAG,
    params(
        ("guild_id" = u64, Path, description = "Discord guild ID"),
        ("level" = u32, Path, description = "Level that grants the role")
    ),
    request_body = SetLevelRoleDto,
    responses(
        (status = 200, description = "Stored binding", body = LevelRoleDto),
        (status = 400, description = "Level out of range", body = ErrorDto),
        (status = 401, description = "Not logged in or session expired", body = ErrorDto),
        (status = 403, description = "Operator cannot manage this guild", body = ErrorDto),
        (status = 500, description = "Internal server error", body = ErrorDto)
    ),
)]
pub async fn set_level_role(
    State(state): State<AppState>,
    session: Session,
    Path((guild_id, level)): Path<(u64, u32)>,
    Json(payload): Json<SetLevelRoleDto>,
) -> Result<impl IntoResponse, AppError> {
    let _ = AuthGuard::new(&state.db, &session)
        .require(&[Permission::ManageGuild(guild_id)])
        .await?;

    let role = LevelingService::new(&state.db)
        .set_level_role(guild_id, level, payload.role_id)
        .await?;

    Ok((StatusCode::OK, Json(role.into_dto())))
}

#[utoipa::path(
    delete,
    path = "/api/guilds/{guild_id}/level-roles/{level}",
    tag = GUILD_TAG,
    params(
        ("guild_id" = u64, Path, description = "Discord guild ID"),
        ("level" = u32, Path, description = "Level whose role is removed")
    ),
    responses(
        (status = 204, description = "Binding removed"),
        (status = 401, description = "Not logged in or session expired", body = ErrorDto),
        (status = 403, description = "Operator cannot manage this guild", body = ErrorDto),
        (status = 404, description = "No role bound to this level", body = ErrorDto),
        (status = 500, description = "Internal server error", body = ErrorDto)
    ),
)]
pub async fn delete_level_role(
    State(state): State<AppState>,
    session: Session,
    Path((guild_id, level)): Path<(u64, u32)>,
) -> Result<impl IntoResponse, AppError> {
    let _ = AuthGuard::new(&state.db, &session)
        .require(&[Permission::ManageGuild(guild_id)])
        .await?;

    LevelingService::new(&state.db)
        .remove_level_role(guild_id, level)
        .await?;

    Ok(StatusCode::NO_CONTENT)
}

/// Queue creation of milestone roles.
///
/// The dashboard cannot create roles itself. The request is stored and the bot runs it
/// within a minute; a newer request replaces one that has not run yet.
#[utoipa::path(
    post,
    path = "/api/guilds/{guild_id}/leveling/setup",
    tag = GUILD_TAG,
    params(
        ("guild_id" = u64, Path, description = "Discord guild ID")
    ),
    request_body = LevelingSetupDto,
    responses(
        (status = 202, description = "Setup queued", body = LevelingSetupRequestDto),
        (status = 400, description = "Milestones empty or out of range", body = ErrorDto),
        (status = 401, description = "Not logged in or session expired", body = ErrorDto),
        (status = 403, description = "Operator cannot manage this guild", body = ErrorDto),
        (status = 500, description = "Internal server error", body = ErrorDto)
    ),
)]
pub async fn queue_leveling_setup(
    State(state): State<AppState>,
    session: Session,
    Path(guild_id): Path<u64>,
    Json(payload): Json<LevelingSetupDto>,
) -> Result<impl IntoResponse, AppError> {
    let operator = AuthGuard::new(&state.db, &session)
        .require(&[Permission::ManageGuild(guild_id)])
        .await?;

    let milestones = payload
        .milestones
        .unwrap_or_else(|| DEFAULT_MILESTONES.to_vec());
    let request = LevelingService::new(&state.db)
        .queue_setup(guild_id, milestones, operator.discord_id, Utc::now())
        .await?;

    tracing::info!(
        "Operator {} queued level role setup for guild {}",
        operator.discord_id,
        guild_id
    );

    Ok((StatusCode::ACCEPTED, Json(request.into_dto())))
}
