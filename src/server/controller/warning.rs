use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde::Deserialize;
use tower_sessions::Session;

use crate::{
    model::{
        api::ErrorDto,
        warning::{ClearedWarningsDto, PaginatedWarningsDto},
    },
    server::{
        controller::{PaginationParams, GUILD_TAG},
        error::AppError,
        middleware::auth::{AuthGuard, Permission},
        service::moderation::ModerationService,
        state::AppState,
    },
};

#[derive(Deserialize)]
pub struct WarningQuery {
    /// Only list warnings for this member.
    pub user_id: Option<u64>,
    #[serde(default)]
    pub page: u64,
    #[serde(default = "default_entries")]
    pub entries: u64,
}

fn default_entries() -> u64 {
    10
}

/// List a guild's warnings, newest first.
#[utoipa::path(
    get,
    path = "/api/guilds/{guild_id}/warnings",
    tag = GUILD_TAG,
    params(
        ("guild_id" = u64, Path, description = "Discord guild ID"),
        ("user_id" = Option<u64>, Query, description = "Only this member's warnings"),
        ("page" = Option<u64>, Query, description = "Page number (default: 0)"),
        ("entries" = Option<u64>, Query, description = "Items per page (default: 10)")
    ),
    responses(
        (status = 200, description = "Page of warnings", body = PaginatedWarningsDto),
        (status = 401, description = "Not logged in or session expired", body = ErrorDto),
        (status = 403, description = "Operator cannot manage this guild", body = ErrorDto),
        (status = 500, description = "Internal server error", body = ErrorDto)
    ),
)]
pub async fn get_warnings(
    State(state): State<AppState>,
    session: Session,
    Path(guild_id): Path<u64>,
    Query(query): Query<WarningQuery>,
) -> Result<impl IntoResponse, AppError> {
    let _ = AuthGuard::new(&state.db, &session)
        .require(&[Permission::ManageGuild(guild_id)])
        .await?;

    let pagination = PaginationParams {
        page: query.page,
        entries: query.entries,
    };
    let warnings = ModerationService::new(&state.db)
        .get_paginated(
            guild_id,
            query.user_id,
            pagination.page,
            pagination.per_page(),
        )
        .await?;

    Ok((StatusCode::OK, Json(warnings)))
}

/// Clear every warning a member has in the guild.
///
/// Clearing a member without warnings succeeds with `cleared: 0`.
#[utoipa::path(
    delete,
    path = "/api/guilds/{guild_id}/warnings/{user_id}",
    tag = GUILD_TAG,
    params(
        ("guild_id" = u64, Path, description = "Discord guild ID"),
        ("user_id" = u64, Path, description = "Member whose warnings are cleared")
    ),
    responses(
        (status = 200, description = "Number of warnings removed", body = ClearedWarningsDto),
        (status = 401, description = "Not logged in or session expired", body = ErrorDto),
        (status = 403, description = "Operator cannot manage this guild", body = ErrorDto),
        (status = 500, description = "Internal server error", body = ErrorDto)
    ),
)]
pub async fn clear_warnings(
    State(state): State<AppState>,
    session: Session,
    Path((guild_id, user_id)): Path<(u64, u64)>,
) -> Result<impl IntoResponse, AppError> {
    let _ = AuthGuard::new(&state.db, &session)
        .require(&[Permission::ManageGuild(guild_id)])
        .await?;

    let cleared = ModerationService::new(&state.db)
        .clear_warnings(guild_id, user_id)
        .await?;

    Ok((StatusCode::OK, Json(ClearedWarningsDto { cleared })))
}
