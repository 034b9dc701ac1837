use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use tower_sessions::Session;

use crate::{
    model::{api::ErrorDto, modmail::PaginatedModmailThreadsDto},
    server::{
        controller::{PaginationParams, GUILD_TAG},
        error::AppError,
        middleware::auth::{AuthGuard, Permission},
        service::modmail::ModmailService,
        state::AppState,
    },
};

/// List a guild's modmail threads, newest first.
///
/// Open and closed threads are both returned; the status field tells them apart.
#[utoipa::path(
    get,
    path = "/api/guilds/{guild_id}/modmail",
    tag = GUILD_TAG,
    params(
        ("guild_id" = u64, Path, description = "Discord guild ID"),
        ("page" = Option<u64>, Query, description = "Page number (default: 0)"),
        ("entries" = Option<u64>, Query, description = "Items per page (default: 10)")
    ),
    responses(
        (status = 200, description = "Page of threads", body = PaginatedModmailThreadsDto),
        (status = 401, description = "Not logged in or session expired", body = ErrorDto),
        (status = 403, description = "Operator cannot manage this guild", body = ErrorDto),
        (status = 500, description = "Internal server error", body = ErrorDto)
    ),
)]
pub async fn get_modmail_threads(
    State(state): State<AppState>,
    session: Session,
    Path(guild_id): Path<u64>,
    Query(params): Query<PaginationParams>,
) -> Result<impl IntoResponse, AppError> {
    let _ = AuthGuard::new(&state.db, &session)
        .require(&[Permission::ManageGuild(guild_id)])
        .await?;

    let threads = ModmailService::new(&state.db)
        .get_paginated(guild_id, params.page, params.per_page())
        .await?;

    Ok((StatusCode::OK, Json(threads)))
}
