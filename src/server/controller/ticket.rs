use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use tower_sessions::Session;

use crate::{
    model::{
        api::ErrorDto,
        ticket::{PaginatedTicketsDto, TicketConfigDto},
    },
    server::{
        controller::{PaginationParams, GUILD_TAG},
        error::AppError,
        middleware::auth::{AuthGuard, Permission},
        model::ticket::TicketConfig,
        service::ticket::TicketService,
        state::AppState,
    },
};

#[utoipa::path(
    get,
    path = "/api/guilds/{guild_id}/tickets/config",
    tag = GUILD_TAG,
    params(
        ("guild_id" = u64, Path, description = "Discord guild ID")
    ),
    responses(
        (status = 200, description = "Ticket settings", body = TicketConfigDto),
        (status = 401, description = "Not logged in or session expired", body = ErrorDto),
        (status = 403, description = "Operator cannot manage this guild", body = ErrorDto),
        (status = 404, description = "Tickets are not configured", body = ErrorDto),
        (status = 500, description = "Internal server error", body = ErrorDto)
    ),
)]
pub async fn get_ticket_config(
    State(state): State<AppState>,
    session: Session,
    Path(guild_id): Path<u64>,
) -> Result<impl IntoResponse, AppError> {
    let _ = AuthGuard::new(&state.db, &session)
        .require(&[Permission::ManageGuild(guild_id)])
        .await?;

    let config = TicketService::new(&state.db)
        .config(guild_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Tickets are not set up in this server.".to_string()))?;

    Ok((StatusCode::OK, Json(config.into_dto())))
}

#[utoipa::path(
    put,
    path = "/api/guilds/{guild_id}/tickets/config",
    tag = GUILD_TAG,
    params(
        ("guild_id" = u64, Path, description = "Discord guild ID")
    ),
    request_body = TicketConfigDto,
    responses(
        (status = 200, description = "Stored settings", body = TicketConfigDto),
        (status = 401, description = "Not logged in or session expired", body = ErrorDto),
        (status = 403, description = "Operator cannot manage this guild", body = ErrorDto),
        (status = 500, description = "Internal server error", body = ErrorDto)
    ),
)]
pub async fn update_ticket_config(
    State(state): State<AppState>,
    session: Session,
    Path(guild_id): Path<u64>,
    Json(payload): Json<TicketConfigDto>,
) -> Result<impl IntoResponse, AppError> {
    let _ = AuthGuard::new(&state.db, &session)
        .require(&[Permission::ManageGuild(guild_id)])
        .await?;

    let config = TicketService::new(&state.db)
        .configure(TicketConfig::from_dto(guild_id, payload))
        .await?;

    Ok((StatusCode::OK, Json(config.into_dto())))
}

/// List a guild's tickets, newest first.
#[utoipa::path(
    get,
    path = "/api/guilds/{guild_id}/tickets",
    tag = GUILD_TAG,
    params(
        ("guild_id" = u64, Path, description = "Discord guild ID"),
        ("page" = Option<u64>, Query, description = "Page number (default: 0)"),
        ("entries" = Option<u64>, Query, description = "Items per page (default: 10)")
    ),
    responses(
        (status = 200, description = "Page of tickets", body = PaginatedTicketsDto),
        (status = 401, description = "Not logged in or session expired", body = ErrorDto),
        (status = 403, description = "Operator cannot manage this guild", body = ErrorDto),
        (status = 500, description = "Internal server error", body = ErrorDto)
    ),
)]
pub async fn get_tickets(
    State(state): State<AppState>,
    session: Session,
    Path(guild_id): Path<u64>,
    Query(params): Query<PaginationParams>,
) -> Result<impl IntoResponse, AppError> {
    let _ = AuthGuard::new(&state.db, &session)
        .require(&[Permission::ManageGuild(guild_id)])
        .await?;

    let tickets = TicketService::new(&state.db)
        .get_paginated(guild_id, params.page, params.per_page())
        .await?;

    Ok((StatusCode::OK, Json(tickets)))
}
