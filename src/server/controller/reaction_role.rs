use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use tower_sessions::Session;

use crate::{
    model::{api::ErrorDto, reaction_role::ReactionRoleDto},
    server::{
        controller::GUILD_TAG,
        error::AppError,
        middleware::auth::{AuthGuard, Permission},
        model::reaction_role::ReactionRoleBinding,
        service::reaction_role::ReactionRoleService,
        state::AppState,
    },
};

/// List a guild's reaction-role bindings.
#[utoipa::path(
    get,
    path = "/api/guilds/{guild_id}/reaction-roles",
    tag = GUILD_TAG,
    params(
        ("guild_id" = u64, Path, description = "Discord guild ID")
    ),
    responses(
        (status = 200, description = "Bindings", body = Vec<ReactionRoleDto>),
        (status = 401, description = "Not logged in or session expired", body = ErrorDto),
        (status = 403, description = "Operator cannot manage this guild", body = ErrorDto),
        (status = 500, description = "Internal server error", body = ErrorDto)
    ),
)]
pub async fn get_reaction_roles(
    State(state): State<AppState>,
    session: Session,
    Path(guild_id): Path<u64>,
) -> Result<impl IntoResponse, AppError> {
    let _ = AuthGuard::new(&state.db, &session)
        .require(&[Permission::ManageGuild(guild_id)])
        .await?;

    let bindings = ReactionRoleService::new(&state.db).list(guild_id).await?;
    let dtos: Vec<ReactionRoleDto> = bindings
        .into_iter()
        .map(ReactionRoleBinding::into_dto)
        .collect();

    Ok((StatusCode::OK, Json(dtos)))
}

/// Remove a binding.
///
/// The emoji path segment is percent-decoded by the router; unicode emoji match with or
/// without a trailing variation selector.
#[utoipa::path(
    delete,
    path = "/api/guilds/{guild_id}/reaction-roles/{message_id}/{emoji}",
    tag = GUILD_TAG,
    params(
        ("guild_id" = u64, Path, description = "Discord guild ID"),
        ("message_id" = u64, Path, description = "Message the binding is on"),
        ("emoji" = String, Path, description = "Unicode emoji, custom emoji id or <:name:id>")
    ),
    responses(
        (status = 204, description = "Binding removed"),
        (status = 401, description = "Not logged in or session expired", body = ErrorDto),
        (status = 403, description = "Operator cannot manage this guild", body = ErrorDto),
        (status = 404, description = "No such binding", body = ErrorDto),
        (status = 500, description = "Internal server error", body = ErrorDto)
    ),
)]
pub async fn delete_reaction_role(
    State(state): State<AppState>,
    session: Session,
    Path((guild_id, message_id, emoji)): Path<(u64, u64, String)>,
) -> Result<impl IntoResponse, AppError> {
    let _ = AuthGuard::new(&state.db, &session)
        .require(&[Permission::ManageGuild(guild_id)])
        .await?;

    ReactionRoleService::new(&state.db)
        .remove(guild_id, message_id, &emoji)
        .await?;

    Ok(StatusCode::NO_CONTENT)
}
