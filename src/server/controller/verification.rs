use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use tower_sessions::Session;

use crate::{
    model::{api::ErrorDto, verification::VerificationConfigDto},
    server::{
        controller::GUILD_TAG,
        error::AppError,
        middleware::auth::{AuthGuard, Permission},
        model::verification::VerificationConfig,
        service::verification::VerificationService,
        state::AppState,
    },
};

#[utoipa::path(
    get,
    path = "/api/guilds/{guild_id}/verification",
    tag = GUILD_TAG,
    params(
        ("guild_id" = u64, Path, description = "Discord guild ID")
    ),
    responses(
        (status = 200, description = "Verification settings", body = VerificationConfigDto),
        (status = 401, description = "Not logged in or session expired", body = ErrorDto),
        (status = 403, description = "Operator cannot manage this guild", body = ErrorDto),
        (status = 404, description = "Verification is not configured", body = ErrorDto),
        (status = 500, description = "Internal server error", body = ErrorDto)
    ),
)]
pub async fn get_verification(
    State(state): State<AppState>,
    session: Session,
    Path(guild_id): Path<u64>,
) -> Result<impl IntoResponse, AppError> {
    let _ = AuthGuard::new(&state.db, &session)
        .require(&[Permission::ManageGuild(guild_id)])
        .await?;

    let config = VerificationService::new(&state.db)
        .get(guild_id)
        .await?
        .ok_or_else(|| {
            AppError::NotFound("Verification is not set up in this server.".to_string())
        })?;

    Ok((StatusCode::OK, Json(config.into_dto())))
}

/// Store verification settings.
///
/// Only the settings are saved. The panel message is posted by running `/verify setup` in
/// Discord, so an existing panel keeps working with the new roles.
#[utoipa::path(
    put,
    path = "/api/guilds/{guild_id}/verification",
    tag = GUILD_TAG,
    params(
        ("guild_id" = u64, Path, description = "Discord guild ID")
    ),
    request_body = VerificationConfigDto,
    responses(
        (status = 200, description = "Stored settings", body = VerificationConfigDto),
        (status = 400, description = "Title or message out of range", body = ErrorDto),
        (status = 401, description = "Not logged in or session expired", body = ErrorDto),
        (status = 403, description = "Operator cannot manage this guild", body = ErrorDto),
        (status = 500, description = "Internal server error", body = ErrorDto)
    ),
)]
pub async fn update_verification(
    State(state): State<AppState>,
    session: Session,
    Path(guild_id): Path<u64>,
    Json(payload): Json<VerificationConfigDto>,
) -> Result<impl IntoResponse, AppError> {
    let _ = AuthGuard::new(&state.db, &session)
        .require(&[Permission::ManageGuild(guild_id)])
        .await?;

    let config = VerificationService::new(&state.db)
        .save(VerificationConfig::from_dto(guild_id, payload))
        .await?;

    Ok((StatusCode::OK, Json(config.into_dto())))
}
