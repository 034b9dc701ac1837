use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use tower_sessions::Session;

use crate::{
    model::{
        api::ErrorDto,
        custom_command::{CreateCustomCommandDto, CustomCommandDto, UpdateCustomCommandDto},
    },
    server::{
        controller::GUILD_TAG,
        error::AppError,
        middleware::auth::{AuthGuard, Permission},
        model::custom_command::{
            CreateCustomCommandParams, CustomCommand, UpdateCustomCommandParams,
        },
        service::custom_command::CustomCommandService,
        state::AppState,
    },
};

/// List a guild's custom commands.
#[utoipa::path(
    get,
    path = "/api/guilds/{guild_id}/commands",
    tag = GUILD_TAG,
    params(
        ("guild_id" = u64, Path, description = "Discord guild ID")
    ),
    responses(
        (status = 200, description = "Custom commands ordered by name", body = Vec<CustomCommandDto>),
        (status = 401, description = "Not logged in or session expired", body = ErrorDto),
        (status = 403, description = "Operator cannot manage this guild", body = ErrorDto),
        (status = 500, description = "Internal server error", body = ErrorDto)
    ),
)]
pub async fn get_custom_commands(
    State(state): State<AppState>,
    session: Session,
    Path(guild_id): Path<u64>,
) -> Result<impl IntoResponse, AppError> {
    let _ = AuthGuard::new(&state.db, &session)
        .require(&[Permission::ManageGuild(guild_id)])
        .await?;

    let commands = CustomCommandService::new(&state.db).list(guild_id).await?;
    let dtos: Vec<CustomCommandDto> = commands.into_iter().map(CustomCommand::into_dto).collect();

    Ok((StatusCode::OK, Json(dtos)))
}

/// Create a custom command.
///
/// The name is normalised the way the bot's `/command add` does it, and the logged-in
/// operator is recorded as the author.
///
/// # Returns
/// - `201 Created` - Stored command
/// - `400 Bad Request` - Bad name or empty response
/// - `409 Conflict` - A command with that name already exists
#[utoipa::path(
    post,
    path = "/api/guilds/{guild_id}/commands",
    tag = GUILD_TAG,
    params(
        ("guild_id" = u64, Path, description = "Discord guild ID")
    ),
    request_body = CreateCustomCommandDto,
    responses(
        (status = 201, description = "Created command", body = CustomCommandDto),
        (status = 400, description = "Invalid name or response", body = ErrorDto),
        (status = 401, description = "Not logged in or session expired", body = ErrorDto),
        (status = 403, description = "Operator cannot manage this guild", body = ErrorDto),
        (status = 409, description = "Command already exists", body = ErrorDto),
        (status = 500, description = "Internal server error", body = ErrorDto)
    ),
)]
pub async fn create_custom_command(
    State(state): State<AppState>,
    session: Session,
    Path(guild_id): Path<u64>,
    Json(payload): Json<CreateCustomCommandDto>,
) -> Result<impl IntoResponse, AppError> {
    let operator = AuthGuard::new(&state.db, &session)
        .require(&[Permission::ManageGuild(guild_id)])
        .await?;

    let params = CreateCustomCommandParams {
        guild_id,
        name: payload.name,
        response: payload.response,
        embed: payload.embed,
        created_by: operator.discord_id,
    };
    let command = CustomCommandService::new(&state.db).create(params).await?;

    Ok((StatusCode::CREATED, Json(command.into_dto())))
}

#[utoipa::path(
    get,
    path = "/api/guilds/{guild_id}/commands/{name}",
    tag = GUILD_TAG,
    params(
        ("guild_id" = u64, Path, description = "Discord guild ID"),
        ("name" = String, Path, description = "Command name")
    ),
    responses(
        (status = 200, description = "Custom command", body = CustomCommandDto),
        (status = 401, description = "Not logged in or session expired", body = ErrorDto),
        (status = 403, description = "Operator cannot manage this guild", body = ErrorDto),
        (status = 404, description = "No command with that name", body = ErrorDto),
        (status = 500, description = "Internal server error", body = ErrorDto)
    ),
)]
pub async fn get_custom_command(
    State(state): State<AppState>,
    session: Session,
    Path((guild_id, name)): Path<(u64, String)>,
) -> Result<impl IntoResponse, AppError> {
    let _ = AuthGuard::new(&state.db, &session)
        .require(&[Permission::ManageGuild(guild_id)])
        .await?;

    let command = CustomCommandService::new(&state.db)
        .get(guild_id, &name)
        .await?;

    Ok((StatusCode::OK, Json(command.into_dto())))
}

/// Change a command's response and/or embed flag.
#[utoipa::path(
    put,
    path = "/api/guilds/{guild_id}/commands/{name}",
    tag = GUILD_TAG,
    params(
        ("guild_id" = u64, Path, description = "Discord guild ID"),
        ("name" = String, Path, description = "Command name")
    ),
    request_body = UpdateCustomCommandDto,
    responses(
        (status = 200, description = "Updated command", body = CustomCommandDto),
        (status = 400, description = "Nothing to change or empty response", body = ErrorDto),
        (status = 401, description = "Not logged in or session expired", body = ErrorDto),
        (status = 403, description = "Operator cannot manage this guild", body = ErrorDto),
        (status = 404, description = "No command with that name", body = ErrorDto),
        (status = 500, description = "Internal server error", body = ErrorDto)
    ),
)]
pub async fn update_custom_command(
    State(state): State<AppState>,
    session: Session,
    Path((guild_id, name)): Path<(u64, String)>,
    Json(payload): Json<UpdateCustomCommandDto>,
) -> Result<impl IntoResponse, AppError> {
    let _ = AuthGuard::new(&state.db, &session)
        .require(&[Permission::ManageGuild(guild_id)])
        .await?;

    let params = UpdateCustomCommandParams {
        guild_id,
        name,
        response: payload.response,
        embed: payload.embed,
    };
    let command = CustomCommandService::new(&state.db).update(params).await?;

    Ok((StatusCode::OK, Json(command.into_dto())))
}

#[utoipa::path(
    delete,
    path = "/api/guilds/{guild_id}/commands/{name}",
    tag = GUILD_TAG,
    params(
        ("guild_id" = u64, Path, description = "Discord guild ID"),
        ("name" = String, Path, description = "Command name")
    ),
    responses(
        (status = 204, description = "Command deleted"),
        (status = 401, description = "Not logged in or session expired", body = ErrorDto),
        (status = 403, description = "Operator cannot manage this guild", body = ErrorDto),
        (status = 404, description = "No command with that name", body = ErrorDto),
        (status = 500, description = "Internal server error", body = ErrorDto)
    ),
)]
pub async fn delete_custom_command(
    State(state): State<AppState>,
    session: Session,
    Path((guild_id, name)): Path<(u64, String)>,
) -> Result<impl IntoResponse, AppError> {
    let _ = AuthGuard::new(&state.db, &session)
        .require(&[Permission::ManageGuild(guild_id)])
        .await?;

    CustomCommandService::new(&state.db)
        .delete(guild_id, &name)
        .await?;

    Ok(StatusCode::NO_CONTENT)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::server::{controller::test_state::app_state, middleware::session::AuthSession};
    use test_utils::{builder::TestBuilder, factory};

    /// Tests that a command created from the dashboard records the operator as author and
    /// is stored under its normalised name.
    ///
    /// Expected: Ok, command "hello" created by the operator
    #[tokio::test]
    async fn creates_command_as_operator() -> Result<(), AppError> {
        let mut test = TestBuilder::new()
            .with_table(entity::prelude::CustomCommand)
            .with_operator_tables()
            .build()
            .await
            .unwrap();
        let (db, session) = test.db_and_session().await.unwrap();

        let operator = factory::operator::create_operator_with_guild(db, "100", 0x20).await?;
        let operator_id: u64 = operator.discord_id.parse().unwrap();
        AuthSession::new(session).set_operator_id(operator_id).await?;

        let result = create_custom_command(
            State(app_state(db)),
            session.clone(),
            Path(100),
            Json(CreateCustomCommandDto {
                name: "Hello".to_string(),
                response: "Hi {user}!".to_string(),
                embed: false,
            }),
        )
        .await;

        assert!(result.is_ok());
        let command = CustomCommandService::new(db).get(100, "hello").await?;
        assert_eq!(command.created_by, operator_id);
        assert_eq!(command.response, "Hi {user}!");

        Ok(())
    }

    /// Tests that deleting a missing command reports not found.
    ///
    /// Expected: Err(AppError::NotFound)
    #[tokio::test]
    async fn delete_missing_command_is_not_found() -> Result<(), AppError> {
        let mut test = TestBuilder::new()
            .with_table(entity::prelude::CustomCommand)
            .with_operator_tables()
            .build()
            .await
            .unwrap();
        let (db, session) = test.db_and_session().await.unwrap();

        let operator = factory::operator::create_operator_with_guild(db, "100", 0x20).await?;
        AuthSession::new(session)
            .set_operator_id(operator.discord_id.parse().unwrap())
            .await?;

        let result = delete_custom_command(
            State(app_state(db)),
            session.clone(),
            Path((100, "missing".to_string())),
        )
        .await;

        assert!(matches!(result, Err(AppError::NotFound(_))));

        Ok(())
    }
}
