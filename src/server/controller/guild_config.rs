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
        guild_config::{GuildConfigDto, UpdateGuildConfigDto},
    },
    server::{
        controller::GUILD_TAG,
        error::AppError,
        middleware::auth::{AuthGuard, Permission},
        model::guild_config::UpdateGuildConfigParams,
        service::guild_config::GuildConfigService,
        state::AppState,
    },
};

/// Get a guild's configuration.
///
/// Creates the default configuration on first access, the same way the bot does when it
/// first sees a message from the guild.
///
/// # Access Control
/// - `ManageGuild` - Operator must be able to manage the guild
///
/// # Returns
/// - `200 OK` - Current configuration
/// - `401 Unauthorized` - Not logged in or session expired
/// - `403 Forbidden` - Operator cannot manage the guild
#[utoipa::path(
    get,
    path = "/api/guilds/{guild_id}/config",
    tag = GUILD_TAG,
    params(
        ("guild_id" = u64, Path, description = "Discord guild ID")
    ),
    responses(
        (status = 200, description = "Guild configuration", body = GuildConfigDto),
        (status = 401, description = "Not logged in or session expired", body = ErrorDto),
        (status = 403, description = "Operator cannot manage this guild", body = ErrorDto),
        (status = 500, description = "Internal server error", body = ErrorDto)
    ),
)]
pub async fn get_guild_config(
    State(state): State<AppState>,
    session: Session,
    Path(guild_id): Path<u64>,
) -> Result<impl IntoResponse, AppError> {
    let _ = AuthGuard::new(&state.db, &session)
        .require(&[Permission::ManageGuild(guild_id)])
        .await?;

    let config = GuildConfigService::new(&state.db).get(guild_id).await?;

    Ok((StatusCode::OK, Json(config.into_dto())))
}

/// Replace a guild's editable settings.
///
/// The prefix and messages go through the same validation as the bot's config commands.
///
/// # Access Control
/// - `ManageGuild` - Operator must be able to manage the guild
///
/// # Returns
/// - `200 OK` - Configuration after the update
/// - `400 Bad Request` - Prefix or message failed validation
/// - `401 Unauthorized` - Not logged in or session expired
/// - `403 Forbidden` - Operator cannot manage the guild
#[utoipa::path(
    put,
    path = "/api/guilds/{guild_id}/config",
    tag = GUILD_TAG,
    params(
        ("guild_id" = u64, Path, description = "Discord guild ID")
    ),
    request_body = UpdateGuildConfigDto,
    responses(
        (status = 200, description = "Updated configuration", body = GuildConfigDto),
        (status = 400, description = "Invalid setting", body = ErrorDto),
        (status = 401, description = "Not logged in or session expired", body = ErrorDto),
        (status = 403, description = "Operator cannot manage this guild", body = ErrorDto),
        (status = 500, description = "Internal server error", body = ErrorDto)
    ),
)]
pub async fn update_guild_config(
    State(state): State<AppState>,
    session: Session,
    Path(guild_id): Path<u64>,
    Json(payload): Json<UpdateGuildConfigDto>,
) -> Result<impl IntoResponse, AppError> {
    let _ = AuthGuard::new(&state.db, &session)
        .require(&[Permission::ManageGuild(guild_id)])
        .await?;

    let params = UpdateGuildConfigParams::from_dto(guild_id, payload);
    let config = GuildConfigService::new(&state.db).update(params).await?;

    Ok((StatusCode::OK, Json(config.into_dto())))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::server::{controller::test_state::app_state, middleware::session::AuthSession};
    use test_utils::{builder::TestBuilder, factory};

    const MANAGE_GUILD: i64 = 0x20;
    const SEND_MESSAGES: i64 = 0x800;

    fn payload(prefix: &str) -> UpdateGuildConfigDto {
        UpdateGuildConfigDto {
            prefix: prefix.to_string(),
            modlog_channel_id: Some(555),
            welcome_channel_id: None,
            welcome_message: None,
            leave_message: None,
            auto_role_id: None,
            modmail_enabled: true,
        }
    }

    /// Tests that a manager's update is stored.
    ///
    /// Expected: Ok, stored prefix and modlog channel changed
    #[tokio::test]
    async fn manager_updates_config() -> Result<(), AppError> {
        let mut test = TestBuilder::new()
            .with_table(entity::prelude::GuildConfig)
            .with_operator_tables()
            .build()
            .await
            .unwrap();
        let (db, session) = test.db_and_session().await.unwrap();

        let operator = factory::operator::create_operator_with_guild(db, "100", MANAGE_GUILD).await?;
        AuthSession::new(session)
            .set_operator_id(operator.discord_id.parse().unwrap())
            .await?;

        let result = update_guild_config(
            State(app_state(db)),
            session.clone(),
            Path(100),
            Json(payload("?")),
        )
        .await;

        assert!(result.is_ok());
        let config = GuildConfigService::new(db).get(100).await?;
        assert_eq!(config.prefix, "?");
        assert_eq!(config.modlog_channel_id, Some(555));
        assert!(config.modmail_enabled);

        Ok(())
    }

    /// Tests that an operator without manage-guild cannot change the configuration.
    ///
    /// Expected: Err(AppError::PermissionDenied), stored prefix unchanged
    #[tokio::test]
    async fn non_manager_cannot_update_config() -> Result<(), AppError> {
        let mut test = TestBuilder::new()
            .with_table(entity::prelude::GuildConfig)
            .with_operator_tables()
            .build()
            .await
            .unwrap();
        let (db, session) = test.db_and_session().await.unwrap();

        factory::guild_config::create_guild_config(db, "100").await?;
        let operator =
            factory::operator::create_operator_with_guild(db, "100", SEND_MESSAGES).await?;
        AuthSession::new(session)
            .set_operator_id(operator.discord_id.parse().unwrap())
            .await?;

        let result = update_guild_config(
            State(app_state(db)),
            session.clone(),
            Path(100),
            Json(payload("?")),
        )
        .await;

        assert!(matches!(result, Err(AppError::PermissionDenied(_))));
        let config = GuildConfigService::new(db).get(100).await?;
        assert_eq!(config.prefix, "!");

        Ok(())
    }
}
