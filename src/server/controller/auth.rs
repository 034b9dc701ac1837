use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Redirect},
    Json,
};
use serde::Deserialize;
use tower_sessions::Session;

use crate::{
    model::{api::ErrorDto, operator::OperatorDto},
    server::{
        error::{auth::AuthError, AppError},
        middleware::{
            auth::AuthGuard,
            session::{AuthSession, CsrfSession},
        },
        service::{auth::AuthService, operator::OperatorService},
        state::AppState,
    },
};

/// Tag for grouping auth endpoints in OpenAPI documentation
pub static AUTH_TAG: &str = "auth";

/// Query parameters for the OAuth callback endpoint.
#[derive(Deserialize)]
pub struct CallbackParams {
    /// CSRF state token to be validated against the session value.
    pub state: String,
    /// Authorization code from Discord for token exchange.
    pub code: String,
}

/// Redirect to Discord's authorize page.
///
/// Stores a fresh CSRF token in the session; the callback rejects any `state` that does
/// not match it.
#[utoipa::path(
    get,
    path = "/api/auth/login",
    tag = AUTH_TAG,
    responses(
        (status = 307, description = "Redirect to Discord OAuth"),
        (status = 500, description = "Internal server error", body = ErrorDto)
    ),
)]
pub async fn login(
    State(state): State<AppState>,
    session: Session,
) -> Result<impl IntoResponse, AppError> {
    let auth_service = AuthService::new(&state.db, &state.http_client, &state.oauth_client);

    let (url, csrf_token) = auth_service.login_url();

    CsrfSession::new(&session)
        .set_token(csrf_token.secret().to_string())
        .await?;

    Ok(Redirect::temporary(url.as_str()))
}

/// Complete the OAuth flow.
///
/// Validates the CSRF state, exchanges the code, records the operator with a fresh guild
/// permission snapshot and starts the session.
///
/// # Returns
/// - `200 OK` - Operator and the guilds they can manage
/// - `400 Bad Request` - CSRF state mismatch
/// - `502 Bad Gateway` - Discord rejected the code or the profile lookup failed
#[utoipa::path(
    get,
    path = "/api/auth/callback",
    tag = AUTH_TAG,
    params(
        ("state" = String, Query, description = "OAuth state"),
        ("code" = String, Query, description = "Authorization code")
    ),
    responses(
        (status = 200, description = "Logged in", body = OperatorDto),
        (status = 400, description = "CSRF validation failed", body = ErrorDto),
        (status = 502, description = "Discord rejected the login", body = ErrorDto),
        (status = 500, description = "Internal server error", body = ErrorDto)
    ),
)]
pub async fn callback(
    State(state): State<AppState>,
    session: Session,
    Query(params): Query<CallbackParams>,
) -> Result<impl IntoResponse, AppError> {
    validate_csrf(&session, &params.state).await?;

    let auth_service = AuthService::new(&state.db, &state.http_client, &state.oauth_client);
    let operator = auth_service.callback(params.code).await?;

    // New identity, new session id.
    session.cycle_id().await?;
    AuthSession::new(&session)
        .set_operator_id(operator.discord_id)
        .await?;

    let dto = OperatorService::new(&state.db)
        .get_operator(operator.discord_id)
        .await?
        .ok_or(AuthError::UserNotInDatabase(operator.discord_id))?;

    Ok((StatusCode::OK, Json(dto)))
}

/// End the session.
#[utoipa::path(
    get,
    path = "/api/auth/logout",
    tag = AUTH_TAG,
    responses(
        (status = 204, description = "Logged out")
    ),
)]
pub async fn logout(session: Session) -> impl IntoResponse {
    AuthSession::new(&session).clear().await;

    StatusCode::NO_CONTENT
}

/// Get the logged-in operator.
///
/// # Returns
/// - `200 OK` - Operator and the guilds they can manage
/// - `401 Unauthorized` - Not logged in or the permission snapshot expired
#[utoipa::path(
    get,
    path = "/api/auth/user",
    tag = AUTH_TAG,
    responses(
        (status = 200, description = "Current operator", body = OperatorDto),
        (status = 401, description = "Not logged in or session expired", body = ErrorDto),
        (status = 500, description = "Internal server error", body = ErrorDto)
    ),
)]
pub async fn get_user(
    State(state): State<AppState>,
    session: Session,
) -> Result<impl IntoResponse, AppError> {
    let operator = AuthGuard::new(&state.db, &session).require(&[]).await?;

    let dto = OperatorService::new(&state.db)
        .get_operator(operator.discord_id)
        .await?
        .ok_or(AuthError::UserNotInDatabase(operator.discord_id))?;

    Ok((StatusCode::OK, Json(dto)))
}

async fn validate_csrf(session: &Session, csrf_state: &str) -> Result<(), AppError> {
    let stored_state = CsrfSession::new(session).take_token().await?;

    match stored_state {
        Some(stored) if stored == csrf_state => Ok(()),
        _ => Err(AuthError::CsrfValidationFailed.into()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_utils::builder::TestBuilder;

    /// Tests that a callback without a matching CSRF token is rejected.
    ///
    /// Expected: Err(AuthError::CsrfValidationFailed), token consumed
    #[tokio::test]
    async fn rejects_mismatched_csrf_state() -> Result<(), AppError> {
        let mut test = TestBuilder::new()
            .with_operator_tables()
            .build()
            .await
            .unwrap();
        let (_, session) = test.db_and_session().await.unwrap();

        CsrfSession::new(session)
            .set_token("expected".to_string())
            .await?;

        let result = validate_csrf(session, "forged").await;

        assert!(matches!(
            result,
            Err(AppError::AuthErr(AuthError::CsrfValidationFailed))
        ));
        assert!(CsrfSession::new(session).take_token().await?.is_none());

        Ok(())
    }

    /// Tests that the stored CSRF token validates exactly once.
    ///
    /// Expected: first validation Ok, second fails
    #[tokio::test]
    async fn csrf_token_is_single_use() -> Result<(), AppError> {
        let mut test = TestBuilder::new()
            .with_operator_tables()
            .build()
            .await
            .unwrap();
        let (_, session) = test.db_and_session().await.unwrap();

        CsrfSession::new(session)
            .set_token("state".to_string())
            .await?;

        assert!(validate_csrf(session, "state").await.is_ok());
        assert!(validate_csrf(session, "state").await.is_err());

        Ok(())
    }
}
