use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use thiserror::Error;

use crate::model::api::ErrorDto;

#[derive(Error, Debug)]
pub enum AuthError {
    /// No operator id is stored in the session.
    #[error("No operator is logged in")]
    UserNotInSession,

    /// The session references an operator that no longer exists.
    #[error("Operator {0} is not in the database")]
    UserNotInDatabase(u64),

    /// The guild permission snapshot taken at login is too old to trust.
    #[error("Guild permissions for operator {0} are stale")]
    SessionExpired(u64),

    /// The OAuth `state` parameter does not match the token stored at login.
    #[error("Failed to login user due to CSRF state mismatch")]
    CsrfValidationFailed,

    /// Exchanging the authorization code for a token failed.
    #[error("Failed to exchange OAuth code: {0}")]
    TokenExchange(String),
}

/// Converts authentication errors into HTTP responses.
///
/// Not-logged-in and stale sessions answer 401 so the dashboard knows to restart the
/// OAuth flow. CSRF failures answer 400 and token exchange failures 502. Messages stay
/// generic; the detailed error is logged at debug level.
impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        tracing::debug!("Authentication error: {}", self);

        let (status, message) = match self {
            Self::UserNotInSession | Self::UserNotInDatabase(_) => {
                (StatusCode::UNAUTHORIZED, "Not logged in")
            }
            Self::SessionExpired(_) => (
                StatusCode::UNAUTHORIZED,
                "Your session has expired, please log in again.",
            ),
            Self::CsrfValidationFailed => (
                StatusCode::BAD_REQUEST,
                "There was an issue logging you in, please try again.",
            ),
            Self::TokenExchange(_) => (
                StatusCode::BAD_GATEWAY,
                "Discord did not accept the login, please try again.",
            ),
        };

        (
            status,
            Json(ErrorDto {
                error: message.to_string(),
            }),
        )
            .into_response()
    }
}
