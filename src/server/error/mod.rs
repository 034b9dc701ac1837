//! Error types shared by the bot dispatcher and the dashboard.
//!
//! `AppError` is the single error type returned by repositories' callers, services,
//! controllers and bot handlers. Controllers turn it into an HTTP response through
//! `IntoResponse`; the dispatcher turns it into a chat reply through
//! [`AppError::user_message`].

pub mod auth;
pub mod config;
pub mod internal;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use thiserror::Error;

use crate::{
    model::api::ErrorDto,
    server::error::{auth::AuthError, config::ConfigError, internal::InternalError},
};

/// Top-level application error type.
///
/// The first block of variants wraps infrastructure errors through `#[from]`. The second
/// block is the domain taxonomy every workflow reports in: `PermissionDenied`, `NotFound`,
/// `InvalidArgument`, `Conflict` and `Upstream`.
#[derive(Error, Debug)]
pub enum AppError {
    /// Configuration error during startup. Always fatal.
    #[error(transparent)]
    ConfigErr(#[from] ConfigError),

    /// Dashboard authentication error; maps its own status codes.
    #[error(transparent)]
    AuthErr(#[from] AuthError),

    /// Unexpected internal state such as a malformed stored id.
    #[error(transparent)]
    InternalErr(#[from] InternalError),

    #[error(transparent)]
    DbErr(#[from] sea_orm::DbErr),

    #[error(transparent)]
    SessionErr(#[from] tower_sessions::session::Error),

    /// HTTP client error talking to Discord's OAuth or REST API.
    #[error(transparent)]
    ReqwestErr(#[from] reqwest::Error),

    /// Discord API error from Serenity.
    ///
    /// Boxed because `serenity::Error` is large and would inflate every `AppError`.
    #[error(transparent)]
    DiscordErr(#[from] Box<serenity::Error>),

    #[error(transparent)]
    SchedulerErr(#[from] tokio_cron_scheduler::JobSchedulerError),

    /// Binding or serving the dashboard listener failed.
    #[error(transparent)]
    IoErr(#[from] std::io::Error),

    /// The actor lacks the role, hierarchy position or permission bit the action needs.
    #[error("{0}")]
    PermissionDenied(String),

    /// A referenced command, binding, thread, giveaway or configuration does not exist.
    #[error("{0}")]
    NotFound(String),

    /// An argument is out of range or malformed.
    #[error("{0}")]
    InvalidArgument(String),

    /// The action collides with existing state: a duplicate name, an already resolved
    /// giveaway, an already open or already closed thread.
    #[error("{0}")]
    Conflict(String),

    /// A Discord call failed for a reason worth surfacing to the invoker.
    #[error("{0}")]
    Upstream(String),
}

impl From<serenity::Error> for AppError {
    fn from(err: serenity::Error) -> Self {
        AppError::DiscordErr(Box::new(err))
    }
}

impl AppError {
    /// Message shown to a Discord user when a handler fails.
    ///
    /// Domain errors carry a message written for users and are shown as-is. Everything else
    /// is reduced to a generic line so internal details never reach a channel.
    pub fn user_message(&self) -> String {
        match self {
            Self::PermissionDenied(msg)
            | Self::NotFound(msg)
            | Self::InvalidArgument(msg)
            | Self::Conflict(msg) => format!("❌ {}", msg),
            Self::Upstream(msg) => format!("❌ Discord rejected the request: {}", msg),
            Self::DiscordErr(_) | Self::ReqwestErr(_) => {
                "❌ Discord rejected the request. Please try again in a moment.".to_string()
            }
            _ => "❌ Something went wrong while handling that. The error has been logged."
                .to_string(),
        }
    }
}

/// Maps the taxonomy onto HTTP status codes.
///
/// # Returns
/// - 400 Bad Request - `InvalidArgument`
/// - 403 Forbidden - `PermissionDenied`
/// - 404 Not Found - `NotFound`
/// - 409 Conflict - `Conflict`
/// - 502 Bad Gateway - `Upstream`, Discord and HTTP client errors
/// - Variable - `AuthErr`, delegated to `AuthError::into_response()`
/// - 500 Internal Server Error - everything else, logged server-side
impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        match self {
            Self::AuthErr(err) => err.into_response(),
            Self::InvalidArgument(msg) => {
                (StatusCode::BAD_REQUEST, Json(ErrorDto { error: msg })).into_response()
            }
            Self::PermissionDenied(msg) => {
                (StatusCode::FORBIDDEN, Json(ErrorDto { error: msg })).into_response()
            }
            Self::NotFound(msg) => {
                (StatusCode::NOT_FOUND, Json(ErrorDto { error: msg })).into_response()
            }
            Self::Conflict(msg) => {
                (StatusCode::CONFLICT, Json(ErrorDto { error: msg })).into_response()
            }
            Self::Upstream(msg) => {
                tracing::warn!("Upstream failure: {}", msg);
                (StatusCode::BAD_GATEWAY, Json(ErrorDto { error: msg })).into_response()
            }
            err @ (Self::DiscordErr(_) | Self::ReqwestErr(_)) => {
                tracing::error!("Discord request failed: {}", err);
                (
                    StatusCode::BAD_GATEWAY,
                    Json(ErrorDto {
                        error: "Discord request failed".to_string(),
                    }),
                )
                    .into_response()
            }
            err => InternalServerError(err).into_response(),
        }
    }
}

/// Wraps any displayable error into a logged 500 response with a generic body.
pub struct InternalServerError<E>(pub E);

impl<E: std::fmt::Display> IntoResponse for InternalServerError<E> {
    fn into_response(self) -> Response {
        tracing::error!("{}", self.0);

        (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(ErrorDto {
                error: "Internal server error".to_string(),
            }),
        )
            .into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn domain_errors_show_their_message() {
        let err = AppError::Conflict("A command named `hello` already exists.".to_string());
        assert_eq!(
            err.user_message(),
            "❌ A command named `hello` already exists."
        );
    }

    #[test]
    fn database_errors_are_not_leaked() {
        let err = AppError::DbErr(sea_orm::DbErr::Custom("disk I/O error".to_string()));
        assert!(!err.user_message().contains("disk"));
    }

    #[test]
    fn taxonomy_maps_to_status_codes() {
        let cases = [
            (AppError::InvalidArgument(String::new()), StatusCode::BAD_REQUEST),
            (AppError::PermissionDenied(String::new()), StatusCode::FORBIDDEN),
            (AppError::NotFound(String::new()), StatusCode::NOT_FOUND),
            (AppError::Conflict(String::new()), StatusCode::CONFLICT),
            (AppError::Upstream(String::new()), StatusCode::BAD_GATEWAY),
            (
                AppError::InternalErr(InternalError::InvalidStoredId {
                    column: "guild_id",
                    value: "x".to_string(),
                }),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
        ];

        for (err, status) in cases {
            assert_eq!(err.into_response().status(), status);
        }
    }
}
