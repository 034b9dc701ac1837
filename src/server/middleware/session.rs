//! Type-safe session management wrappers.
//!
//! Each struct wraps the same underlying `Session` but exposes only the keys relevant to
//! its concern:
//! - `AuthSession` - Logged-in operator (Discord id)
//! - `CsrfSession` - OAuth `state` token between login and callback

use tower_sessions::Session;

use crate::server::{error::AppError, util::parse::parse_stored_id};

// Session key constants
const SESSION_AUTH_OPERATOR_ID: &str = "auth:operator";
const SESSION_AUTH_CSRF_TOKEN: &str = "auth:csrf_token";

/// Authentication session management.
pub struct AuthSession<'a> {
    session: &'a Session,
}

impl<'a> AuthSession<'a> {
    pub fn new(session: &'a Session) -> Self {
        Self { session }
    }

    /// Stores the operator's Discord id after a successful OAuth callback.
    ///
    /// # Returns
    /// - `Ok(())` - Id stored
    /// - `Err(AppError::SessionErr(_))` - Failed to store in session
    pub async fn set_operator_id(&self, discord_id: u64) -> Result<(), AppError> {
        self.session
            .insert(SESSION_AUTH_OPERATOR_ID, discord_id.to_string())
            .await?;
        Ok(())
    }

    /// Retrieves the logged-in operator's Discord id.
    ///
    /// # Returns
    /// - `Ok(Some(discord_id))` - Operator is logged in
    /// - `Ok(None)` - No operator in session
    /// - `Err(AppError::SessionErr(_))` - Failed to access session
    /// - `Err(AppError::DbErr(_))` - Stored value is not an id
    pub async fn get_operator_id(&self) -> Result<Option<u64>, AppError> {
        let Some(value) = self.session.get::<String>(SESSION_AUTH_OPERATOR_ID).await? else {
            return Ok(None);
        };

        Ok(Some(parse_stored_id(SESSION_AUTH_OPERATOR_ID, &value)?))
    }

    /// Clears all data from the session. Used during logout.
    pub async fn clear(&self) {
        self.session.clear().await;
    }
}

/// CSRF protection session management.
///
/// The token is stored when the login redirect is issued and consumed by the callback.
pub struct CsrfSession<'a> {
    session: &'a Session,
}

impl<'a> CsrfSession<'a> {
    pub fn new(session: &'a Session) -> Self {
        Self { session }
    }

    pub async fn set_token(&self, token: String) -> Result<(), AppError> {
        self.session.insert(SESSION_AUTH_CSRF_TOKEN, token).await?;
        Ok(())
    }

    /// Retrieves and removes the CSRF token, so each token validates at most one callback.
    ///
    /// # Returns
    /// - `Ok(Some(token))` - Token was found and removed
    /// - `Ok(None)` - No token in session
    /// - `Err(AppError::SessionErr(_))` - Failed to access session
    pub async fn take_token(&self) -> Result<Option<String>, AppError> {
        let token = self.session.remove(SESSION_AUTH_CSRF_TOKEN).await?;
        Ok(token)
    }
}
