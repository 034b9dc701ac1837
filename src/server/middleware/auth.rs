use chrono::{Duration, Utc};
use sea_orm::DatabaseConnection;
use tower_sessions::Session;

use crate::server::{
    data::operator::OperatorRepository,
    error::{auth::AuthError, AppError},
    middleware::session::AuthSession,
    model::operator::Operator,
};

/// Guild permissions are taken from Discord at login; after this long they are not trusted.
pub const SNAPSHOT_TTL_MINUTES: i64 = 30;

pub enum Permission {
    /// Administrator or manage-guild in the guild.
    ManageGuild(u64),
}

/// Per-request check that the session belongs to an operator allowed to act.
pub struct AuthGuard<'a> {
    db: &'a DatabaseConnection,
    session: &'a Session,
}

impl<'a> AuthGuard<'a> {
    pub fn new(db: &'a DatabaseConnection, session: &'a Session) -> Self {
        Self { db, session }
    }

    /// Resolves the logged-in operator and checks every permission in `permissions`.
    ///
    /// # Returns
    /// - `Ok(Operator)` - Logged in, snapshot fresh, all permissions held
    /// - `Err(AuthError::UserNotInSession)` - Not logged in
    /// - `Err(AuthError::UserNotInDatabase)` - Session references an unknown operator
    /// - `Err(AuthError::SessionExpired)` - Guild snapshot older than the TTL
    /// - `Err(AppError::PermissionDenied)` - A permission is missing
    pub async fn require(&self, permissions: &[Permission]) -> Result<Operator, AppError> {
        let repo = OperatorRepository::new(self.db);

        let Some(operator_id) = AuthSession::new(self.session).get_operator_id().await? else {
            return Err(AuthError::UserNotInSession.into());
        };

        let Some(operator) = repo.find(operator_id).await? else {
            return Err(AuthError::UserNotInDatabase(operator_id).into());
        };

        if Utc::now() - operator.guilds_synced_at > Duration::minutes(SNAPSHOT_TTL_MINUTES) {
            return Err(AuthError::SessionExpired(operator_id).into());
        }

        for permission in permissions {
            match permission {
                Permission::ManageGuild(guild_id) => {
                    let allowed = repo
                        .find_guild(operator_id, *guild_id)
                        .await?
                        .is_some_and(|guild| guild.can_manage());

                    if !allowed {
                        tracing::debug!(
                            "Operator {} denied access to guild {}",
                            operator_id,
                            guild_id
                        );
                        return Err(AppError::PermissionDenied(
                            "You need Manage Server permission in this server.".to_string(),
                        ));
                    }
                }
            }
        }

        Ok(operator)
    }
}
