use oauth2::{
    basic::BasicTokenType, AuthorizationCode, CsrfToken, EmptyExtraTokenFields, Scope,
    StandardTokenResponse, TokenResponse,
};
use sea_orm::DatabaseConnection;
use serenity::all::{GuildInfo, User as DiscordUser};
use url::Url;

use crate::server::{
    data::operator::OperatorRepository,
    error::{auth::AuthError, AppError},
    model::operator::{Operator, OperatorGuild, UpsertOperatorParams},
    state::OAuth2Client,
};

const DISCORD_API: &str = "https://discord.com/api";

type DiscordToken = StandardTokenResponse<EmptyExtraTokenFields, BasicTokenType>;

/// Service for the dashboard's Discord OAuth2 login.
///
/// Logging in records the operator and a snapshot of their permission bits in every guild
/// they belong to. The snapshot is what the dashboard guard checks on each request, so the
/// access token itself is never stored.
pub struct AuthService<'a> {
    /// Database connection for operator records.
    pub db: &'a DatabaseConnection,
    /// HTTP client for Discord API requests.
    pub http_client: &'a reqwest::Client,
    /// OAuth2 client for the Discord authorization flow.
    pub oauth_client: &'a OAuth2Client,
}

impl<'a> AuthService<'a> {
    /// Creates a new AuthService instance.
    ///
    /// # Arguments
    /// - `db` - Reference to the database connection
    /// - `http_client` - Reference to the HTTP client for Discord API requests
    /// - `oauth_client` - Reference to the configured OAuth2 client
    pub fn new(
        db: &'a DatabaseConnection,
        http_client: &'a reqwest::Client,
        oauth_client: &'a OAuth2Client,
    ) -> Self {
        Self {
            db,
            http_client,
            oauth_client,
        }
    }

    /// Generates the Discord authorize URL and the CSRF token to keep in the session.
    ///
    /// # Returns
    /// - `(Url, CsrfToken)` - Authorization URL and the state token to validate on callback
    pub fn login_url(&self) -> (Url, CsrfToken) {
        self.oauth_client
            .authorize_url(CsrfToken::new_random)
            .add_scope(Scope::new("identify".to_string()))
            .add_scope(Scope::new("guilds".to_string()))
            .url()
    }

    /// Exchanges the authorization code and stores the operator with a fresh guild snapshot.
    ///
    /// # Arguments
    /// - `authorization_code` - Code Discord passed to the callback
    ///
    /// # Returns
    /// - `Ok(Operator)` - Stored operator
    /// - `Err(AppError::AuthErr)` - Discord rejected the code
    /// - `Err(AppError::ReqwestErr)` - Fetching the user or guild list failed
    /// - `Err(AppError::DbErr)` - Storing the operator failed
    pub async fn callback(&self, authorization_code: String) -> Result<Operator, AppError> {
        let token = self
            .oauth_client
            .exchange_code(AuthorizationCode::new(authorization_code))
            .request_async(self.http_client)
            .await
            .map_err(|e| AuthError::TokenExchange(e.to_string()))?;

        let user = self.fetch_discord_user(&token).await?;
        let guilds = self.fetch_user_guilds(&token).await?;

        let operator = OperatorRepository::new(self.db)
            .upsert(UpsertOperatorParams {
                discord_id: user.id.get(),
                name: user.name,
                guilds: guilds
                    .into_iter()
                    .map(|g| OperatorGuild {
                        guild_id: g.id.get(),
                        name: g.name,
                        permissions: g.permissions,
                    })
                    .collect(),
            })
            .await?;

        tracing::info!("Operator {} logged in", operator.discord_id);

        Ok(operator)
    }

    async fn fetch_discord_user(&self, token: &DiscordToken) -> Result<DiscordUser, AppError> {
        let user = self
            .http_client
            .get(format!("{}/users/@me", DISCORD_API))
            .bearer_auth(token.access_token().secret())
            .send()
            .await?
            .error_for_status()?
            .json::<DiscordUser>()
            .await?;

        Ok(user)
    }

    async fn fetch_user_guilds(&self, token: &DiscordToken) -> Result<Vec<GuildInfo>, AppError> {
        let guilds = self
            .http_client
            .get(format!("{}/users/@me/guilds", DISCORD_API))
            .bearer_auth(token.access_token().secret())
            .send()
            .await?
            .error_for_status()?
            .json::<Vec<GuildInfo>>()
            .await?;

        Ok(guilds)
    }
}
