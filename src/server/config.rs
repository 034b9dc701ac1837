use crate::server::error::{config::ConfigError, AppError};

const DISCORD_AUTH_URL: &str = "https://discord.com/oauth2/authorize";
const DISCORD_TOKEN_URL: &str = "https://discord.com/api/oauth2/token";

const DEFAULT_DATABASE_URL: &str = "sqlite://guildhall.db?mode=rwc";
const DEFAULT_DASHBOARD_PORT: u16 = 8080;

/// The session cookie is signed with this key; tower-sessions needs at least 64 bytes.
pub const MIN_SESSION_SECRET_LEN: usize = 64;

pub struct Config {
    pub database_url: String,
    pub dashboard_port: u16,
    pub session_secret: String,

    pub discord_bot_token: String,
    pub discord_client_id: String,
    pub discord_client_secret: String,
    pub discord_redirect_url: String,

    pub discord_auth_url: String,
    pub discord_token_url: String,
}

fn required(name: &str) -> Result<String, ConfigError> {
    std::env::var(name).map_err(|_| ConfigError::MissingEnvVar(name.to_string()))
}

impl Config {
    pub fn from_env() -> Result<Self, AppError> {
        let session_secret = required("SESSION_SECRET")?;
        if session_secret.len() < MIN_SESSION_SECRET_LEN {
            return Err(ConfigError::InvalidEnvVar {
                name: "SESSION_SECRET".to_string(),
                reason: format!("must be at least {} bytes", MIN_SESSION_SECRET_LEN),
            }
            .into());
        }

        let dashboard_port = match std::env::var("DASHBOARD_PORT") {
            Ok(value) => value.parse().map_err(|_| ConfigError::InvalidEnvVar {
                name: "DASHBOARD_PORT".to_string(),
                reason: format!("'{}' is not a port number", value),
            })?,
            Err(_) => DEFAULT_DASHBOARD_PORT,
        };

        Ok(Self {
            database_url: std::env::var("DATABASE_URL")
                .unwrap_or_else(|_| DEFAULT_DATABASE_URL.to_string()),
            dashboard_port,
            session_secret,
            discord_bot_token: required("DISCORD_BOT_TOKEN")?,
            discord_client_id: required("DISCORD_CLIENT_ID")?,
            discord_client_secret: required("DISCORD_CLIENT_SECRET")?,
            discord_redirect_url: required("DISCORD_REDIRECT_URL")?,
            discord_auth_url: DISCORD_AUTH_URL.to_string(),
            discord_token_url: DISCORD_TOKEN_URL.to_string(),
        })
    }
}
