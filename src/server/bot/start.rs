use std::sync::Arc;

use sea_orm::DatabaseConnection;
use serenity::{
    all::{Client, GatewayIntents},
    http::Http,
};

use crate::server::{
    bot::{
        command::CommandRegistry, discord::DiscordPlatform, dispatch::Dispatcher,
        handler::Handler, platform::Platform,
    },
    config::Config,
    error::AppError,
};

/// Builds the gateway client and the dispatcher it feeds.
///
/// The command registry is validated here, so a malformed command table stops startup
/// before the bot connects. The returned dispatcher is shared with the scheduler.
///
/// # Arguments
/// - `config` - Application configuration holding the bot token
/// - `db` - Database connection for the handlers to use
///
/// # Returns
/// - `Ok((Client, Arc<Dispatcher>))` - Client ready to start, and its dispatcher
/// - `Err(AppError::ConfigErr)` - The command registry is invalid
/// - `Err(AppError::DiscordErr)` - The client could not be built
pub async fn init_bot(
    config: &Config,
    db: DatabaseConnection,
) -> Result<(Client, Arc<Dispatcher>), AppError> {
    let registry = CommandRegistry::new()?;

    // GUILD_MEMBERS and MESSAGE_CONTENT are privileged intents; both must be enabled
    // for the application in the Discord Developer Portal.
    let intents = GatewayIntents::GUILDS
        | GatewayIntents::GUILD_MESSAGES
        | GatewayIntents::GUILD_MESSAGE_REACTIONS
        | GatewayIntents::GUILD_MEMBERS
        | GatewayIntents::DIRECT_MESSAGES
        | GatewayIntents::MESSAGE_CONTENT;

    let http = Arc::new(Http::new(&config.discord_bot_token));
    let platform: Arc<dyn Platform> = Arc::new(DiscordPlatform::new(http));
    let dispatcher = Arc::new(Dispatcher::new(db, platform, registry));

    let client = Client::builder(&config.discord_bot_token, intents)
        .event_handler(Handler::new(dispatcher.clone()))
        .await?;

    Ok((client, dispatcher))
}

/// Runs the gateway connection until it shuts down.
///
/// Should be spawned on its own task since it only returns when the connection ends.
pub async fn start_bot(mut client: Client) -> Result<(), AppError> {
    tracing::info!("Starting Discord bot...");

    client.start().await?;

    Ok(())
}
