mod model;
mod server;

use tokio::net::TcpListener;
use tracing_subscriber::EnvFilter;

use crate::server::{
    bot, config::Config, error::AppError, router, scheduler::giveaway, startup,
    state::AppState,
};

#[tokio::main]
async fn main() -> Result<(), AppError> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = Config::from_env()?;

    let db = startup::connect_to_database(&config).await?;
    let session = startup::connect_to_session(&db, &config).await?;
    let http_client = startup::setup_reqwest_client()?;
    let oauth_client = startup::setup_oauth_client(&config)?;

    let (bot_client, dispatcher) = bot::start::init_bot(&config, db.clone()).await?;

    // Dropping the scheduler stops its jobs.
    let _scheduler = giveaway::start_scheduler(dispatcher).await?;

    tokio::spawn(async move {
        if let Err(e) = bot::start::start_bot(bot_client).await {
            tracing::error!("Discord bot error: {}", e);
        }
    });

    let app = router::router()
        .with_state(AppState::new(db, http_client, oauth_client))
        .layer(session);

    let listener = TcpListener::bind(("0.0.0.0", config.dashboard_port)).await?;

    tracing::info!("Dashboard listening on port {}", config.dashboard_port);

    axum::serve(listener, app).await?;

    Ok(())
}
