use std::sync::Arc;

use chrono::Utc;
use tokio_cron_scheduler::{Job, JobScheduler};

use crate::server::{
    bot::{dispatch::Dispatcher, event::BotEvent},
    error::AppError,
};

/// Starts the giveaway scheduler
///
/// Emits a [`BotEvent::Tick`] at the top of every minute. The dispatcher resolves every
/// active giveaway whose end time has passed; a giveaway already ended by hand is skipped
/// by the conditional update in the giveaway service.
///
/// # Arguments
/// - `dispatcher`: Dispatcher shared with the gateway handler
///
/// # Returns
/// - `Ok(JobScheduler)`: The running scheduler; keep it alive for jobs to fire
/// - `Err(AppError::SchedulerErr)`: The job could not be created or the scheduler failed to start
pub async fn start_scheduler(dispatcher: Arc<Dispatcher>) -> Result<JobScheduler, AppError> {
    let scheduler = JobScheduler::new().await?;

    let job = Job::new_async("0 * * * * *", move |_uuid, _lock| {
        let dispatcher = dispatcher.clone();

        Box::pin(async move {
            dispatcher.dispatch(BotEvent::Tick(Utc::now())).await;
        })
    })?;

    scheduler.add(job).await?;
    scheduler.start().await?;

    tracing::info!("Giveaway scheduler started");

    Ok(scheduler)
}
