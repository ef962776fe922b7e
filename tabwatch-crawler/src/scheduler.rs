//! Daily sync trigger
//!
//! Sleeps until the next local `sync_hour:00`, runs a full cycle, repeats.
//! If the service starts after today's trigger time, the first run is
//! tomorrow.

use chrono::Local;
use std::sync::Arc;
use std::time::Duration;
use tabwatch_common::time::duration_until_next_trigger;
use tokio::task::JoinHandle;
use tracing::{error, info};

use crate::crawler::Crawler;

/// Retry delay when the trigger time cannot be computed
const RETRY_DELAY: Duration = Duration::from_secs(3600);

pub fn spawn_daily_sync(crawler: Arc<Crawler>, sync_hour: u32) -> JoinHandle<()> {
    tokio::spawn(async move {
        info!(sync_hour, "Scheduler started");
        loop {
            let wait = match duration_until_next_trigger(Local::now(), sync_hour) {
                Ok(wait) => wait,
                Err(e) => {
                    error!(error = %e, "Cannot compute next sync time, retrying later");
                    tokio::time::sleep(RETRY_DELAY).await;
                    continue;
                }
            };

            info!(wait_secs = wait.as_secs(), "Next scheduled sync");
            tokio::time::sleep(wait).await;

            let outcome = crawler.sync_all().await;
            info!(outcome = ?outcome, "Scheduled sync finished");
        }
    })
}
