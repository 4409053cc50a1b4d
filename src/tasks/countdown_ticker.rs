//! Countdown ticker background task

use std::sync::Arc;
use tokio::time::interval;
use tracing::{debug, error, info};

use crate::{
    error::DisplayError,
    state::{AppState, TickOutcome},
};

/// Recompute the countdown right away, then once per tick interval
pub async fn countdown_ticker_task(state: Arc<AppState>) {
    info!("Starting countdown ticker");

    let mut interval = interval(state.settings.tick_interval);

    loop {
        interval.tick().await;

        match state.countdown_tick() {
            Ok(TickOutcome::Updated(remaining)) => {
                debug!(
                    "Countdown: {}d {}h {}m {}s",
                    remaining.days, remaining.hours, remaining.minutes, remaining.seconds
                );
            }
            Ok(TickOutcome::RolledOver { .. }) => {
                debug!("Countdown rolled over, skipping display update");
            }
            Err(DisplayError::TornDown) => {
                debug!("Display torn down, countdown ticker exiting");
                break;
            }
            Err(e) => {
                error!("Failed to tick countdown: {}", e);
            }
        }
    }
}
