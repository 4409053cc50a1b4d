//! Mock playback progress ticker

use std::sync::Arc;
use tokio::{
    task::JoinHandle,
    time::{interval_at, Instant},
};
use tracing::{debug, error};

use crate::{error::DisplayError, state::AppState};

/// Spawn a ticker that bumps mock progress once per tick interval, starting one interval from now
pub fn spawn_progress_ticker(state: Arc<AppState>) -> JoinHandle<()> {
    tokio::spawn(async move {
        let period = state.settings.tick_interval;
        let mut interval = interval_at(Instant::now() + period, period);

        loop {
            interval.tick().await;

            match state.advance_progress() {
                Ok(progress) => debug!("Mock progress at {}%", progress),
                Err(DisplayError::TornDown) => break,
                Err(e) => error!("Failed to advance progress: {}", e),
            }
        }
    })
}
