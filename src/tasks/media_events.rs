//! Media element notification pump

use std::sync::Arc;
use tokio::sync::broadcast::{self, error::RecvError};
use tracing::{debug, error, info, warn};

use crate::{error::DisplayError, host::MediaEvent, state::AppState};

/// Forward media element notifications into the player state until teardown
pub async fn media_event_task(state: Arc<AppState>, mut events: broadcast::Receiver<MediaEvent>) {
    info!("Starting media event listener");

    loop {
        match events.recv().await {
            Ok(event) => {
                if matches!(event, MediaEvent::Ended) {
                    info!("Media playback ended");
                }
                match state.handle_media_event(&event) {
                    Ok(()) => {}
                    Err(DisplayError::TornDown) => break,
                    Err(e) => error!("Failed to apply media event {:?}: {}", event, e),
                }
            }
            Err(RecvError::Lagged(skipped)) => {
                warn!("Media event listener lagged, skipped {} events", skipped);
            }
            Err(RecvError::Closed) => {
                debug!("Media element closed its event stream");
                break;
            }
        }
    }
}
