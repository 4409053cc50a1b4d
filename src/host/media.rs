//! Media element abstraction for the real-media player variant

use std::{
    sync::{Arc, Mutex},
    time::Duration,
};

use async_trait::async_trait;
use tokio::{sync::broadcast, task::JoinHandle};
use tracing::{debug, info};

use crate::error::MediaError;

/// Notifications delivered by a media element
#[derive(Debug, Clone, PartialEq)]
pub enum MediaEvent {
    Play,
    Pause,
    TimeUpdate { current_time: f64 },
    LoadedMetadata { duration: f64 },
    Ended,
}

/// Native playback controls of a media element
#[async_trait]
pub trait MediaElement: Send + Sync + std::fmt::Debug {
    /// Request playback; the host may refuse it
    async fn play(&self) -> Result<(), MediaError>;

    async fn pause(&self) -> Result<(), MediaError>;

    /// Move the playback position, in seconds
    fn set_current_time(&self, seconds: f64) -> Result<(), MediaError>;

    fn current_time(&self) -> f64;

    /// Track duration once metadata has loaded
    fn duration(&self) -> Option<f64>;

    fn set_playback_rate(&self, rate: f64);

    fn subscribe(&self) -> broadcast::Receiver<MediaEvent>;
}

#[derive(Debug)]
struct SimulatedTrack {
    current_time: f64,
    duration: Option<f64>,
    rate: f64,
    playing: bool,
}

/// In-process media element whose position advances on a tokio timer
#[derive(Debug)]
pub struct SimulatedMedia {
    track: Arc<Mutex<SimulatedTrack>>,
    track_duration: f64,
    block_autoplay: bool,
    update_interval: Duration,
    events: broadcast::Sender<MediaEvent>,
    clock: Mutex<Option<JoinHandle<()>>>,
}

impl SimulatedMedia {
    pub fn new(track_duration: f64, block_autoplay: bool) -> Self {
        let (events, _) = broadcast::channel(64);
        Self {
            track: Arc::new(Mutex::new(SimulatedTrack {
                current_time: 0.0,
                duration: None,
                rate: 1.0,
                playing: false,
            })),
            track_duration: track_duration.max(0.0),
            block_autoplay,
            update_interval: Duration::from_millis(250),
            events,
            clock: Mutex::new(None),
        }
    }

    /// Publish track metadata, like a `preload="metadata"` element does
    pub fn load(&self) {
        if let Ok(mut track) = self.track.lock() {
            track.duration = Some(self.track_duration);
        }
        info!("Simulated media loaded ({}s)", self.track_duration);
        let _ = self.events.send(MediaEvent::LoadedMetadata { duration: self.track_duration });
    }

    fn stop_clock(&self) {
        if let Ok(mut clock) = self.clock.lock() {
            if let Some(handle) = clock.take() {
                handle.abort();
            }
        }
    }

    fn spawn_clock(&self) -> JoinHandle<()> {
        let track = Arc::clone(&self.track);
        let events = self.events.clone();
        let period = self.update_interval;

        tokio::spawn(async move {
            let start = tokio::time::Instant::now() + period;
            let mut interval = tokio::time::interval_at(start, period);
            loop {
                interval.tick().await;
                let update = {
                    let Ok(mut track) = track.lock() else { break };
                    let duration = track.duration.unwrap_or(0.0);
                    track.current_time =
                        (track.current_time + period.as_secs_f64() * track.rate).min(duration);
                    let ended = track.current_time >= duration;
                    if ended {
                        track.playing = false;
                    }
                    (track.current_time, ended)
                };

                let _ = events.send(MediaEvent::TimeUpdate { current_time: update.0 });
                if update.1 {
                    debug!("Simulated media reached end of track");
                    let _ = events.send(MediaEvent::Ended);
                    break;
                }
            }
        })
    }
}

#[async_trait]
impl MediaElement for SimulatedMedia {
    async fn play(&self) -> Result<(), MediaError> {
        if self.block_autoplay {
            return Err(MediaError::PlayRejected("autoplay blocked by policy".to_string()));
        }

        {
            let mut track = self.track.lock()
                .map_err(|e| MediaError::Unavailable(e.to_string()))?;
            let duration = track.duration.ok_or(MediaError::MetadataUnavailable)?;
            if track.playing {
                return Ok(());
            }
            if track.current_time >= duration {
                track.current_time = 0.0;
            }
            track.playing = true;
        }

        self.stop_clock();
        let handle = self.spawn_clock();
        if let Ok(mut clock) = self.clock.lock() {
            *clock = Some(handle);
        }

        let _ = self.events.send(MediaEvent::Play);
        Ok(())
    }

    async fn pause(&self) -> Result<(), MediaError> {
        self.stop_clock();
        let was_playing = {
            let mut track = self.track.lock()
                .map_err(|e| MediaError::Unavailable(e.to_string()))?;
            std::mem::replace(&mut track.playing, false)
        };
        if was_playing {
            let _ = self.events.send(MediaEvent::Pause);
        }
        Ok(())
    }

    fn set_current_time(&self, seconds: f64) -> Result<(), MediaError> {
        let current_time = {
            let mut track = self.track.lock()
                .map_err(|e| MediaError::Unavailable(e.to_string()))?;
            let duration = track.duration.ok_or(MediaError::MetadataUnavailable)?;
            track.current_time = seconds.clamp(0.0, duration);
            track.current_time
        };
        let _ = self.events.send(MediaEvent::TimeUpdate { current_time });
        Ok(())
    }

    fn current_time(&self) -> f64 {
        self.track.lock().map(|t| t.current_time).unwrap_or(0.0)
    }

    fn duration(&self) -> Option<f64> {
        self.track.lock().ok().and_then(|t| t.duration)
    }

    fn set_playback_rate(&self, rate: f64) {
        if let Ok(mut track) = self.track.lock() {
            track.rate = rate;
        }
    }

    fn subscribe(&self) -> broadcast::Receiver<MediaEvent> {
        self.events.subscribe()
    }
}

impl Drop for SimulatedMedia {
    fn drop(&mut self) {
        self.stop_clock();
    }
}
