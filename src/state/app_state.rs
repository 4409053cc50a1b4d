//! Main display state management

use std::{
    collections::BTreeMap,
    ops::Deref,
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc, Mutex, MutexGuard,
    },
    time::Instant,
};
use chrono::{DateTime, FixedOffset, Utc};
use serde::{Deserialize, Serialize};
use tokio::{sync::watch, task::JoinHandle};
use tracing::{debug, info, warn};

use crate::{
    config::{DisplaySettings, PlayerMode},
    error::{DisplayError, MediaError, Result},
    host::{Clock, MediaElement, MediaEvent},
    tasks::{countdown_ticker_task, media_event_task, spawn_progress_ticker},
};
use super::{
    CountdownState, HeaderState, IntersectionEntry, ObserverOptions, PlaybackState,
    PlaybackStatus, RemainingDuration, RevealState, TickOutcome,
};

/// Everything the rendering layer needs, captured at one instant
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DisplaySnapshot {
    pub deadline: DateTime<FixedOffset>,
    pub remaining: RemainingDuration,
    pub rollovers: u32,
    pub mode: PlayerMode,
    pub status: PlaybackStatus,
    pub progress: f64,
    pub rate: f64,
    pub current_time: f64,
    pub duration: Option<f64>,
    pub revealed: BTreeMap<String, bool>,
    pub header: HeaderState,
    pub torn_down: bool,
}

impl DisplaySnapshot {
    fn capture(
        countdown: &CountdownState,
        playback: &PlaybackState,
        reveal: &RevealState,
        header: &HeaderState,
        torn_down: bool,
    ) -> Self {
        Self {
            deadline: countdown.deadline(),
            remaining: countdown.remaining(),
            rollovers: countdown.rollovers(),
            mode: playback.mode(),
            status: playback.status(),
            progress: playback.progress(),
            rate: playback.rate(),
            current_time: playback.current_time(),
            duration: playback.duration(),
            revealed: reveal.elements().clone(),
            header: *header,
            torn_down,
        }
    }
}

/// Repeating timers owned by the display
#[derive(Debug, Default)]
struct TimerHandles {
    countdown: Option<JoinHandle<()>>,
    progress: Option<JoinHandle<()>>,
    media_events: Option<JoinHandle<()>>,
}

impl TimerHandles {
    fn abort_all(&mut self) {
        for handle in [self.countdown.take(), self.progress.take(), self.media_events.take()]
            .into_iter()
            .flatten()
        {
            handle.abort();
        }
    }
}

fn is_live(handle: &Option<JoinHandle<()>>) -> bool {
    handle.as_ref().is_some_and(|h| !h.is_finished())
}

/// Display state shared by timer tasks and HTTP handlers
#[derive(Debug)]
pub struct AppState {
    pub settings: DisplaySettings,
    clock: Arc<dyn Clock>,
    media: Option<Arc<dyn MediaElement>>,
    countdown: Mutex<CountdownState>,
    playback: Mutex<PlaybackState>,
    reveal: Mutex<RevealState>,
    header: Mutex<HeaderState>,
    timers: Mutex<TimerHandles>,
    torn_down: AtomicBool,
    /// Server metadata
    pub start_time: Instant,
    pub port: u16,
    pub host: String,
    /// Last action tracking
    last_action: Mutex<Option<(String, DateTime<Utc>)>>,
    snapshot_tx: watch::Sender<DisplaySnapshot>,
}

impl AppState {
    /// Create the display; the deadline is computed from the clock right away.
    ///
    /// The player mode follows `media`: with an element it is `Media`, otherwise `Mock`.
    pub fn new(
        mut settings: DisplaySettings,
        clock: Arc<dyn Clock>,
        media: Option<Arc<dyn MediaElement>>,
        host: String,
        port: u16,
    ) -> Self {
        let mode = if media.is_some() { PlayerMode::Media } else { PlayerMode::Mock };
        if settings.mode != mode {
            warn!(
                "Requested {} mode does not match the media element, using {} mode",
                settings.mode.as_str(),
                mode.as_str()
            );
            settings.mode = mode;
        }

        let countdown = CountdownState::new(
            clock.now(),
            settings.countdown_days,
            settings.rollover_days,
            settings.rollover,
        );
        let playback = PlaybackState::new(
            settings.mode,
            settings.initial_progress,
            settings.progress_step,
        );
        let reveal = RevealState::new(ObserverOptions::default());
        let header = HeaderState::new();

        let initial = DisplaySnapshot::capture(&countdown, &playback, &reveal, &header, false);
        let (snapshot_tx, _) = watch::channel(initial);

        Self {
            settings,
            clock,
            media,
            countdown: Mutex::new(countdown),
            playback: Mutex::new(playback),
            reveal: Mutex::new(reveal),
            header: Mutex::new(header),
            timers: Mutex::new(TimerHandles::default()),
            torn_down: AtomicBool::new(false),
            start_time: Instant::now(),
            port,
            host,
            last_action: Mutex::new(None),
            snapshot_tx,
        }
    }

    /// Start the countdown (and media subscription) and hand back a guard that tears down on drop
    pub fn mount(self: Arc<Self>) -> Result<MountedDisplay> {
        let mut timers = lock(&self.timers, "timer")?;
        if self.is_torn_down() {
            return Err(DisplayError::TornDown);
        }

        let countdown_state = Arc::clone(&self);
        timers.countdown = Some(tokio::spawn(async move {
            countdown_ticker_task(countdown_state).await;
        }));

        if let Some(media) = &self.media {
            let events = media.subscribe();
            let media_state = Arc::clone(&self);
            timers.media_events = Some(tokio::spawn(async move {
                media_event_task(media_state, events).await;
            }));
        }
        drop(timers);

        info!(
            "Display mounted in {} mode, deadline {}",
            self.settings.mode.as_str(),
            self.snapshot()?.deadline
        );
        Ok(MountedDisplay { state: self })
    }

    /// Apply an update under the state's lock unless the display is torn down
    fn write<T, R>(
        &self,
        cell: &Mutex<T>,
        name: &'static str,
        update: impl FnOnce(&mut T) -> R,
    ) -> Result<R> {
        let mut guard = lock(cell, name)?;
        if self.is_torn_down() {
            return Err(DisplayError::TornDown);
        }
        let result = update(&mut guard);
        drop(guard);

        self.publish();
        Ok(result)
    }

    fn publish(&self) {
        match self.snapshot() {
            Ok(snapshot) => {
                self.snapshot_tx.send_replace(snapshot);
            }
            Err(e) => warn!("Failed to publish display snapshot: {}", e),
        }
    }

    fn record_action(&self, action: &str) {
        if let Ok(mut last) = self.last_action.lock() {
            *last = Some((action.to_string(), Utc::now()));
        }
    }

    fn ensure_live(&self) -> Result<()> {
        if self.is_torn_down() {
            Err(DisplayError::TornDown)
        } else {
            Ok(())
        }
    }

    /// One countdown tick against the current clock
    pub fn countdown_tick(&self) -> Result<TickOutcome> {
        let now = self.clock.now();
        let outcome = self.write(&self.countdown, "countdown", |c| c.tick(now))?;
        if let TickOutcome::RolledOver { deadline } = outcome {
            info!("Countdown deadline passed, pushed forward to {}", deadline);
        }
        Ok(outcome)
    }

    /// One mock progress tick
    pub fn advance_progress(&self) -> Result<f64> {
        self.write(&self.playback, "playback", |p| p.advance_mock())
    }

    /// Flip between playing and paused
    pub async fn toggle_playback(self: &Arc<Self>) -> Result<PlaybackStatus> {
        self.ensure_live()?;
        self.record_action("toggle");

        match &self.media {
            None => self.toggle_mock(),
            Some(media) => self.toggle_media(Arc::clone(media)).await,
        }
    }

    fn toggle_mock(self: &Arc<Self>) -> Result<PlaybackStatus> {
        // Holding the timer lock keeps a concurrent toggle or teardown from interleaving
        let mut timers = lock(&self.timers, "timer")?;
        let playing = self.write(&self.playback, "playback", |p| {
            let next = !p.is_playing();
            p.set_playing(next);
            next
        })?;

        if let Some(previous) = timers.progress.take() {
            previous.abort();
        }
        if playing {
            timers.progress = Some(spawn_progress_ticker(Arc::clone(self)));
            info!("Mock playback started");
            Ok(PlaybackStatus::Playing)
        } else {
            info!("Mock playback paused");
            Ok(PlaybackStatus::Paused)
        }
    }

    async fn toggle_media(&self, media: Arc<dyn MediaElement>) -> Result<PlaybackStatus> {
        let playing = lock(&self.playback, "playback")?.is_playing();

        if playing {
            if let Err(e) = media.pause().await {
                warn!("Media pause failed: {}", e);
            }
            self.write(&self.playback, "playback", |p| p.set_playing(false))?;
            return Ok(PlaybackStatus::Paused);
        }

        match media.play().await {
            Ok(()) => {
                self.write(&self.playback, "playback", |p| p.set_playing(true))?;
                info!("Media playback started");
                Ok(PlaybackStatus::Playing)
            }
            Err(e) => {
                // A rejected play leaves the player paused until the next user action
                warn!("Play request failed: {}", e);
                Ok(lock(&self.playback, "playback")?.status())
            }
        }
    }

    /// Jump to `position`, a fraction of the track (or bar) length
    pub fn seek(&self, position: f64) -> Result<()> {
        if !position.is_finite() {
            return Err(DisplayError::invalid_input("seek position must be a finite number"));
        }
        self.ensure_live()?;
        self.record_action("seek");
        let position = position.clamp(0.0, 1.0);

        match &self.media {
            None => self.write(&self.playback, "playback", |p| p.seek_mock(position)),
            Some(media) => {
                let duration = media.duration().ok_or(MediaError::MetadataUnavailable)?;
                let target = position * duration;
                media.set_current_time(target)?;
                self.write(&self.playback, "playback", |p| {
                    p.apply_media_event(&MediaEvent::TimeUpdate { current_time: target })
                })
            }
        }
    }

    /// Move the media position by `seconds`, clamped to the track
    pub fn skip(&self, seconds: f64) -> Result<f64> {
        if !seconds.is_finite() {
            return Err(DisplayError::invalid_input("skip offset must be a finite number"));
        }
        let Some(media) = &self.media else {
            return Err(DisplayError::UnsupportedMode(PlayerMode::Mock.as_str()));
        };
        self.ensure_live()?;
        self.record_action("skip");

        let duration = media.duration().ok_or(MediaError::MetadataUnavailable)?;
        let target = (media.current_time() + seconds).clamp(0.0, duration);
        media.set_current_time(target)?;
        self.write(&self.playback, "playback", |p| {
            p.apply_media_event(&MediaEvent::TimeUpdate { current_time: target })
        })?;
        Ok(target)
    }

    pub fn set_playback_rate(&self, rate: f64) -> Result<()> {
        self.write(&self.playback, "playback", |p| p.set_rate(rate))??;
        self.record_action("rate");
        if let Some(media) = &self.media {
            media.set_playback_rate(rate);
        }
        debug!("Playback rate set to {}", rate);
        Ok(())
    }

    /// Fold a media element notification into the player state
    pub fn handle_media_event(&self, event: &MediaEvent) -> Result<()> {
        self.write(&self.playback, "playback", |p| p.apply_media_event(event))
    }

    /// Register elements for a one-time reveal
    pub fn observe_for_reveal(&self, ids: Vec<String>) -> Result<usize> {
        self.write(&self.reveal, "reveal", |r| r.observe(ids))
    }

    /// Evaluate intersection entries; returns the ids revealed by this batch
    pub fn handle_intersections(
        &self,
        viewport_height: f64,
        entries: &[IntersectionEntry],
    ) -> Result<Vec<String>> {
        if !viewport_height.is_finite() || viewport_height < 0.0 {
            return Err(DisplayError::invalid_input(
                "viewport height must be a non-negative number",
            ));
        }
        self.write(&self.reveal, "reveal", |r| r.handle_entries(viewport_height, entries))
    }

    pub fn on_scroll(&self, scroll_top: f64) -> Result<HeaderState> {
        if !scroll_top.is_finite() {
            return Err(DisplayError::invalid_input("scroll offset must be a finite number"));
        }
        self.write(&self.header, "header", |h| {
            h.on_scroll(scroll_top);
            *h
        })
    }

    /// Current display values
    pub fn snapshot(&self) -> Result<DisplaySnapshot> {
        let countdown = lock(&self.countdown, "countdown")?;
        let playback = lock(&self.playback, "playback")?;
        let reveal = lock(&self.reveal, "reveal")?;
        let header = lock(&self.header, "header")?;
        Ok(DisplaySnapshot::capture(&countdown, &playback, &reveal, &header, self.is_torn_down()))
    }

    /// Receiver that observes every published snapshot
    pub fn subscribe(&self) -> watch::Receiver<DisplaySnapshot> {
        self.snapshot_tx.subscribe()
    }

    /// Number of live mock progress timers (0 or 1)
    pub fn active_progress_timers(&self) -> usize {
        lock(&self.timers, "timer").map(|t| usize::from(is_live(&t.progress))).unwrap_or(0)
    }

    /// Number of live timers of any kind
    pub fn active_timers(&self) -> usize {
        lock(&self.timers, "timer")
            .map(|t| {
                [&t.countdown, &t.progress, &t.media_events]
                    .into_iter()
                    .filter(|h| is_live(h))
                    .count()
            })
            .unwrap_or(0)
    }

    pub fn is_torn_down(&self) -> bool {
        self.torn_down.load(Ordering::SeqCst)
    }

    /// Cancel every timer and disconnect the observer; later writes are rejected
    pub fn teardown(&self) {
        if self.torn_down.swap(true, Ordering::SeqCst) {
            return;
        }

        // Wait out any writer that got its lock before the flag flipped
        drop(self.countdown.lock().unwrap_or_else(|p| p.into_inner()));
        drop(self.playback.lock().unwrap_or_else(|p| p.into_inner()));
        drop(self.header.lock().unwrap_or_else(|p| p.into_inner()));
        self.reveal.lock().unwrap_or_else(|p| p.into_inner()).disconnect();

        self.timers.lock().unwrap_or_else(|p| p.into_inner()).abort_all();

        self.snapshot_tx.send_modify(|s| s.torn_down = true);
        info!("Display torn down");
    }

    /// Calculate server uptime as a formatted string
    pub fn get_uptime(&self) -> String {
        let duration = self.start_time.elapsed();
        let hours = duration.as_secs() / 3600;
        let minutes = (duration.as_secs() % 3600) / 60;
        let seconds = duration.as_secs() % 60;

        if hours > 0 {
            format!("{}h {}m {}s", hours, minutes, seconds)
        } else if minutes > 0 {
            format!("{}m {}s", minutes, seconds)
        } else {
            format!("{}s", seconds)
        }
    }

    /// Get last action information
    pub fn get_last_action(&self) -> (Option<String>, Option<DateTime<Utc>>) {
        match self.last_action.lock().ok().and_then(|a| a.clone()) {
            Some((action, at)) => (Some(action), Some(at)),
            None => (None, None),
        }
    }
}

fn lock<'a, T>(cell: &'a Mutex<T>, name: &'static str) -> Result<MutexGuard<'a, T>> {
    cell.lock().map_err(|_| DisplayError::StatePoisoned(name))
}

/// A mounted display; dropping it tears the display down
#[derive(Debug)]
pub struct MountedDisplay {
    state: Arc<AppState>,
}

impl MountedDisplay {
    pub fn state(&self) -> Arc<AppState> {
        Arc::clone(&self.state)
    }
}

impl Deref for MountedDisplay {
    type Target = AppState;

    fn deref(&self) -> &AppState {
        &self.state
    }
}

impl Drop for MountedDisplay {
    fn drop(&mut self) {
        self.state.teardown();
    }
}
