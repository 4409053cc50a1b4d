//! Player state: play/pause status and progress percentage

use serde::{Deserialize, Serialize};

use crate::{
    config::PlayerMode,
    error::{DisplayError, Result},
    host::MediaEvent,
};

/// Playback rates offered by the rate selector
pub const PLAYBACK_RATES: [f64; 6] = [0.5, 0.75, 1.0, 1.25, 1.5, 2.0];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PlaybackStatus {
    Paused,
    Playing,
}

/// Player state shared by the mock and media variants
#[derive(Debug, Clone, PartialEq)]
pub struct PlaybackState {
    mode: PlayerMode,
    status: PlaybackStatus,
    /// Synthetic percentage used in mock mode
    mock_progress: f64,
    step: f64,
    rate: f64,
    current_time: f64,
    duration: Option<f64>,
}

impl PlaybackState {
    pub fn new(mode: PlayerMode, initial_progress: f64, step: f64) -> Self {
        Self {
            mode,
            status: PlaybackStatus::Paused,
            mock_progress: initial_progress.clamp(0.0, 100.0),
            step,
            rate: 1.0,
            current_time: 0.0,
            duration: None,
        }
    }

    pub fn mode(&self) -> PlayerMode {
        self.mode
    }

    pub fn status(&self) -> PlaybackStatus {
        self.status
    }

    pub fn is_playing(&self) -> bool {
        self.status == PlaybackStatus::Playing
    }

    pub fn set_playing(&mut self, playing: bool) {
        self.status = if playing { PlaybackStatus::Playing } else { PlaybackStatus::Paused };
    }

    pub fn rate(&self) -> f64 {
        self.rate
    }

    pub fn current_time(&self) -> f64 {
        self.current_time
    }

    pub fn duration(&self) -> Option<f64> {
        self.duration
    }

    /// Progress percentage shown by the bar
    pub fn progress(&self) -> f64 {
        match self.mode {
            PlayerMode::Mock => self.mock_progress,
            PlayerMode::Media => match self.duration {
                Some(duration) if duration > 0.0 => {
                    (self.current_time / duration * 100.0).clamp(0.0, 100.0)
                }
                _ => 0.0,
            },
        }
    }

    /// One mock progress tick; wraps to 0 once the value passes 100
    pub fn advance_mock(&mut self) -> f64 {
        let next = self.mock_progress + self.step;
        self.mock_progress = if next > 100.0 { 0.0 } else { next };
        self.mock_progress
    }

    /// Jump the mock bar to `position` (fraction of the bar width)
    pub fn seek_mock(&mut self, position: f64) {
        self.mock_progress = position.clamp(0.0, 1.0) * 100.0;
    }

    pub fn set_rate(&mut self, rate: f64) -> Result<()> {
        if !PLAYBACK_RATES.contains(&rate) {
            return Err(DisplayError::invalid_input(format!("unsupported playback rate {}", rate)));
        }
        self.rate = rate;
        Ok(())
    }

    /// Fold a media notification into the state
    pub fn apply_media_event(&mut self, event: &MediaEvent) {
        match event {
            MediaEvent::Play => self.status = PlaybackStatus::Playing,
            MediaEvent::Pause | MediaEvent::Ended => self.status = PlaybackStatus::Paused,
            MediaEvent::TimeUpdate { current_time } => self.current_time = current_time.max(0.0),
            MediaEvent::LoadedMetadata { duration } => self.duration = Some(duration.max(0.0)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mock_progress_wraps_after_passing_hundred() {
        let mut playback = PlaybackState::new(PlayerMode::Mock, 99.0, 0.5);
        assert_eq!(playback.advance_mock(), 99.5);
        assert_eq!(playback.advance_mock(), 100.0);
        // 100.5 is never displayed
        assert_eq!(playback.advance_mock(), 0.0);
        assert_eq!(playback.advance_mock(), 0.5);
    }

    #[test]
    fn test_mock_seek_sets_percentage() {
        let mut playback = PlaybackState::new(PlayerMode::Mock, 35.0, 0.5);
        playback.seek_mock(0.25);
        assert_eq!(playback.progress(), 25.0);
        playback.seek_mock(3.0);
        assert_eq!(playback.progress(), 100.0);
    }

    #[test]
    fn test_media_progress_from_position() {
        let mut playback = PlaybackState::new(PlayerMode::Media, 35.0, 0.5);
        assert_eq!(playback.progress(), 0.0);

        playback.apply_media_event(&MediaEvent::LoadedMetadata { duration: 200.0 });
        playback.apply_media_event(&MediaEvent::TimeUpdate { current_time: 50.0 });
        assert_eq!(playback.progress(), 25.0);

        playback.apply_media_event(&MediaEvent::Play);
        assert!(playback.is_playing());
        playback.apply_media_event(&MediaEvent::Ended);
        assert_eq!(playback.status(), PlaybackStatus::Paused);
    }

    #[test]
    fn test_rate_must_be_offered() {
        let mut playback = PlaybackState::new(PlayerMode::Mock, 35.0, 0.5);
        assert!(playback.set_rate(1.25).is_ok());
        assert_eq!(playback.rate(), 1.25);
        assert!(matches!(playback.set_rate(3.0), Err(DisplayError::InvalidInput(_))));
        assert_eq!(playback.rate(), 1.25);
    }
}
