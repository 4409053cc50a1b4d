//! Text renderings of display state: zero-padded readouts, bar widths, m:ss times

use serde::{Deserialize, Serialize};

use crate::{
    config::PlayerMode,
    state::{DisplaySnapshot, PlaybackStatus, RemainingDuration},
};

/// Countdown fields as shown on the page
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CountdownReadout {
    pub days: String,
    pub hours: String,
    pub minutes: String,
    pub seconds: String,
}

impl From<RemainingDuration> for CountdownReadout {
    fn from(remaining: RemainingDuration) -> Self {
        Self {
            days: format!("{:02}", remaining.days),
            hours: format!("{:02}", remaining.hours),
            minutes: format!("{:02}", remaining.minutes),
            seconds: format!("{:02}", remaining.seconds),
        }
    }
}

/// Player bar and labels as shown on the page
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerReadout {
    pub mode: PlayerMode,
    pub status: PlaybackStatus,
    pub progress: f64,
    pub width: String,
    pub rate: f64,
    pub elapsed: Option<String>,
    pub total: Option<String>,
}

impl From<&DisplaySnapshot> for PlayerReadout {
    fn from(snapshot: &DisplaySnapshot) -> Self {
        let media = snapshot.mode == PlayerMode::Media;
        Self {
            mode: snapshot.mode,
            status: snapshot.status,
            progress: snapshot.progress,
            width: progress_width(snapshot.progress),
            rate: snapshot.rate,
            elapsed: media.then(|| format_time(snapshot.current_time)),
            total: if media { snapshot.duration.map(format_time) } else { None },
        }
    }
}

/// CSS width for the progress bar fill
pub fn progress_width(progress: f64) -> String {
    format!("{}%", progress)
}

/// `m:ss` rendering of a media position
pub fn format_time(seconds: f64) -> String {
    if !seconds.is_finite() || seconds < 0.0 {
        return "0:00".to_string();
    }
    let whole = seconds.floor() as u64;
    format!("{}:{:02}", whole / 60, whole % 60)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_countdown_fields_are_zero_padded() {
        let readout = CountdownReadout::from(RemainingDuration {
            days: 4,
            hours: 0,
            minutes: 7,
            seconds: 59,
        });
        assert_eq!(readout.days, "04");
        assert_eq!(readout.hours, "00");
        assert_eq!(readout.minutes, "07");
        assert_eq!(readout.seconds, "59");

        let long = CountdownReadout::from(RemainingDuration { days: 123, ..Default::default() });
        assert_eq!(long.days, "123");
    }

    #[test]
    fn test_progress_width() {
        assert_eq!(progress_width(35.0), "35%");
        assert_eq!(progress_width(35.5), "35.5%");
        assert_eq!(progress_width(0.0), "0%");
    }

    #[test]
    fn test_format_time() {
        assert_eq!(format_time(0.0), "0:00");
        assert_eq!(format_time(65.9), "1:05");
        assert_eq!(format_time(600.0), "10:00");
        assert_eq!(format_time(f64::NAN), "0:00");
    }
}
