//! Configuration and CLI argument handling

use std::time::Duration;

use clap::{Parser, ValueEnum};
use serde::{Deserialize, Serialize};

/// Which progress source drives the "now playing" bar
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PlayerMode {
    /// Synthetic percentage that increments on a timer
    Mock,
    /// Progress derived from a media element's position and duration
    Media,
}

impl PlayerMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            PlayerMode::Mock => "mock",
            PlayerMode::Media => "media",
        }
    }
}

/// What happens when the countdown passes its deadline
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RolloverPolicy {
    /// Push the deadline forward by the rollover period and skip the tick
    Extend,
    /// Start a fresh countdown window and update immediately
    Restart,
}

/// CLI argument parsing structure
#[derive(Parser, Debug)]
#[command(name = "landing-display")]
#[command(about = "A state-managed HTTP server driving landing-page countdown displays")]
#[command(version = "1.0.0")]
pub struct Config {
    /// Port to bind the server to
    #[arg(short, long, default_value = "20554")]
    pub port: u16,

    /// Host address to bind to
    #[arg(long, default_value = "0.0.0.0")]
    pub host: String,

    /// Progress source for the player
    #[arg(short, long, value_enum, default_value = "mock")]
    pub mode: PlayerMode,

    /// Deadline rollover behavior
    #[arg(long, value_enum, default_value = "extend")]
    pub rollover: RolloverPolicy,

    /// Length of the countdown window in days
    #[arg(long, default_value = "15")]
    pub countdown_days: u64,

    /// Days added to an expired deadline
    #[arg(long, default_value = "30")]
    pub rollover_days: u64,

    /// Initial mock progress percentage
    #[arg(long, default_value = "35")]
    pub initial_progress: f64,

    /// Mock progress increment per tick
    #[arg(long, default_value = "0.5")]
    pub progress_step: f64,

    /// Tick interval in milliseconds
    #[arg(long, default_value = "1000")]
    pub tick_ms: u64,

    /// Duration of the simulated media track in seconds (media mode)
    #[arg(long, default_value = "600")]
    pub media_duration: f64,

    /// Reject play requests like a browser autoplay policy would
    #[arg(long)]
    pub block_autoplay: bool,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,
}

impl Config {
    /// Parse configuration from command line arguments
    pub fn parse() -> Self {
        Parser::parse()
    }

    /// Get the server address as a formatted string
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Get the appropriate log level based on verbose flag
    pub fn log_level(&self) -> &'static str {
        if self.verbose { "debug" } else { "info" }
    }

    /// Settings consumed by the display state
    pub fn display_settings(&self) -> DisplaySettings {
        DisplaySettings {
            mode: self.mode,
            rollover: self.rollover,
            countdown_days: self.countdown_days,
            rollover_days: self.rollover_days,
            initial_progress: self.initial_progress,
            progress_step: self.progress_step,
            tick_interval: Duration::from_millis(self.tick_ms.max(1)),
        }
    }
}

/// Runtime settings of a mounted display
#[derive(Debug, Clone, PartialEq)]
pub struct DisplaySettings {
    pub mode: PlayerMode,
    pub rollover: RolloverPolicy,
    pub countdown_days: u64,
    pub rollover_days: u64,
    pub initial_progress: f64,
    pub progress_step: f64,
    pub tick_interval: Duration,
}

impl Default for DisplaySettings {
    fn default() -> Self {
        Self {
            mode: PlayerMode::Mock,
            rollover: RolloverPolicy::Extend,
            countdown_days: 15,
            rollover_days: 30,
            initial_progress: 35.0,
            progress_step: 0.5,
            tick_interval: Duration::from_secs(1),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_args_parsing() {
        use clap::CommandFactory;
        Config::command().debug_assert();
    }

    #[test]
    fn test_defaults_match_display_defaults() {
        let config = Config::parse_from(["landing-display"]);
        assert_eq!(config.address(), "0.0.0.0:20554");
        assert_eq!(config.log_level(), "info");
        assert_eq!(config.display_settings(), DisplaySettings::default());
    }

    #[test]
    fn test_media_mode_and_verbose() {
        let config = Config::parse_from([
            "landing-display",
            "--mode",
            "media",
            "--rollover",
            "restart",
            "-v",
        ]);
        let settings = config.display_settings();
        assert_eq!(settings.mode, PlayerMode::Media);
        assert_eq!(settings.rollover, RolloverPolicy::Restart);
        assert_eq!(config.log_level(), "debug");
    }
}
