//! Landing Display - A state-managed HTTP server for landing-page display state
//! 
//! This library owns the countdown readout, the "now playing" progress bar
//! (mock or media backed), one-shot scroll reveals and header visibility of a
//! promotional landing page, and serves them to a rendering layer.

pub mod config;
pub mod error;
pub mod host;
pub mod state;
pub mod render;
pub mod api;
pub mod tasks;
pub mod utils;

// Re-export commonly used types
pub use config::{Config, DisplaySettings, PlayerMode, RolloverPolicy};
pub use error::{DisplayError, MediaError};
pub use state::{AppState, DisplaySnapshot, MountedDisplay};
pub use api::create_router;
pub use utils::signals::shutdown_signal;
