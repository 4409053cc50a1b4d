//! State management module
//! 
//! This module contains all display state structures and their management logic.

pub mod app_state;
pub mod countdown_state;
pub mod header_state;
pub mod playback_state;
pub mod reveal_state;

// Re-export main types
pub use app_state::{AppState, DisplaySnapshot, MountedDisplay};
pub use countdown_state::{CountdownState, RemainingDuration, TickOutcome};
pub use header_state::{anchor_scroll_target, HeaderState};
pub use playback_state::{PlaybackState, PlaybackStatus, PLAYBACK_RATES};
pub use reveal_state::{IntersectionEntry, ObserverOptions, RevealState};
