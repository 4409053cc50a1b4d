//! Background tasks module
//! 
//! Repeating timers and event listeners that drive the display state.

pub mod countdown_ticker;
pub mod media_events;
pub mod progress_ticker;

// Re-export main functions
pub use countdown_ticker::countdown_ticker_task;
pub use media_events::media_event_task;
pub use progress_ticker::spawn_progress_ticker;
