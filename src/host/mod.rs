//! Host environment module
//!
//! Clock and media element primitives the display depends on.

pub mod clock;
pub mod media;

// Re-export main types
pub use clock::{Clock, ManualClock, SystemClock};
pub use media::{MediaElement, MediaEvent, SimulatedMedia};
