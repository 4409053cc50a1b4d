//! Header hide-on-scroll tracking and anchor scroll targets

use serde::{Deserialize, Serialize};

/// Height of the fixed header, subtracted from anchor scroll targets
pub const HEADER_HEIGHT: f64 = 70.0;

/// Scroll depth below which the header is always shown
pub const HIDE_AFTER: f64 = 100.0;

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct HeaderState {
    pub hidden: bool,
    pub last_scroll_top: f64,
}

impl HeaderState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Hide while scrolling down past the threshold, show on any upward scroll
    pub fn on_scroll(&mut self, scroll_top: f64) -> bool {
        self.hidden = scroll_top > self.last_scroll_top && scroll_top > HIDE_AFTER;
        self.last_scroll_top = scroll_top.max(0.0);
        self.hidden
    }
}

/// Scroll offset that puts an anchor target just below the fixed header
pub fn anchor_scroll_target(element_top: f64) -> f64 {
    (element_top - HEADER_HEIGHT).max(0.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_header_hides_on_downward_scroll() {
        let mut header = HeaderState::new();
        assert!(!header.on_scroll(80.0));
        assert!(header.on_scroll(150.0));
        assert!(header.on_scroll(400.0));
        assert!(!header.on_scroll(390.0));
        assert!(!header.on_scroll(-20.0));
        assert_eq!(header.last_scroll_top, 0.0);
    }

    #[test]
    fn test_anchor_target_accounts_for_header() {
        assert_eq!(anchor_scroll_target(1200.0), 1130.0);
        assert_eq!(anchor_scroll_target(30.0), 0.0);
    }
}
