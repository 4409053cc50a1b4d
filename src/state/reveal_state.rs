//! One-shot scroll reveal tracking

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};
use tracing::debug;

/// Intersection configuration: visible fraction and bottom root margin in pixels
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ObserverOptions {
    pub threshold: f64,
    pub root_margin_bottom: f64,
}

impl Default for ObserverOptions {
    fn default() -> Self {
        Self {
            threshold: 0.1,
            root_margin_bottom: -50.0,
        }
    }
}

/// Position of an observed element relative to the top of the viewport
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IntersectionEntry {
    pub id: String,
    pub top: f64,
    pub height: f64,
}

impl ObserverOptions {
    /// Fraction of the element inside the margin-adjusted viewport
    pub fn intersection_ratio(&self, viewport_height: f64, entry: &IntersectionEntry) -> f64 {
        let root_bottom = viewport_height + self.root_margin_bottom;
        let bottom = entry.top + entry.height;
        let visible = bottom.min(root_bottom) - entry.top.max(0.0);

        if entry.height <= 0.0 {
            return if entry.top >= 0.0 && entry.top <= root_bottom { 1.0 } else { 0.0 };
        }
        (visible / entry.height).clamp(0.0, 1.0)
    }

    pub fn is_intersecting(&self, viewport_height: f64, entry: &IntersectionEntry) -> bool {
        let ratio = self.intersection_ratio(viewport_height, entry);
        ratio > 0.0 && ratio >= self.threshold
    }
}

/// Reveal flags for every registered element
#[derive(Debug, Clone, PartialEq)]
pub struct RevealState {
    options: ObserverOptions,
    revealed: BTreeMap<String, bool>,
    observing: BTreeSet<String>,
    connected: bool,
}

impl RevealState {
    pub fn new(options: ObserverOptions) -> Self {
        Self {
            options,
            revealed: BTreeMap::new(),
            observing: BTreeSet::new(),
            connected: true,
        }
    }

    pub fn options(&self) -> ObserverOptions {
        self.options
    }

    /// Start watching elements; returns how many were newly registered
    pub fn observe<I, S>(&mut self, ids: I) -> usize
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        if !self.connected {
            return 0;
        }

        let mut added = 0;
        for id in ids {
            let id = id.into();
            if self.revealed.contains_key(&id) {
                continue;
            }
            self.revealed.insert(id.clone(), false);
            self.observing.insert(id);
            added += 1;
        }
        added
    }

    /// Process a batch of intersection entries; returns ids revealed by this batch
    pub fn handle_entries(
        &mut self,
        viewport_height: f64,
        entries: &[IntersectionEntry],
    ) -> Vec<String> {
        if !self.connected {
            return Vec::new();
        }

        let mut newly_revealed = Vec::new();
        for entry in entries {
            if !self.observing.contains(&entry.id) {
                continue;
            }
            if self.options.is_intersecting(viewport_height, entry) {
                self.observing.remove(&entry.id);
                self.revealed.insert(entry.id.clone(), true);
                debug!("Revealed element {}", entry.id);
                newly_revealed.push(entry.id.clone());
            }
        }
        newly_revealed
    }

    pub fn is_revealed(&self, id: &str) -> Option<bool> {
        self.revealed.get(id).copied()
    }

    pub fn observing_count(&self) -> usize {
        self.observing.len()
    }

    pub fn is_connected(&self) -> bool {
        self.connected
    }

    pub fn elements(&self) -> &BTreeMap<String, bool> {
        &self.revealed
    }

    /// Stop all observation; later entries are ignored
    pub fn disconnect(&mut self) {
        self.observing.clear();
        self.connected = false;
    }
}

impl Default for RevealState {
    fn default() -> Self {
        Self::new(ObserverOptions::default())
    }
}
