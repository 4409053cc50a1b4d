//! API request and response structures

use std::collections::BTreeMap;

use chrono::{DateTime, FixedOffset, Utc};
use serde::{Deserialize, Serialize};

use crate::{
    render::{CountdownReadout, PlayerReadout},
    state::{DisplaySnapshot, HeaderState, IntersectionEntry, RemainingDuration},
};

/// Response structure for state-changing endpoints
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    pub status: String,
    pub message: String,
    pub timestamp: DateTime<Utc>,
    pub data: T,
}

impl<T> ApiResponse<T> {
    pub fn ok(message: impl Into<String>, data: T) -> Self {
        Self {
            status: "ok".to_string(),
            message: message.into(),
            timestamp: Utc::now(),
            data,
        }
    }
}

/// Body returned with every non-2xx status
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub status: String,
    pub message: String,
    pub timestamp: DateTime<Utc>,
}

impl ErrorResponse {
    pub fn new(message: String) -> Self {
        Self {
            status: "error".to_string(),
            message,
            timestamp: Utc::now(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CountdownResponse {
    pub readout: CountdownReadout,
    pub remaining: RemainingDuration,
    pub deadline: DateTime<FixedOffset>,
    pub rollovers: u32,
}

impl From<&DisplaySnapshot> for CountdownResponse {
    fn from(snapshot: &DisplaySnapshot) -> Self {
        Self {
            readout: snapshot.remaining.into(),
            remaining: snapshot.remaining,
            deadline: snapshot.deadline,
            rollovers: snapshot.rollovers,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RevealResponse {
    /// Elements revealed by this request
    pub revealed_now: Vec<String>,
    pub elements: BTreeMap<String, bool>,
}

/// Full status with server metadata
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusResponse {
    pub countdown: CountdownResponse,
    pub player: PlayerReadout,
    pub revealed: BTreeMap<String, bool>,
    pub header: HeaderState,
    pub active_timers: usize,
    pub torn_down: bool,
    pub uptime: String,
    pub port: u16,
    pub host: String,
    pub last_action: Option<String>,
    pub last_action_time: Option<DateTime<Utc>>,
}

/// Health check response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub timestamp: DateTime<Utc>,
    pub version: String,
}

impl HealthResponse {
    pub fn ok() -> Self {
        Self {
            status: "ok".to_string(),
            timestamp: Utc::now(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct SeekRequest {
    /// Fraction of the track, 0.0 to 1.0
    pub position: f64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RateRequest {
    pub rate: f64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SkipRequest {
    pub seconds: f64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ObserveRequest {
    pub elements: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct IntersectionRequest {
    pub viewport_height: f64,
    pub entries: Vec<IntersectionEntry>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ScrollRequest {
    pub scroll_top: f64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AnchorRequest {
    pub element_top: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnchorResponse {
    pub scroll_top: f64,
}
