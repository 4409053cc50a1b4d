//! Error types for display state operations

use thiserror::Error;

/// Errors raised by the display state and its HTTP surface
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DisplayError {
    /// The display has been torn down; no further writes are accepted
    #[error("display has been torn down")]
    TornDown,

    /// A state mutex was poisoned by a panicking writer
    #[error("failed to lock {0} state")]
    StatePoisoned(&'static str),

    /// The operation is only available for the other player mode
    #[error("operation not supported in {0} mode")]
    UnsupportedMode(&'static str),

    /// Caller supplied a value outside the accepted domain
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// The media element reported a failure
    #[error(transparent)]
    Media(#[from] MediaError),
}

impl DisplayError {
    pub fn invalid_input(msg: impl Into<String>) -> Self {
        Self::InvalidInput(msg.into())
    }
}

/// Failures reported by a media element
#[derive(Error, Debug, Clone, PartialEq)]
pub enum MediaError {
    /// The host refused to start playback (autoplay policy and similar)
    #[error("play request rejected: {0}")]
    PlayRejected(String),

    /// Duration is not known yet (metadata not loaded)
    #[error("media metadata not loaded")]
    MetadataUnavailable,

    #[error("media element unavailable: {0}")]
    Unavailable(String),
}

pub type Result<T> = std::result::Result<T, DisplayError>;
