//! Error and diagnostic types for cardplay
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Result type alias using `CoreError`
pub type Result<T> = std::result::Result<T, CoreError>;

/// Errors raised while constructing core entities
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CoreError {
    /// Invalid input
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

impl CoreError {
    /// Create an invalid input error
    pub fn invalid_input(msg: impl Into<String>) -> Self {
        Self::InvalidInput(msg.into())
    }
}

/// Reason an operation was ignored.
///
/// Rejected operations leave state untouched. The rejection is logged and,
/// for controllers, recorded as a playback event so observers can see it.
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Rejection {
    /// File does not fit in the remaining card capacity
    #[error("Not enough space to add file {file} ({required}MB needed, {available}MB free)")]
    InsufficientSpace {
        file: String,
        required: u64,
        available: u64,
    },

    /// Card is already held by another controller
    #[error("Memory card already connected to controller: {controller}")]
    AlreadyConnected { controller: String },

    /// Card refused the controller's connection
    #[error("Cannot connect memory card")]
    CardUnavailable,

    /// No card is connected
    #[error("No memory card inserted")]
    NoCard,

    /// Connected card holds no files
    #[error("No files to play")]
    NoFiles,

    /// Current file's extension is not supported by the controller
    #[error("Unsupported format: {extension}")]
    UnsupportedFormat { extension: String },

    /// Channel index outside the device's channel range
    #[error("Channel {channel} out of range ({channels} channels)")]
    ChannelOutOfRange { channel: usize, channels: usize },

    /// Volume level above 100
    #[error("Volume {level} out of range (0-100)")]
    VolumeOutOfRange { level: u8 },

    /// Controller already drives its maximum number of devices
    #[error("Device limit reached ({max} devices)")]
    DeviceLimitReached { max: usize },

    /// Seek target lies past the end of the current file
    #[error("Seek position {position}s beyond duration {duration}s")]
    SeekOutOfRange { position: u64, duration: u64 },

    /// No async runtime to schedule playback ticks on
    #[error("No async runtime available for playback")]
    NoRuntime,
}
