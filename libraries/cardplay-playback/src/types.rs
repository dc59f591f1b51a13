//! Core types for playback control

use cardplay_core::MediaFile;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Controller playback state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PlaybackState {
    /// No card connected, or the card holds no files
    Idle,

    /// Card with files present, not playing
    Stopped,

    /// Tick loop active
    Playing,
}

/// Configuration for a controller
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlaybackConfig {
    /// Time between playback ticks in milliseconds (default: 1000)
    pub tick_interval_ms: u64,

    /// Delay before auto-resuming the next track in milliseconds (default: 1000)
    pub resume_delay_ms: u64,

    /// Advance and resume automatically when a track finishes (default: true)
    pub auto_play: bool,

    /// Initial master volume (0-100, default: 100)
    pub volume: u8,
}

impl PlaybackConfig {
    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.tick_interval_ms)
    }

    pub fn resume_delay(&self) -> Duration {
        Duration::from_millis(self.resume_delay_ms)
    }
}

impl Default for PlaybackConfig {
    fn default() -> Self {
        Self {
            tick_interval_ms: 1000,
            resume_delay_ms: 1000,
            auto_play: true,
            volume: 100,
        }
    }
}

/// Read-only view of a controller, for observers and tests
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ControllerSnapshot {
    pub name: String,
    pub card_connected: bool,
    pub device_names: Vec<String>,
    pub master_volume: u8,
    pub current_file: Option<MediaFile>,
    pub elapsed_seconds: u64,
    pub is_playing: bool,
    pub auto_play: bool,
    pub state: PlaybackState,
}
