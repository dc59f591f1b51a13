//! Playback Events
//!
//! Every observable step of a controller is recorded as an event:
//! - Connection changes (card, devices)
//! - State changes (started, paused, finished, stopped)
//! - Progress updates (one per tick)
//! - Rejected operations, with the reason

use cardplay_core::Rejection;
use serde::{Deserialize, Serialize};

/// Events emitted by a controller
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum PlaybackEvent {
    /// A storage card was connected
    CardConnected {
        /// Card type label
        card_type: String,
    },

    /// The storage card was disconnected
    CardDisconnected,

    /// An output device was attached
    DeviceAdded {
        /// Device name
        name: String,
    },

    /// Playback started or resumed
    Started {
        /// File name with extension
        file: String,
        /// Position in seconds
        elapsed_seconds: u64,
    },

    /// One tick of playback progress
    Progress {
        /// File name with extension
        file: String,
        /// Position in seconds before this tick
        elapsed_seconds: u64,
        /// Track duration in seconds
        duration_seconds: u64,
    },

    /// Playback paused by the user
    Paused {
        /// Position in seconds
        elapsed_seconds: u64,
    },

    /// Track reached its end
    Finished {
        /// File name with extension
        file: String,
    },

    /// Playback stopped because the card went away
    Stopped,

    /// Current index moved
    TrackChanged {
        /// New index on the card
        index: usize,
        /// File at the new index
        file: Option<String>,
    },

    /// Playhead moved within the current track
    Seeked {
        /// New position in seconds
        elapsed_seconds: u64,
    },

    /// Master volume changed
    VolumeChanged {
        /// New level (0-100)
        level: u8,
    },

    /// An operation was ignored
    Rejected {
        /// Why it was ignored
        reason: Rejection,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serializes_with_type_tag() {
        let event = PlaybackEvent::Progress {
            file: "SongOne.mp3".to_string(),
            elapsed_seconds: 3,
            duration_seconds: 10,
        };
        let json = serde_json::to_value(&event).unwrap();

        assert_eq!(json["type"], "progress");
        assert_eq!(json["file"], "SongOne.mp3");
        assert_eq!(json["elapsed_seconds"], 3);
    }

    #[test]
    fn rejected_event_carries_reason() {
        let event = PlaybackEvent::Rejected {
            reason: Rejection::NoFiles,
        };
        let json = serde_json::to_value(&event).unwrap();

        assert_eq!(json["type"], "rejected");
        assert_eq!(json["reason"]["kind"], "no_files");
    }
}
