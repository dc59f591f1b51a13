//! cardplay - Playback Control
//!
//! The controller and its tick-driven playback state machine.
//!
//! This crate provides:
//! - Storage card connection (exclusive, first come first served)
//! - Output device management (bounded by `max_devices`)
//! - Play/pause, next/previous, seek
//! - Auto-advance and auto-resume when a track finishes
//! - Event log and read-only snapshots for observers
//!
//! # Architecture
//!
//! A `Controller` owns one timer slot on the Tokio runtime. Starting playback
//! runs the first tick immediately and then one tick per `tick_interval`; each
//! tick advances the playhead by one second. Pausing cancels the pending
//! tick, and every timer task carries the playback generation it was started
//! for, so a task that wakes after a pause or restart does nothing.
//!
//! Rejected operations never return errors: they are no-ops that log a
//! warning and record a [`PlaybackEvent::Rejected`] event.
//!
//! # Example
//!
//! ```rust
//! use cardplay_core::{AudioDevice, MediaFile, OutputDevice, StorageCard};
//! use cardplay_playback::{Controller, PlaybackState};
//! use std::sync::Arc;
//! use std::time::Duration;
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() {
//! let card = Arc::new(StorageCard::new("SD", 20));
//! card.add_file(MediaFile::new("SongOne", ".mp3", 5, Duration::from_secs(10)).unwrap());
//!
//! let controller = Controller::new("MainController", [".mp3", ".wav"], 2);
//! controller.connect_card(&card);
//! controller.add_device(&Arc::new(OutputDevice::new("FrontSpeaker", 2)));
//! controller.set_volume(80);
//!
//! controller.toggle(); // play
//! assert_eq!(controller.playback_state(), PlaybackState::Playing);
//!
//! controller.toggle(); // pause
//! assert_eq!(controller.playback_state(), PlaybackState::Stopped);
//! assert_eq!(controller.elapsed_seconds(), 1);
//! # }
//! ```

mod controller;
mod events;
mod timer;
pub mod types;

// Public exports
pub use controller::{Controller, MAX_PENDING_EVENTS};
pub use events::PlaybackEvent;
pub use types::{ControllerSnapshot, PlaybackConfig, PlaybackState};
