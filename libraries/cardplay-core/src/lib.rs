//! cardplay Core
//!
//! Data holders shared by the cardplay playback system.
//!
//! This crate provides the building blocks a controller composes:
//! - **Media**: `MediaFile`, an immutable descriptor of a playable asset
//! - **Storage**: `StorageCard`, a bounded file collection with exclusive connection
//! - **Output**: `OutputDevice`, a named sink with master and per-channel volumes
//! - **Capability**: the `AudioDevice` trait shared by devices and controllers
//! - **Diagnostics**: `Rejection` for silently ignored operations, `CoreError` for
//!   construction failures
//!
//! # Example
//!
//! ```rust
//! use cardplay_core::{MediaFile, StorageCard};
//! use std::time::Duration;
//!
//! let card = StorageCard::new("SD", 20);
//! let song = MediaFile::new("SongOne", ".mp3", 5, Duration::from_secs(10)).unwrap();
//!
//! assert!(card.add_file(song));
//! assert_eq!(card.used_space_mb(), 5);
//! assert_eq!(card.list_files()[0].to_string(), "SongOne.mp3, 5MB, 10s");
//! ```

#![forbid(unsafe_code)]

pub mod error;
pub mod traits;
pub mod types;

// Re-export commonly used types
pub use error::{CoreError, Rejection, Result};
pub use traits::AudioDevice;
pub use types::{DeviceInfo, MediaFile, OutputDevice, StorageCard, Volume};
