//! Removable storage card
//!
//! A card holds an ordered, capacity-bounded list of media files and can be
//! connected to at most one controller at a time.

use crate::error::Rejection;
use crate::traits::AudioDevice;
use crate::types::MediaFile;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};
use tracing::{debug, warn};

/// Storage card holding media files
///
/// Shared between the composing application and a controller via `Arc`.
/// The back-reference to the connected controller is weak, so a card never
/// keeps its controller alive.
pub struct StorageCard {
    card_type: String,
    capacity_mb: u64,
    state: Mutex<CardState>,
}

#[derive(Default)]
struct CardState {
    files: Vec<MediaFile>,
    used_space_mb: u64,
    connected: Option<Weak<dyn AudioDevice>>,
}

impl CardState {
    fn live_controller(&self) -> Option<Arc<dyn AudioDevice>> {
        self.connected.as_ref().and_then(Weak::upgrade)
    }
}

impl StorageCard {
    /// Create an empty card of the given type and capacity
    pub fn new(card_type: impl Into<String>, capacity_mb: u64) -> Self {
        Self {
            card_type: card_type.into(),
            capacity_mb,
            state: Mutex::new(CardState::default()),
        }
    }

    fn state(&self) -> MutexGuard<'_, CardState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Card type label (e.g. "SD")
    pub fn card_type(&self) -> &str {
        &self.card_type
    }

    /// Total capacity in megabytes
    pub fn capacity_mb(&self) -> u64 {
        self.capacity_mb
    }

    /// Space taken by admitted files in megabytes
    pub fn used_space_mb(&self) -> u64 {
        self.state().used_space_mb
    }

    /// Remaining capacity in megabytes
    pub fn free_space_mb(&self) -> u64 {
        self.capacity_mb - self.used_space_mb()
    }

    /// Add a file if it fits in the remaining capacity
    ///
    /// Files that do not fit are ignored. Returns whether the file was admitted.
    pub fn add_file(&self, file: MediaFile) -> bool {
        let mut state = self.state();
        let available = self.capacity_mb - state.used_space_mb;

        if file.size_mb() > available {
            let rejection = Rejection::InsufficientSpace {
                file: file.name().to_string(),
                required: file.size_mb(),
                available,
            };
            warn!(card = %self.card_type, "{}", rejection);
            return false;
        }

        debug!(card = %self.card_type, file = %file, "File added");
        state.used_space_mb += file.size_mb();
        state.files.push(file);
        true
    }

    /// Snapshot of the files on the card
    pub fn list_files(&self) -> Vec<MediaFile> {
        self.state().files.clone()
    }

    /// Number of files on the card
    pub fn file_count(&self) -> usize {
        self.state().files.len()
    }

    /// File at `index`, if any
    pub fn file_at(&self, index: usize) -> Option<MediaFile> {
        self.state().files.get(index).cloned()
    }

    /// Connect the card to a controller
    ///
    /// First come, first served: fails while another live controller holds
    /// the card and leaves that connection in place.
    pub fn connect(&self, controller: Weak<dyn AudioDevice>) -> bool {
        let mut state = self.state();

        if let Some(current) = state.live_controller() {
            let rejection = Rejection::AlreadyConnected {
                controller: current.name().to_string(),
            };
            warn!(card = %self.card_type, "{}", rejection);
            return false;
        }

        state.connected = Some(controller);
        true
    }

    /// Drop the controller connection (idempotent)
    pub fn disconnect(&self) {
        self.state().connected = None;
    }

    /// Controller currently holding the card
    pub fn connected_controller(&self) -> Option<Arc<dyn AudioDevice>> {
        self.state().live_controller()
    }

    pub fn is_connected(&self) -> bool {
        self.connected_controller().is_some()
    }
}

impl std::fmt::Debug for StorageCard {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.state();
        f.debug_struct("StorageCard")
            .field("card_type", &self.card_type)
            .field("capacity_mb", &self.capacity_mb)
            .field("used_space_mb", &state.used_space_mb)
            .field("files", &state.files.len())
            .field(
                "connected_to",
                &state.live_controller().map(|c| c.name().to_string()),
            )
            .finish()
    }
}
