//! Controller - playback orchestration
//!
//! Connects one storage card and a bounded set of output devices, and runs
//! the tick-driven playback state machine over the card's files.

use crate::{
    events::PlaybackEvent,
    timer::Timer,
    types::{ControllerSnapshot, PlaybackConfig, PlaybackState},
};
use cardplay_core::{AudioDevice, MediaFile, OutputDevice, Rejection, StorageCard, Volume};
use std::collections::{BTreeSet, VecDeque};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};
use std::time::Duration;
use tokio::runtime::Handle;
use tracing::{debug, info, warn};

/// Oldest events are dropped once this many are waiting to be drained
pub const MAX_PENDING_EVENTS: usize = 1024;

/// Audio controller
///
/// Cheap to clone: every clone is a handle to the same controller. Cards and
/// devices only hold weak references back to it, so dropping the last handle
/// releases them and cancels any pending tick.
///
/// Playback needs a Tokio runtime; `toggle` is rejected outside of one.
#[derive(Clone)]
pub struct Controller {
    shared: Arc<ControllerShared>,
}

struct ControllerShared {
    name: String,
    config: PlaybackConfig,
    state: Mutex<ControllerState>,
}

struct ControllerState {
    volume: Volume,
    supported_extensions: BTreeSet<String>,
    max_devices: usize,
    card: Option<Arc<StorageCard>>,
    devices: Vec<Arc<OutputDevice>>,
    current_index: usize,
    elapsed_seconds: u64,
    is_playing: bool,
    auto_play: bool,
    timer: Timer,
    // Bumped on every start, pause, finish and card removal. Timer tasks
    // only act while it still matches the value they were spawned with.
    generation: u64,
    pending_events: VecDeque<PlaybackEvent>,
}

/// Result of one playback tick
enum Tick {
    Continue,
    Finished,
}

#[derive(Clone, Copy)]
enum Direction {
    Next,
    Previous,
}

impl ControllerShared {
    fn lock(&self) -> MutexGuard<'_, ControllerState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl ControllerState {
    fn emit(&mut self, event: PlaybackEvent) {
        if self.pending_events.len() >= MAX_PENDING_EVENTS {
            self.pending_events.pop_front();
        }
        self.pending_events.push_back(event);
    }

    fn next_generation(&mut self) -> u64 {
        self.generation = self.generation.wrapping_add(1);
        self.generation
    }

    fn current_index(&self) -> usize {
        match self.file_count() {
            0 => self.current_index,
            count => self.current_index % count,
        }
    }

    fn file_count(&self) -> usize {
        self.card.as_ref().map_or(0, |card| card.file_count())
    }

    /// File under the playhead
    ///
    /// The index wraps when a card with fewer files replaced a longer one.
    fn current_file(&self) -> Option<MediaFile> {
        let card = self.card.as_ref()?;
        let count = card.file_count();
        if count == 0 {
            return None;
        }
        card.file_at(self.current_index % count)
    }

    /// Current file, if playback may start or pause on it
    fn playable_file(&self) -> Result<MediaFile, Rejection> {
        if self.card.is_none() {
            return Err(Rejection::NoCard);
        }
        let file = self.current_file().ok_or(Rejection::NoFiles)?;
        if !self.supported_extensions.contains(file.extension()) {
            return Err(Rejection::UnsupportedFormat {
                extension: file.extension().to_string(),
            });
        }
        Ok(file)
    }

    fn playback_state(&self) -> PlaybackState {
        if self.is_playing {
            PlaybackState::Playing
        } else if self.file_count() == 0 {
            PlaybackState::Idle
        } else {
            PlaybackState::Stopped
        }
    }
}

impl Controller {
    /// Create a controller with the default playback configuration
    pub fn new<I, S>(name: impl Into<String>, supported_extensions: I, max_devices: usize) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::with_config(
            name,
            supported_extensions,
            max_devices,
            PlaybackConfig::default(),
        )
    }

    /// Create a controller with an explicit playback configuration
    pub fn with_config<I, S>(
        name: impl Into<String>,
        supported_extensions: I,
        max_devices: usize,
        config: PlaybackConfig,
    ) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let state = ControllerState {
            volume: Volume::new(config.volume),
            supported_extensions: supported_extensions.into_iter().map(Into::into).collect(),
            max_devices,
            card: None,
            devices: Vec::new(),
            current_index: 0,
            elapsed_seconds: 0,
            is_playing: false,
            auto_play: config.auto_play,
            timer: Timer::default(),
            generation: 0,
            pending_events: VecDeque::new(),
        };

        Self {
            shared: Arc::new(ControllerShared {
                name: name.into(),
                config,
                state: Mutex::new(state),
            }),
        }
    }

    fn lock(&self) -> MutexGuard<'_, ControllerState> {
        self.shared.lock()
    }

    fn weak_device(&self) -> Weak<dyn AudioDevice> {
        Arc::downgrade(&self.shared) as Weak<dyn AudioDevice>
    }

    fn reject(&self, state: &mut ControllerState, reason: Rejection) {
        warn!(controller = %self.shared.name, "{}", reason);
        state.emit(PlaybackEvent::Rejected { reason });
    }

    pub fn config(&self) -> &PlaybackConfig {
        &self.shared.config
    }

    // ===== Card =====

    /// Connect a storage card
    ///
    /// Fails when the card is held by another controller; the current card,
    /// if any, stays connected in that case. Playback state is not reset.
    pub fn connect_card(&self, card: &Arc<StorageCard>) -> bool {
        let mut state = self.lock();

        if !card.connect(self.weak_device()) {
            self.reject(&mut state, Rejection::CardUnavailable);
            return false;
        }

        if let Some(previous) = state.card.replace(Arc::clone(card)) {
            if !Arc::ptr_eq(&previous, card) {
                previous.disconnect();
            }
        }

        info!(controller = %self.shared.name, card = %card.card_type(), "Memory card connected");
        state.emit(PlaybackEvent::CardConnected {
            card_type: card.card_type().to_string(),
        });
        true
    }

    /// Disconnect the storage card
    ///
    /// Stops playback and cancels any pending tick or auto-resume.
    pub fn disconnect_card(&self) {
        let mut state = self.lock();
        let Some(card) = state.card.take() else {
            return;
        };

        card.disconnect();
        state.timer.cancel();
        state.next_generation();
        if state.is_playing {
            state.is_playing = false;
            info!(controller = %self.shared.name, "Playback stopped, card removed");
            state.emit(PlaybackEvent::Stopped);
        }

        info!(controller = %self.shared.name, card = %card.card_type(), "Memory card disconnected");
        state.emit(PlaybackEvent::CardDisconnected);
    }

    /// Connected storage card
    pub fn card(&self) -> Option<Arc<StorageCard>> {
        self.lock().card.clone()
    }

    // ===== Devices =====

    /// Attach an output device
    ///
    /// Ignored once `max_devices` devices are attached.
    pub fn add_device(&self, device: &Arc<OutputDevice>) -> bool {
        let mut state = self.lock();

        if state.devices.len() >= state.max_devices {
            let max = state.max_devices;
            self.reject(&mut state, Rejection::DeviceLimitReached { max });
            return false;
        }

        device.connect(self.weak_device());
        state.devices.push(Arc::clone(device));
        debug!(controller = %self.shared.name, device = %device.name(), "Device added");
        state.emit(PlaybackEvent::DeviceAdded {
            name: device.name().to_string(),
        });
        true
    }

    pub fn devices(&self) -> Vec<Arc<OutputDevice>> {
        self.lock().devices.clone()
    }

    pub fn device_names(&self) -> Vec<String> {
        self.lock()
            .devices
            .iter()
            .map(|d| d.name().to_string())
            .collect()
    }

    pub fn max_devices(&self) -> usize {
        self.lock().max_devices
    }

    // ===== Formats =====

    /// Check whether files with `extension` can be played
    pub fn supports(&self, extension: &str) -> bool {
        self.lock().supported_extensions.contains(extension)
    }

    /// Allow an extension (e.g. `".flac"`)
    ///
    /// Only consulted when playback is toggled; a playing file is unaffected.
    pub fn add_supported_extension(&self, extension: impl Into<String>) {
        self.lock().supported_extensions.insert(extension.into());
    }

    /// Disallow an extension
    ///
    /// Only consulted when playback is toggled; a playing file keeps playing.
    pub fn remove_supported_extension(&self, extension: &str) {
        self.lock().supported_extensions.remove(extension);
    }

    pub fn supported_extensions(&self) -> Vec<String> {
        self.lock().supported_extensions.iter().cloned().collect()
    }

    // ===== Playback Control =====

    /// Play or pause
    ///
    /// Rejected when no card is connected, the card is empty, or the current
    /// file's format is unsupported; this check applies to pausing as well.
    ///
    /// Starting plays the first tick immediately and then one tick per
    /// `tick_interval`. Each tick reports progress and advances the playhead
    /// by one second until the track's duration is reached.
    pub fn toggle(&self) {
        let mut state = self.lock();
        self.toggle_locked(&mut state);
    }

    fn toggle_locked(&self, state: &mut ControllerState) {
        let file = match state.playable_file() {
            Ok(file) => file,
            Err(reason) => {
                self.reject(state, reason);
                return;
            }
        };

        if state.is_playing {
            state.timer.cancel();
            state.next_generation();
            state.is_playing = false;
            let elapsed_seconds = state.elapsed_seconds;
            info!(controller = %self.shared.name, "Paused at {}s", elapsed_seconds);
            state.emit(PlaybackEvent::Paused { elapsed_seconds });
            return;
        }

        let Ok(runtime) = Handle::try_current() else {
            self.reject(state, Rejection::NoRuntime);
            return;
        };

        // Drops a pending auto-resume
        state.timer.cancel();
        let generation = state.next_generation();
        state.is_playing = true;
        info!(controller = %self.shared.name, file = %file.file_name(), "Playback started");
        let elapsed_seconds = state.elapsed_seconds;
        state.emit(PlaybackEvent::Started {
            file: file.file_name(),
            elapsed_seconds,
        });

        match self.tick(state, &file) {
            Tick::Continue => {
                let task = run_tick_loop(
                    Arc::downgrade(&self.shared),
                    file,
                    runtime.clone(),
                    self.shared.config.tick_interval(),
                    generation,
                );
                state.timer.start(runtime.spawn(task));
            }
            Tick::Finished => self.finish(state, &runtime),
        }
    }

    /// Advance the playhead by one tick of `file`
    ///
    /// `file` is the file captured when playback started, which is not
    /// necessarily the current file after `next`/`prev`.
    fn tick(&self, state: &mut ControllerState, file: &MediaFile) -> Tick {
        let duration_seconds = file.duration().as_secs();

        if Duration::from_secs(state.elapsed_seconds) >= file.duration() {
            info!(controller = %self.shared.name, file = %file.file_name(), "Finished playing");
            state.emit(PlaybackEvent::Finished {
                file: file.file_name(),
            });
            state.elapsed_seconds = 0;
            state.is_playing = false;
            state.next_generation();
            return Tick::Finished;
        }

        info!(
            controller = %self.shared.name,
            "Playing {} - {} / {}",
            file.name(),
            state.elapsed_seconds,
            duration_seconds
        );
        state.emit(PlaybackEvent::Progress {
            file: file.file_name(),
            elapsed_seconds: state.elapsed_seconds,
            duration_seconds,
        });
        state.elapsed_seconds += 1;
        Tick::Continue
    }

    /// Tick driven by the timer task; returns whether to keep ticking
    ///
    /// A task whose playback was paused or restarted after it woke up may
    /// still win the lock before its abort lands. It sees a newer generation
    /// and stops.
    fn tick_from_timer(&self, file: &MediaFile, runtime: &Handle, generation: u64) -> bool {
        let mut state = self.lock();
        if !state.is_playing || state.generation != generation {
            return false;
        }

        match self.tick(&mut state, file) {
            Tick::Continue => true,
            Tick::Finished => {
                // This task is the pending timer and is about to end
                state.timer.release();
                self.finish(&mut state, runtime);
                false
            }
        }
    }

    /// Auto-advance after a finished track
    fn finish(&self, state: &mut ControllerState, runtime: &Handle) {
        if !state.auto_play {
            return;
        }

        self.step(state, Direction::Next);

        let weak = Arc::downgrade(&self.shared);
        let delay = self.shared.config.resume_delay();
        let generation = state.generation;
        state.timer.start(runtime.spawn(async move {
            tokio::time::sleep(delay).await;
            if let Some(shared) = weak.upgrade() {
                (Controller { shared }).resume_from_timer(generation);
            }
        }));
    }

    /// Auto-resume driven by the timer task
    ///
    /// Does nothing if playback was started, paused or the card removed
    /// since the track finished.
    fn resume_from_timer(&self, generation: u64) {
        let mut state = self.lock();
        if state.generation != generation {
            return;
        }

        // This task is the pending timer and is about to end
        state.timer.release();
        self.toggle_locked(&mut state);
    }

    /// Skip to the next file, wrapping around
    ///
    /// Resets the playhead but does not start or stop playback. A running
    /// tick loop keeps playing the file it started with.
    pub fn next(&self) {
        let mut state = self.lock();
        self.step(&mut state, Direction::Next);
    }

    /// Go back to the previous file, wrapping around
    ///
    /// Same playback caveats as [`Controller::next`].
    pub fn prev(&self) {
        let mut state = self.lock();
        self.step(&mut state, Direction::Previous);
    }

    fn step(&self, state: &mut ControllerState, direction: Direction) {
        state.elapsed_seconds = 0;

        let count = state.file_count();
        if count == 0 {
            return;
        }

        let index = state.current_index % count;
        state.current_index = match direction {
            Direction::Next => (index + 1) % count,
            Direction::Previous => (index + count - 1) % count,
        };

        let file = state.current_file().map(|f| f.file_name());
        debug!(
            controller = %self.shared.name,
            index = state.current_index,
            file = ?file,
            "Track changed"
        );
        let index = state.current_index;
        state.emit(PlaybackEvent::TrackChanged { index, file });
    }

    /// Move the playhead within the current file
    ///
    /// Rejected when there is no current file or `seconds` is past its end.
    /// Does not start or stop playback.
    pub fn seek(&self, seconds: u64) -> bool {
        let mut state = self.lock();

        let Some(file) = state.current_file() else {
            let reason = if state.card.is_none() {
                Rejection::NoCard
            } else {
                Rejection::NoFiles
            };
            self.reject(&mut state, reason);
            return false;
        };

        if Duration::from_secs(seconds) > file.duration() {
            let duration = file.duration().as_secs();
            self.reject(
                &mut state,
                Rejection::SeekOutOfRange {
                    position: seconds,
                    duration,
                },
            );
            return false;
        }

        state.elapsed_seconds = seconds;
        state.emit(PlaybackEvent::Seeked {
            elapsed_seconds: seconds,
        });
        true
    }

    // ===== Settings =====

    pub fn set_auto_play(&self, enabled: bool) {
        self.lock().auto_play = enabled;
    }

    pub fn auto_play(&self) -> bool {
        self.lock().auto_play
    }

    // ===== State =====

    pub fn playback_state(&self) -> PlaybackState {
        self.lock().playback_state()
    }

    pub fn is_playing(&self) -> bool {
        self.lock().is_playing
    }

    /// Playhead position in seconds
    pub fn elapsed_seconds(&self) -> u64 {
        self.lock().elapsed_seconds
    }

    /// Index of the current file, always within the connected card's files
    pub fn current_index(&self) -> usize {
        self.lock().current_index()
    }

    pub fn current_file(&self) -> Option<MediaFile> {
        self.lock().current_file()
    }

    /// Whether a tick or auto-resume is scheduled
    pub fn has_pending_timer(&self) -> bool {
        self.lock().timer.is_pending()
    }

    /// Read-only view of the controller
    pub fn snapshot(&self) -> ControllerSnapshot {
        let state = self.lock();
        ControllerSnapshot {
            name: self.shared.name.clone(),
            card_connected: state.card.is_some(),
            device_names: state
                .devices
                .iter()
                .map(|d| d.name().to_string())
                .collect(),
            master_volume: state.volume.level(),
            current_file: state.current_file(),
            elapsed_seconds: state.elapsed_seconds,
            is_playing: state.is_playing,
            auto_play: state.auto_play,
            state: state.playback_state(),
        }
    }

    // ===== Events =====

    /// Drain all pending events
    ///
    /// Returns the events recorded since the last drain, oldest first. At
    /// most [`MAX_PENDING_EVENTS`] are kept; older ones are discarded.
    pub fn drain_events(&self) -> Vec<PlaybackEvent> {
        self.lock().pending_events.drain(..).collect()
    }

    /// Check if there are pending events
    pub fn has_pending_events(&self) -> bool {
        !self.lock().pending_events.is_empty()
    }
}

/// Tick loop task
///
/// Holds only a weak reference, so it never keeps its controller alive.
async fn run_tick_loop(
    controller: Weak<ControllerShared>,
    file: MediaFile,
    runtime: Handle,
    interval: Duration,
    generation: u64,
) {
    loop {
        tokio::time::sleep(interval).await;

        let Some(shared) = controller.upgrade() else {
            return;
        };
        if !(Controller { shared }).tick_from_timer(&file, &runtime, generation) {
            return;
        }
    }
}

impl AudioDevice for ControllerShared {
    fn name(&self) -> &str {
        &self.name
    }

    fn volume(&self) -> u8 {
        self.lock().volume.level()
    }

    fn set_volume(&self, level: u8) -> bool {
        let mut state = self.lock();
        if !state.volume.try_set(level) {
            let reason = Rejection::VolumeOutOfRange { level };
            warn!(controller = %self.name, "{}", reason);
            state.emit(PlaybackEvent::Rejected { reason });
            return false;
        }
        state.emit(PlaybackEvent::VolumeChanged { level });
        true
    }
}

impl AudioDevice for Controller {
    fn name(&self) -> &str {
        self.shared.name()
    }

    fn volume(&self) -> u8 {
        self.shared.volume()
    }

    fn set_volume(&self, level: u8) -> bool {
        self.shared.set_volume(level)
    }
}

impl std::fmt::Debug for Controller {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("Controller").field(&self.snapshot()).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn card_with(files: &[(&str, &str, u64)]) -> Arc<StorageCard> {
        let card = Arc::new(StorageCard::new("SD", 100));
        for (name, ext, secs) in files {
            card.add_file(MediaFile::new(*name, *ext, 1, Duration::from_secs(*secs)).unwrap());
        }
        card
    }

    fn controller() -> Controller {
        Controller::new("MainController", [".mp3", ".wav"], 2)
    }

    #[test]
    fn new_controller_is_idle() {
        let controller = controller();
        let snapshot = controller.snapshot();

        assert_eq!(snapshot.name, "MainController");
        assert!(!snapshot.card_connected);
        assert_eq!(snapshot.master_volume, 100);
        assert_eq!(snapshot.current_file, None);
        assert!(snapshot.auto_play);
        assert_eq!(snapshot.state, PlaybackState::Idle);
    }

    #[test]
    fn connect_card_reports_failure_when_taken() {
        let card = card_with(&[("a", ".mp3", 10)]);
        let first = controller();
        let second = Controller::new("Mixer", [".mp3"], 1);

        assert!(first.connect_card(&card));
        assert!(!second.connect_card(&card));

        assert_eq!(card.connected_controller().unwrap().name(), "MainController");
        assert!(second.card().is_none());
        assert!(matches!(
            second.drain_events().last(),
            Some(PlaybackEvent::Rejected {
                reason: Rejection::CardUnavailable
            })
        ));
    }

    #[test]
    fn connecting_a_new_card_releases_the_old_one() {
        let old = card_with(&[("a", ".mp3", 10)]);
        let new = card_with(&[("b", ".mp3", 10)]);
        let controller = controller();

        controller.connect_card(&old);
        controller.connect_card(&new);

        assert!(!old.is_connected());
        assert!(new.is_connected());
        assert_eq!(controller.current_file().unwrap().name(), "b");
    }

    #[test]
    fn disconnect_card_frees_it_for_others() {
        let card = card_with(&[("a", ".mp3", 10)]);
        let first = controller();
        let second = Controller::new("Mixer", [".mp3"], 1);

        first.connect_card(&card);
        first.disconnect_card();
        first.disconnect_card();

        assert!(!first.snapshot().card_connected);
        assert!(second.connect_card(&card));
    }

    #[test]
    fn toggle_without_card_is_rejected() {
        let controller = controller();
        controller.toggle();

        assert_eq!(controller.playback_state(), PlaybackState::Idle);
        assert_eq!(
            controller.drain_events(),
            vec![PlaybackEvent::Rejected {
                reason: Rejection::NoCard
            }]
        );
    }

    #[test]
    fn toggle_outside_runtime_is_rejected() {
        let controller = controller();
        controller.connect_card(&card_with(&[("a", ".mp3", 10)]));
        controller.drain_events();

        controller.toggle();

        assert!(!controller.is_playing());
        assert_eq!(
            controller.drain_events(),
            vec![PlaybackEvent::Rejected {
                reason: Rejection::NoRuntime
            }]
        );
    }

    #[test]
    fn next_and_prev_wrap_around() {
        let controller = controller();
        controller.connect_card(&card_with(&[("a", ".mp3", 1), ("b", ".mp3", 1), ("c", ".wav", 1)]));

        controller.prev();
        assert_eq!(controller.current_index(), 2);
        controller.next();
        assert_eq!(controller.current_index(), 0);
        controller.next();
        controller.next();
        controller.next();
        assert_eq!(controller.current_index(), 0);
    }

    #[test]
    fn next_without_files_only_resets_playhead() {
        let controller = controller();
        controller.connect_card(&card_with(&[]));
        controller.next();
        controller.prev();

        assert_eq!(controller.current_index(), 0);
        assert_eq!(controller.elapsed_seconds(), 0);
    }

    #[test]
    fn seek_within_track() {
        let controller = controller();
        controller.connect_card(&card_with(&[("a", ".mp3", 10)]));

        assert!(controller.seek(7));
        assert_eq!(controller.elapsed_seconds(), 7);
        assert!(controller.seek(10));
        assert!(!controller.seek(11));
        assert_eq!(controller.elapsed_seconds(), 10);

        controller.next();
        assert_eq!(controller.elapsed_seconds(), 0);
    }

    #[test]
    fn seek_without_card_is_rejected() {
        let controller = controller();
        assert!(!controller.seek(1));
        assert!(matches!(
            controller.drain_events().as_slice(),
            [PlaybackEvent::Rejected {
                reason: Rejection::NoCard
            }]
        ));
    }

    #[test]
    fn device_cap_is_enforced() {
        let controller = controller();
        let devices: Vec<_> = ["Front", "Back", "Sub"]
            .iter()
            .map(|name| Arc::new(OutputDevice::new(*name, 2)))
            .collect();

        assert!(controller.add_device(&devices[0]));
        assert!(controller.add_device(&devices[1]));
        assert!(!controller.add_device(&devices[2]));

        assert_eq!(controller.device_names(), vec!["Front", "Back"]);
        assert_eq!(devices[0].describe().connected_to.as_deref(), Some("MainController"));
        assert_eq!(devices[2].describe().connected_to, None);
    }

    #[test]
    fn devices_follow_the_latest_controller() {
        let device = Arc::new(OutputDevice::new("Speakers", 2));
        let first = controller();
        let second = Controller::new("Mixer", [".mp3"], 1);

        first.add_device(&device);
        second.add_device(&device);

        assert_eq!(device.connected_controller().unwrap().name(), "Mixer");
        // The first controller still lists it
        assert_eq!(first.device_names(), vec!["Speakers"]);
    }

    #[test]
    fn master_volume() {
        let controller = controller();

        assert!(controller.set_volume(80));
        assert!(!controller.set_volume(101));
        assert_eq!(controller.volume(), 80);
        assert_eq!(controller.snapshot().master_volume, 80);
    }

    #[test]
    fn supported_extensions_can_change() {
        let controller = controller();
        assert!(!controller.supports(".flac"));

        controller.add_supported_extension(".flac");
        controller.remove_supported_extension(".wav");

        assert!(controller.supports(".flac"));
        assert!(!controller.supports(".wav"));
        assert_eq!(controller.supported_extensions(), vec![".flac", ".mp3"]);
    }

    #[test]
    fn dropping_controller_releases_card() {
        let card = card_with(&[("a", ".mp3", 10)]);
        let controller = controller();
        controller.connect_card(&card);
        drop(controller);

        assert!(!card.is_connected());
    }

    #[test]
    fn current_index_wraps_onto_a_shorter_card() {
        let controller = controller();
        controller.connect_card(&card_with(&[("a", ".mp3", 1), ("b", ".mp3", 1), ("c", ".mp3", 1)]));
        controller.prev();
        assert_eq!(controller.current_index(), 2);

        controller.connect_card(&card_with(&[("d", ".mp3", 1)]));

        assert_eq!(controller.current_index(), 0);
        assert_eq!(controller.current_file().unwrap().name(), "d");
    }

    #[test]
    fn pending_events_are_capped() {
        let controller = controller();
        let calls = MAX_PENDING_EVENTS + 76;
        for i in 0..calls {
            controller.set_volume((i % 101) as u8);
        }

        let events = controller.drain_events();
        assert_eq!(events.len(), MAX_PENDING_EVENTS);
        // Oldest dropped first
        assert_eq!(events[0], PlaybackEvent::VolumeChanged { level: 76 });
        assert_eq!(
            events.last(),
            Some(&PlaybackEvent::VolumeChanged {
                level: ((calls - 1) % 101) as u8
            })
        );
        assert!(!controller.has_pending_events());
    }

    #[tokio::test(start_paused = true)]
    async fn tick_from_a_replaced_loop_is_ignored() {
        let controller = controller();
        controller.connect_card(&card_with(&[("a", ".mp3", 10), ("b", ".mp3", 10)]));
        controller.toggle();
        let old_generation = controller.lock().generation;
        let old_file = controller.current_file().unwrap();

        controller.toggle();
        controller.next();
        controller.toggle();
        controller.drain_events();

        // The loop for "a" got the lock after playback restarted on "b"
        assert!(!controller.tick_from_timer(&old_file, &Handle::current(), old_generation));
        assert!(controller.is_playing());
        assert_eq!(controller.elapsed_seconds(), 1);
        assert!(controller.drain_events().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn late_auto_resume_does_not_pause_manual_play() {
        let controller = controller();
        controller.connect_card(&card_with(&[("a", ".mp3", 1), ("b", ".mp3", 10)]));
        controller.seek(1);
        // Finishes at once and schedules the auto-resume
        controller.toggle();
        assert!(!controller.is_playing());
        let resume_generation = controller.lock().generation;

        controller.toggle();
        controller.resume_from_timer(resume_generation);

        assert!(controller.is_playing());
        assert_eq!(controller.current_file().unwrap().name(), "b");
    }

    #[tokio::test(start_paused = true)]
    async fn disconnect_invalidates_pending_auto_resume() {
        let card = card_with(&[("a", ".mp3", 1), ("b", ".mp3", 10)]);
        let controller = controller();
        controller.connect_card(&card);
        controller.seek(1);
        controller.toggle();
        let resume_generation = controller.lock().generation;

        controller.disconnect_card();
        controller.connect_card(&card);
        controller.drain_events();
        controller.resume_from_timer(resume_generation);

        assert!(!controller.is_playing());
        assert!(controller.drain_events().is_empty());
    }

    #[test]
    fn auto_play_accessors() {
        let controller = controller();
        controller.set_auto_play(false);
        assert!(!controller.auto_play());
        assert!(!controller.snapshot().auto_play);
    }
}
