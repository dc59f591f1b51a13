//! Output device (driver)
//!
//! A named sink with a master volume and one volume per channel.

use crate::error::Rejection;
use crate::traits::AudioDevice;
use crate::types::Volume;
use serde::{Deserialize, Serialize};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};
use tracing::warn;

/// Output device driven by a controller
///
/// Unlike a storage card, a device can be reassigned to another controller
/// at any time: the most recent `connect` wins.
pub struct OutputDevice {
    name: String,
    state: Mutex<DeviceState>,
}

struct DeviceState {
    volume: Volume,
    channel_volumes: Vec<Volume>,
    connected: Option<Weak<dyn AudioDevice>>,
}

/// Point-in-time view of an output device
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceInfo {
    /// Device name
    pub name: String,

    /// Master volume (0-100)
    pub master_volume: u8,

    /// Per-channel volumes (0-100)
    pub channel_volumes: Vec<u8>,

    /// Name of the connected controller, if any
    pub connected_to: Option<String>,
}

impl OutputDevice {
    /// Create a device with `channels` channels, all at full volume
    pub fn new(name: impl Into<String>, channels: usize) -> Self {
        Self {
            name: name.into(),
            state: Mutex::new(DeviceState {
                volume: Volume::default(),
                channel_volumes: vec![Volume::default(); channels],
                connected: None,
            }),
        }
    }

    fn state(&self) -> MutexGuard<'_, DeviceState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Number of channels
    pub fn channel_count(&self) -> usize {
        self.state().channel_volumes.len()
    }

    /// Set the volume of one channel
    ///
    /// Ignored when `channel` is out of range or `level` exceeds 100.
    pub fn set_channel_volume(&self, channel: usize, level: u8) -> bool {
        let mut state = self.state();
        let channels = state.channel_volumes.len();

        let Some(volume) = state.channel_volumes.get_mut(channel) else {
            warn!(device = %self.name, "{}", Rejection::ChannelOutOfRange { channel, channels });
            return false;
        };

        if !volume.try_set(level) {
            warn!(device = %self.name, "{}", Rejection::VolumeOutOfRange { level });
            return false;
        }
        true
    }

    /// Volume of one channel, `None` if out of range
    pub fn channel_volume(&self, channel: usize) -> Option<u8> {
        self.state().channel_volumes.get(channel).map(Volume::level)
    }

    /// Attach the device to a controller, replacing any previous one
    pub fn connect(&self, controller: Weak<dyn AudioDevice>) {
        self.state().connected = Some(controller);
    }

    /// Controller currently driving the device
    pub fn connected_controller(&self) -> Option<Arc<dyn AudioDevice>> {
        self.state().connected.as_ref().and_then(Weak::upgrade)
    }

    /// Snapshot of name, volumes and connection
    pub fn describe(&self) -> DeviceInfo {
        let state = self.state();
        DeviceInfo {
            name: self.name.clone(),
            master_volume: state.volume.level(),
            channel_volumes: state.channel_volumes.iter().map(Volume::level).collect(),
            connected_to: state
                .connected
                .as_ref()
                .and_then(Weak::upgrade)
                .map(|c| c.name().to_string()),
        }
    }
}

impl AudioDevice for OutputDevice {
    fn name(&self) -> &str {
        &self.name
    }

    fn volume(&self) -> u8 {
        self.state().volume.level()
    }

    fn set_volume(&self, level: u8) -> bool {
        let applied = self.state().volume.try_set(level);
        if !applied {
            warn!(device = %self.name, "{}", Rejection::VolumeOutOfRange { level });
        }
        applied
    }
}

impl std::fmt::Debug for OutputDevice {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("OutputDevice").field(&self.describe()).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_device_is_at_full_volume() {
        let device = OutputDevice::new("FrontSpeaker", 2);
        let info = device.describe();

        assert_eq!(info.name, "FrontSpeaker");
        assert_eq!(info.master_volume, 100);
        assert_eq!(info.channel_volumes, vec![100, 100]);
        assert_eq!(info.connected_to, None);
    }

    #[test]
    fn set_channel_volume_in_range() {
        let device = OutputDevice::new("FrontSpeaker", 2);

        assert!(device.set_channel_volume(0, 60));
        assert!(device.set_channel_volume(1, 70));
        assert_eq!(device.channel_volume(0), Some(60));
        assert_eq!(device.channel_volume(1), Some(70));
    }

    #[test]
    fn set_channel_volume_out_of_range_is_ignored() {
        let device = OutputDevice::new("BackSpeaker", 2);
        device.set_channel_volume(0, 65);

        assert!(!device.set_channel_volume(2, 50));
        assert!(!device.set_channel_volume(0, 101));
        assert_eq!(device.describe().channel_volumes, vec![65, 100]);
        assert_eq!(device.channel_volume(2), None);
    }

    #[test]
    fn master_volume() {
        let device = OutputDevice::new("Headphones", 2);

        assert!(device.set_volume(30));
        assert_eq!(device.volume(), 30);
        assert!(!device.set_volume(200));
        assert_eq!(device.volume(), 30);
    }

    #[test]
    fn connect_overwrites_previous_controller() {
        let device = OutputDevice::new("Speakers", 2);
        let first: Arc<dyn AudioDevice> = Arc::new(OutputDevice::new("MP3 Player", 0));
        let second: Arc<dyn AudioDevice> = Arc::new(OutputDevice::new("Mixer", 0));

        device.connect(Arc::downgrade(&first));
        device.connect(Arc::downgrade(&second));

        assert_eq!(device.connected_controller().unwrap().name(), "Mixer");
        assert_eq!(device.describe().connected_to.as_deref(), Some("Mixer"));
    }

    #[test]
    fn describe_returns_a_copy() {
        let device = OutputDevice::new("Speakers", 1);
        let mut info = device.describe();
        info.channel_volumes[0] = 0;

        assert_eq!(device.channel_volume(0), Some(100));
    }
}
