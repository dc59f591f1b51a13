/// Demo configuration
use crate::error::{DemoError, Result};
use cardplay_playback::PlaybackConfig;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Default configuration file, read when present
pub const DEFAULT_CONFIG_FILE: &str = "cardplay.toml";

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DemoConfig {
    #[serde(default = "default_card")]
    pub card: CardSettings,

    #[serde(default = "default_files")]
    pub files: Vec<FileSettings>,

    #[serde(default = "default_controller")]
    pub controller: ControllerSettings,

    #[serde(default = "default_drivers")]
    pub drivers: Vec<DriverSettings>,

    #[serde(default = "default_script")]
    pub script: ScriptSettings,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CardSettings {
    #[serde(default = "default_card_type")]
    pub card_type: String,

    #[serde(default = "default_capacity_mb")]
    pub capacity_mb: u64,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct FileSettings {
    pub name: String,
    pub extension: String,
    pub size_mb: u64,
    pub duration_secs: u64,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ControllerSettings {
    #[serde(default = "default_controller_name")]
    pub name: String,

    #[serde(default = "default_supported_extensions")]
    pub supported_extensions: Vec<String>,

    #[serde(default = "default_max_devices")]
    pub max_devices: usize,

    #[serde(default = "default_volume")]
    pub volume: u8,

    #[serde(default)]
    pub playback: PlaybackConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DriverSettings {
    pub name: String,
    pub channels: usize,

    /// Per-channel levels applied after creation, in channel order
    #[serde(default)]
    pub channel_volumes: Vec<u8>,
}

/// Scripted timeline, in seconds from the first play
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ScriptSettings {
    /// Pause, skip to the next file and play again
    #[serde(default = "default_switch_after_secs")]
    pub switch_after_secs: u64,

    /// Stop playback and end the run
    #[serde(default = "default_stop_after_secs")]
    pub stop_after_secs: u64,

    /// How often the printer drains events and logs a snapshot
    #[serde(default = "default_report_interval_secs")]
    pub report_interval_secs: u64,
}

impl ScriptSettings {
    pub fn switch_after(&self) -> Duration {
        Duration::from_secs(self.switch_after_secs)
    }

    pub fn stop_after(&self) -> Duration {
        Duration::from_secs(self.stop_after_secs)
    }

    pub fn report_interval(&self) -> Duration {
        Duration::from_secs(self.report_interval_secs)
    }
}

impl Default for DemoConfig {
    fn default() -> Self {
        Self {
            card: default_card(),
            files: default_files(),
            controller: default_controller(),
            drivers: default_drivers(),
            script: default_script(),
        }
    }
}

impl DemoConfig {
    /// Load configuration from a file and the environment
    ///
    /// An explicit `path` must exist. Without one, `cardplay.toml` in the
    /// working directory is read if present. `CARDPLAY_`-prefixed variables
    /// override file values, with `__` separating nested keys
    /// (e.g. `CARDPLAY_CARD__CAPACITY_MB=64`).
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut settings = ::config::Config::builder();

        match path {
            Some(path) => {
                settings = settings.add_source(::config::File::from(path.to_path_buf()));
            }
            None => {
                let default_path = PathBuf::from(DEFAULT_CONFIG_FILE);
                if default_path.exists() {
                    settings = settings.add_source(::config::File::from(default_path));
                }
            }
        }

        settings = settings.add_source(
            ::config::Environment::with_prefix("CARDPLAY")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

        let config: Self = settings.build()?.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        if self.controller.name.trim().is_empty() {
            return Err(DemoError::Config(
                "controller name must not be empty".to_string(),
            ));
        }

        for driver in &self.drivers {
            if driver.name.trim().is_empty() {
                return Err(DemoError::Config("driver name must not be empty".to_string()));
            }
            if driver.channels == 0 {
                return Err(DemoError::Config(format!(
                    "driver {} must have at least one channel",
                    driver.name
                )));
            }
        }

        if self.controller.playback.tick_interval_ms == 0 {
            return Err(DemoError::Config(
                "tick_interval_ms must be positive".to_string(),
            ));
        }

        if self.script.report_interval_secs == 0 {
            return Err(DemoError::Config(
                "report_interval_secs must be positive".to_string(),
            ));
        }

        Ok(())
    }
}

// Default values
fn default_card() -> CardSettings {
    CardSettings {
        card_type: default_card_type(),
        capacity_mb: default_capacity_mb(),
    }
}

fn default_card_type() -> String {
    "SD".to_string()
}

fn default_capacity_mb() -> u64 {
    20
}

fn file(name: &str, extension: &str, size_mb: u64, duration_secs: u64) -> FileSettings {
    FileSettings {
        name: name.to_string(),
        extension: extension.to_string(),
        size_mb,
        duration_secs,
    }
}

fn default_files() -> Vec<FileSettings> {
    vec![
        file("SongOne", ".mp3", 5, 10),
        file("SongTwo", ".mp3", 7, 12),
        file("Clip", ".wav", 3, 8),
    ]
}

fn default_controller() -> ControllerSettings {
    ControllerSettings {
        name: default_controller_name(),
        supported_extensions: default_supported_extensions(),
        max_devices: default_max_devices(),
        volume: default_volume(),
        playback: PlaybackConfig::default(),
    }
}

fn default_controller_name() -> String {
    "MainController".to_string()
}

fn default_supported_extensions() -> Vec<String> {
    vec![".mp3".to_string(), ".wav".to_string()]
}

fn default_max_devices() -> usize {
    2
}

fn default_volume() -> u8 {
    80
}

fn default_drivers() -> Vec<DriverSettings> {
    vec![
        DriverSettings {
            name: "FrontSpeaker".to_string(),
            channels: 2,
            channel_volumes: vec![60, 70],
        },
        DriverSettings {
            name: "BackSpeaker".to_string(),
            channels: 2,
            channel_volumes: vec![65, 75],
        },
    ]
}

fn default_script() -> ScriptSettings {
    ScriptSettings {
        switch_after_secs: default_switch_after_secs(),
        stop_after_secs: default_stop_after_secs(),
        report_interval_secs: default_report_interval_secs(),
    }
}

fn default_switch_after_secs() -> u64 {
    5
}

fn default_stop_after_secs() -> u64 {
    30
}

fn default_report_interval_secs() -> u64 {
    1
}
