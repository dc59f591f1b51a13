//! Scripted demo scenario
//!
//! Builds the entities described by a [`DemoConfig`], wires them together and
//! plays them along the configured timeline while a reporter task logs
//! events and controller snapshots.

use crate::config::DemoConfig;
use crate::error::{DemoError, Result};
use cardplay_core::{AudioDevice, DeviceInfo, MediaFile, OutputDevice, StorageCard, Volume};
use cardplay_playback::{Controller, ControllerSnapshot, PlaybackConfig, PlaybackEvent};
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info};

/// Composed demo entities
pub struct Scenario {
    pub controller: Controller,
    pub card: Arc<StorageCard>,
    pub drivers: Vec<Arc<OutputDevice>>,
    switch_after: Duration,
    stop_after: Duration,
    report_interval: Duration,
}

/// Serializable overview of a composed scenario
#[derive(Debug, Clone, Serialize)]
pub struct ScenarioInfo {
    pub controller: ControllerSnapshot,
    pub card: CardInfo,
    pub devices: Vec<DeviceInfo>,
}

#[derive(Debug, Clone, Serialize)]
pub struct CardInfo {
    pub card_type: String,
    pub capacity_mb: u64,
    pub used_space_mb: u64,
    pub files: Vec<String>,
}

impl Scenario {
    /// Build the scenario, dividing every configured duration by `speedup`
    pub fn build(config: &DemoConfig, speedup: u32) -> Result<Self> {
        config.validate()?;
        let speedup = speedup.max(1);

        let card = Arc::new(StorageCard::new(
            config.card.card_type.clone(),
            config.card.capacity_mb,
        ));
        for file in &config.files {
            let media = MediaFile::new(
                file.name.clone(),
                file.extension.clone(),
                file.size_mb,
                Duration::from_secs(file.duration_secs),
            )
            .map_err(|source| DemoError::InvalidFile {
                name: file.name.clone(),
                source,
            })?;
            card.add_file(media);
        }
        info!(
            "Files on {} card: {} ({}MB used)",
            card.card_type(),
            card.file_count(),
            card.used_space_mb()
        );

        let playback = PlaybackConfig {
            tick_interval_ms: scale_millis(config.controller.playback.tick_interval_ms, speedup),
            resume_delay_ms: scale_millis(config.controller.playback.resume_delay_ms, speedup),
            ..config.controller.playback.clone()
        };
        let controller = Controller::with_config(
            config.controller.name.clone(),
            config.controller.supported_extensions.iter().cloned(),
            config.controller.max_devices,
            playback,
        );
        controller.connect_card(&card);

        let mut drivers = Vec::with_capacity(config.drivers.len());
        for settings in &config.drivers {
            let driver = Arc::new(OutputDevice::new(settings.name.clone(), settings.channels));
            controller.add_device(&driver);
            drivers.push(driver);
        }

        controller.set_volume(config.controller.volume);
        for (driver, settings) in drivers.iter().zip(&config.drivers) {
            for (channel, level) in settings.channel_volumes.iter().enumerate() {
                driver.set_channel_volume(channel, *level);
            }
        }

        let script = &config.script;
        Ok(Self {
            controller,
            card,
            drivers,
            switch_after: script.switch_after() / speedup,
            stop_after: script.stop_after() / speedup,
            report_interval: (script.report_interval() / speedup).max(Duration::from_millis(1)),
        })
    }

    pub fn info(&self) -> ScenarioInfo {
        ScenarioInfo {
            controller: self.controller.snapshot(),
            card: CardInfo {
                card_type: self.card.card_type().to_string(),
                capacity_mb: self.card.capacity_mb(),
                used_space_mb: self.card.used_space_mb(),
                files: self
                    .card
                    .list_files()
                    .iter()
                    .map(ToString::to_string)
                    .collect(),
            },
            devices: self.drivers.iter().map(|driver| driver.describe()).collect(),
        }
    }

    /// Play the scripted timeline to completion
    ///
    /// Starts playback, pauses and skips to the next file at the switch
    /// point, then stops at the stop point.
    pub async fn run(&self) {
        for driver in &self.drivers {
            log_device(&driver.describe());
        }

        let reporter = tokio::spawn(report_loop(self.controller.clone(), self.report_interval));

        info!("Starting playback");
        self.controller.toggle();

        tokio::time::sleep(self.switch_after).await;
        info!("Switching to the next file");
        if self.controller.is_playing() {
            self.controller.toggle();
        }
        self.controller.next();
        self.controller.toggle();

        tokio::time::sleep(self.stop_after.saturating_sub(self.switch_after)).await;
        if self.controller.is_playing() {
            self.controller.toggle();
        }

        reporter.abort();
        report(&self.controller);
        info!("Demo finished");
    }
}

fn scale_millis(millis: u64, speedup: u32) -> u64 {
    (millis / u64::from(speedup)).max(1)
}

async fn report_loop(controller: Controller, period: Duration) {
    let mut ticker = tokio::time::interval(period);
    // The first tick completes immediately
    ticker.tick().await;

    loop {
        ticker.tick().await;
        report(&controller);
    }
}

/// Log drained events followed by the controller status
fn report(controller: &Controller) {
    for event in controller.drain_events() {
        log_event(&event);
    }

    let snapshot = controller.snapshot();
    let file = snapshot
        .current_file
        .as_ref()
        .map_or_else(|| "-".to_string(), ToString::to_string);
    info!(
        controller = %snapshot.name,
        state = ?snapshot.state,
        elapsed = snapshot.elapsed_seconds,
        "Current file: {}",
        file
    );
}

fn log_event(event: &PlaybackEvent) {
    match event {
        PlaybackEvent::Progress {
            file,
            elapsed_seconds,
            duration_seconds,
        } => debug!("Playing {} ({}/{}s)", file, elapsed_seconds, duration_seconds),
        PlaybackEvent::Rejected { reason } => info!("Rejected: {}", reason),
        other => info!(event = ?other, "Playback event"),
    }
}

fn log_device(device: &DeviceInfo) {
    info!(
        device = %device.name,
        volume = device.master_volume,
        gain_db = Volume::new(device.master_volume).to_db(),
        channels = ?device.channel_volumes,
        connected_to = ?device.connected_to,
        "Output device ready"
    );
}
