/// Media file descriptor
use crate::error::{CoreError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

/// Immutable descriptor of a playable asset
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MediaFile {
    name: String,
    extension: String,
    size_mb: u64,
    duration: Duration,
}

impl MediaFile {
    /// Create a media file
    ///
    /// `extension` includes the leading dot (e.g. `".mp3"`).
    /// Size and duration must both be positive.
    pub fn new(
        name: impl Into<String>,
        extension: impl Into<String>,
        size_mb: u64,
        duration: Duration,
    ) -> Result<Self> {
        let name = name.into();
        if size_mb == 0 {
            return Err(CoreError::invalid_input(format!(
                "{name}: size must be positive"
            )));
        }
        if duration.is_zero() {
            return Err(CoreError::invalid_input(format!(
                "{name}: duration must be positive"
            )));
        }

        Ok(Self {
            name,
            extension: extension.into(),
            size_mb,
            duration,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn extension(&self) -> &str {
        &self.extension
    }

    /// Size in megabytes
    pub fn size_mb(&self) -> u64 {
        self.size_mb
    }

    pub fn duration(&self) -> Duration {
        self.duration
    }

    /// File name with extension (e.g. `SongOne.mp3`)
    pub fn file_name(&self) -> String {
        format!("{}{}", self.name, self.extension)
    }
}

impl fmt::Display for MediaFile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}{}, {}MB, {}s",
            self.name,
            self.extension,
            self.size_mb,
            self.duration.as_secs()
        )
    }
}
