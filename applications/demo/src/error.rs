/// Demo application errors
use cardplay_core::CoreError;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, DemoError>;

#[derive(Error, Debug)]
pub enum DemoError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid media file {name}: {source}")]
    InvalidFile {
        name: String,
        #[source]
        source: CoreError,
    },
}

impl From<::config::ConfigError> for DemoError {
    fn from(err: ::config::ConfigError) -> Self {
        DemoError::Config(err.to_string())
    }
}
