//! cardplay demo application
//!
//! Composes a storage card, a controller and output devices from a
//! [`DemoConfig`] and drives them along a scripted timeline.

pub mod config;
pub mod error;
pub mod scenario;

pub use config::DemoConfig;
pub use error::{DemoError, Result};
pub use scenario::Scenario;
