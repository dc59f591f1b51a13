//! Core domain types

pub mod media_file;
pub mod output_device;
pub mod storage_card;
pub mod volume;

pub use media_file::MediaFile;
pub use output_device::{DeviceInfo, OutputDevice};
pub use storage_card::StorageCard;
pub use volume::Volume;
