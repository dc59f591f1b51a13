//! Capabilities shared across devices

/// Named sink with a master volume.
///
/// Implemented by output devices and controllers alike. Setters take `&self`
/// because implementors are shared behind `Arc` and guard their own state.
pub trait AudioDevice: Send + Sync {
    /// Display name
    fn name(&self) -> &str;

    /// Master volume (0-100)
    fn volume(&self) -> u8;

    /// Set master volume (0-100)
    ///
    /// Levels above 100 are ignored. Returns whether the level was applied.
    fn set_volume(&self, level: u8) -> bool;
}
