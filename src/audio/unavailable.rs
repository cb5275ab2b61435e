use std::path::Path;
use std::time::Duration;

use crate::error::{PlayerError, Result};

use super::engine::PlaybackEngine;

/// Stand-in used when no output device could be opened.
///
/// Every load fails with `DeviceUnavailable`, so the session reports the
/// problem per track instead of the process exiting.
#[derive(Debug, Clone)]
pub struct UnavailableEngine {
    reason: String,
}

impl UnavailableEngine {
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }

    pub fn reason(&self) -> &str {
        &self.reason
    }
}

impl PlaybackEngine for UnavailableEngine {
    fn load(&mut self, _path: &Path) -> Result<Duration> {
        Err(PlayerError::DeviceUnavailable(self.reason.clone()))
    }

    fn play(&mut self, _start: Duration) -> Result<()> {
        Err(PlayerError::DeviceUnavailable(self.reason.clone()))
    }

    fn pause(&mut self) {}

    fn resume(&mut self) {}

    fn stop(&mut self) {}

    fn is_busy(&self) -> bool {
        false
    }

    fn elapsed(&self) -> Option<Duration> {
        Some(Duration::ZERO)
    }

    fn set_volume(&mut self, _volume: f32) {}
}
