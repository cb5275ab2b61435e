use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use rodio::{OutputStream, OutputStreamBuilder, Sink, Source};

use crate::error::{PlayerError, Result};
use crate::library::read_metadata;

use super::clock::PlayClock;
use super::engine::PlaybackEngine;
use super::sink::{create_sink_at, open_decoder};

/// `PlaybackEngine` on top of the default rodio output stream.
pub struct RodioEngine {
    stream: OutputStream,
    sink: Option<Sink>,
    loaded: Option<PathBuf>,
    clock: PlayClock,
    volume: f32,
}

impl RodioEngine {
    /// Open the default output device.
    pub fn open() -> Result<Self> {
        let mut stream = OutputStreamBuilder::open_default_stream()
            .map_err(|e| PlayerError::DeviceUnavailable(e.to_string()))?;
        // rodio logs to stderr when OutputStream is dropped. That's useful in debugging,
        // but noisy for a TUI app.
        stream.log_on_drop(false);

        Ok(Self {
            stream,
            sink: None,
            loaded: None,
            clock: PlayClock::default(),
            volume: 1.0,
        })
    }

    fn drop_sink(&mut self) {
        if let Some(s) = self.sink.take() {
            s.stop();
        }
    }
}

impl PlaybackEngine for RodioEngine {
    fn load(&mut self, path: &Path) -> Result<Duration> {
        // Probe before touching the current sink so a bad file leaves playback alone.
        let decoder = open_decoder(path)?;
        let duration = decoder
            .total_duration()
            .or_else(|| read_metadata(path).ok().map(|m| m.duration))
            .filter(|d| !d.is_zero())
            .ok_or_else(|| PlayerError::decode(path, "stream length is unknown"))?;

        self.drop_sink();
        self.clock.reset();
        self.loaded = Some(path.to_path_buf());
        log::debug!("decoder ready for {}", path.display());
        Ok(duration)
    }

    fn play(&mut self, start: Duration) -> Result<()> {
        let path = self.loaded.clone().ok_or(PlayerError::NothingLoaded)?;
        self.drop_sink();

        let sink = create_sink_at(&self.stream, &path, start)?;
        sink.set_volume(self.volume);
        sink.play();
        self.sink = Some(sink);
        self.clock.start(Instant::now());
        Ok(())
    }

    fn pause(&mut self) {
        if let Some(s) = self.sink.as_ref() {
            s.pause();
            self.clock.pause(Instant::now());
        }
    }

    fn resume(&mut self) {
        if let Some(s) = self.sink.as_ref() {
            s.play();
            self.clock.resume(Instant::now());
        }
    }

    fn stop(&mut self) {
        self.drop_sink();
        self.clock.reset();
    }

    fn is_busy(&self) -> bool {
        self.sink
            .as_ref()
            .is_some_and(|s| !s.is_paused() && !s.empty())
    }

    fn elapsed(&self) -> Option<Duration> {
        match self.sink.as_ref() {
            Some(s) if s.empty() => None,
            _ => Some(self.clock.elapsed(Instant::now())),
        }
    }

    fn set_volume(&mut self, volume: f32) {
        self.volume = volume.clamp(0.0, 1.0);
        if let Some(s) = self.sink.as_ref() {
            s.set_volume(self.volume);
        }
    }
}
