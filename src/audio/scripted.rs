//! In-memory engine for tests: a manual clock instead of a device.

use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use crate::error::{PlayerError, Result};

use super::clock::PlayClock;
use super::engine::PlaybackEngine;

pub(crate) struct ScriptedEngine {
    base: Instant,
    now: Duration,
    clock: PlayClock,
    loaded: Option<(PathBuf, Duration)>,
    started_from: Duration,
    running: bool,
    paused: bool,
    pub default_duration: Duration,
    pub durations: HashMap<PathBuf, Duration>,
    /// Lengths `load` reports instead of the real one, like a VBR header.
    pub reported: HashMap<PathBuf, Duration>,
    pub broken: HashSet<PathBuf>,
    pub loads: Vec<PathBuf>,
    pub plays: Vec<Duration>,
    pub volume: f32,
}

impl ScriptedEngine {
    pub fn new() -> Self {
        Self {
            base: Instant::now(),
            now: Duration::ZERO,
            clock: PlayClock::default(),
            loaded: None,
            started_from: Duration::ZERO,
            running: false,
            paused: false,
            default_duration: Duration::from_secs(180),
            durations: HashMap::new(),
            reported: HashMap::new(),
            broken: HashSet::new(),
            loads: Vec::new(),
            plays: Vec::new(),
            volume: 1.0,
        }
    }

    pub fn break_path(&mut self, path: impl Into<PathBuf>) {
        self.broken.insert(path.into());
    }

    /// Let wall-clock time pass.
    pub fn advance(&mut self, d: Duration) {
        self.now += d;
    }

    pub fn loaded_path(&self) -> Option<&Path> {
        self.loaded.as_ref().map(|(p, _)| p.as_path())
    }

    fn instant(&self) -> Instant {
        self.base + self.now
    }

    fn rendered(&self) -> Duration {
        self.clock.elapsed(self.instant())
    }

    fn remaining(&self) -> Duration {
        self.loaded
            .as_ref()
            .map_or(Duration::ZERO, |(_, d)| d.saturating_sub(self.started_from))
    }

    fn ran_out(&self) -> bool {
        self.running && self.rendered() >= self.remaining()
    }
}

impl PlaybackEngine for ScriptedEngine {
    fn load(&mut self, path: &Path) -> Result<Duration> {
        if self.broken.contains(path) {
            return Err(PlayerError::decode(path, "scripted failure"));
        }
        let d = self
            .durations
            .get(path)
            .copied()
            .unwrap_or(self.default_duration);
        self.stop();
        self.loaded = Some((path.to_path_buf(), d));
        self.loads.push(path.to_path_buf());
        Ok(self.reported.get(path).copied().unwrap_or(d))
    }

    fn play(&mut self, start: Duration) -> Result<()> {
        if self.loaded.is_none() {
            return Err(PlayerError::NothingLoaded);
        }
        self.started_from = start;
        self.running = true;
        self.paused = false;
        let now = self.instant();
        self.clock.start(now);
        self.plays.push(start);
        Ok(())
    }

    fn pause(&mut self) {
        if self.running && !self.paused {
            self.paused = true;
            let now = self.instant();
            self.clock.pause(now);
        }
    }

    fn resume(&mut self) {
        if self.running && self.paused {
            self.paused = false;
            let now = self.instant();
            self.clock.resume(now);
        }
    }

    fn stop(&mut self) {
        self.running = false;
        self.paused = false;
        self.clock.reset();
    }

    fn is_busy(&self) -> bool {
        self.running && !self.paused && !self.ran_out()
    }

    fn elapsed(&self) -> Option<Duration> {
        if self.ran_out() {
            None
        } else {
            Some(self.rendered())
        }
    }

    fn set_volume(&mut self, volume: f32) {
        self.volume = volume.clamp(0.0, 1.0);
    }
}
