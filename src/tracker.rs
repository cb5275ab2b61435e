//! Position tracking on top of an engine that only knows "time since play".
//!
//! The engine never reports an absolute position and never calls back, so
//! the tracker keeps an offset anchor (set on load and on seek, never on
//! pause/resume) and adds the engine's elapsed clock to it on every poll.
//! The reported position is therefore up to one tick stale.

use std::time::Duration;

use crate::audio::PlaybackEngine;
use crate::error::{PlayerError, Result};

/// What the user sees: playing, paused (resumable) or stopped.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Default)]
pub enum PlaybackState {
    #[default]
    Stopped,
    Playing,
    Paused,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Default)]
pub enum TrackerState {
    /// No track loaded.
    #[default]
    Idle,
    Loaded,
    Running,
    Paused,
    /// The engine reported the end of the stream.
    Ended,
}

/// The anchor and length used to turn engine time into track position.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Default)]
pub struct PositionState {
    pub offset: Duration,
    pub duration: Duration,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TrackerEvent {
    PositionChanged {
        position: Duration,
        duration: Duration,
    },
    TrackEnded,
}

#[derive(Debug, Default)]
pub struct PositionTracker {
    state: TrackerState,
    position: PositionState,
    end_slop: Duration,
}

impl PositionTracker {
    /// `end_slop` is how far past the duration a computed position may run
    /// before it alone counts as the end of the track.
    pub fn new(end_slop: Duration) -> Self {
        Self {
            end_slop,
            ..Self::default()
        }
    }

    pub fn state(&self) -> TrackerState {
        self.state
    }

    pub fn position_state(&self) -> PositionState {
        self.position
    }

    pub fn duration(&self) -> Duration {
        self.position.duration
    }

    pub fn playback_state(&self) -> PlaybackState {
        match self.state {
            TrackerState::Running => PlaybackState::Playing,
            TrackerState::Paused => PlaybackState::Paused,
            TrackerState::Idle | TrackerState::Loaded | TrackerState::Ended => {
                PlaybackState::Stopped
            }
        }
    }

    /// A new track is loaded in the engine: anchor back to zero.
    pub fn on_loaded(&mut self, duration: Duration) {
        self.state = TrackerState::Loaded;
        self.position = PositionState {
            offset: Duration::ZERO,
            duration,
        };
    }

    /// Start output. From `Paused` this resumes; from `Ended` it replays.
    pub fn play<E: PlaybackEngine + ?Sized>(&mut self, engine: &mut E) -> Result<()> {
        match self.state {
            TrackerState::Idle => Err(PlayerError::NothingLoaded),
            TrackerState::Running => Ok(()),
            TrackerState::Paused => {
                self.resume(engine);
                Ok(())
            }
            TrackerState::Loaded | TrackerState::Ended => {
                if self.state == TrackerState::Ended {
                    self.position.offset = Duration::ZERO;
                }
                engine.play(self.position.offset)?;
                self.state = TrackerState::Running;
                log::debug!("running from {:.2}s", self.position.offset.as_secs_f64());
                Ok(())
            }
        }
    }

    pub fn pause<E: PlaybackEngine + ?Sized>(&mut self, engine: &mut E) {
        if self.state == TrackerState::Running {
            engine.pause();
            self.state = TrackerState::Paused;
        }
    }

    pub fn resume<E: PlaybackEngine + ?Sized>(&mut self, engine: &mut E) {
        if self.state == TrackerState::Paused {
            engine.resume();
            self.state = TrackerState::Running;
        }
    }

    /// Halt output and forget the position. The track stays loaded.
    pub fn stop<E: PlaybackEngine + ?Sized>(&mut self, engine: &mut E) {
        engine.stop();
        if self.state != TrackerState::Idle {
            self.state = TrackerState::Loaded;
        }
        self.position.offset = Duration::ZERO;
    }

    /// Restart output at `fraction` of the track. This is a hard
    /// stop-and-replay: decoded audio is discarded and playback resumes even
    /// if it was paused. Returns the new offset.
    pub fn seek<E: PlaybackEngine + ?Sized>(
        &mut self,
        engine: &mut E,
        fraction: f64,
    ) -> Result<Duration> {
        if self.state == TrackerState::Idle {
            return Err(PlayerError::NothingLoaded);
        }
        let fraction = if fraction.is_finite() {
            fraction.clamp(0.0, 1.0)
        } else {
            0.0
        };
        let offset = self.position.duration.mul_f64(fraction);

        engine.stop();
        self.position.offset = offset;
        if let Err(e) = engine.play(offset) {
            self.state = TrackerState::Loaded;
            return Err(e);
        }
        self.state = TrackerState::Running;
        log::debug!("seek to {:.2}s", offset.as_secs_f64());
        Ok(offset)
    }

    /// Current absolute position as best the engine can tell.
    pub fn position<E: PlaybackEngine + ?Sized>(&self, engine: &E) -> Duration {
        match self.state {
            TrackerState::Idle => Duration::ZERO,
            TrackerState::Loaded => self.position.offset,
            TrackerState::Ended => self.position.duration,
            TrackerState::Running | TrackerState::Paused => match engine.elapsed() {
                Some(e) => (self.position.offset + e).min(self.position.duration),
                None => self.position.duration,
            },
        }
    }

    /// One polling tick. Only does anything while running.
    ///
    /// Reports `TrackEnded` exactly once per play-through: the tracker leaves
    /// `Running` when it does, so later ticks are no-ops until the next
    /// load or play. The engine is stopped at that point, since a track whose
    /// duration was under-reported may still be rendering.
    pub fn tick<E: PlaybackEngine + ?Sized>(&mut self, engine: &mut E) -> Option<TrackerEvent> {
        if self.state != TrackerState::Running {
            return None;
        }

        if let Some(e) = engine.elapsed() {
            let position = self.position.offset + e;
            if position <= self.position.duration + self.end_slop && engine.is_busy() {
                return Some(TrackerEvent::PositionChanged {
                    position: position.min(self.position.duration),
                    duration: self.position.duration,
                });
            }
        }

        engine.stop();
        self.state = TrackerState::Ended;
        log::info!("track ended");
        Some(TrackerEvent::TrackEnded)
    }
}
