//! `PlayerSession`: the one value that owns playback.
//!
//! Everything that touches the engine, the tracker or the playlist goes
//! through `&mut PlayerSession`, so user actions and polling ticks are
//! serialized on whichever thread owns the session.
//!
//! Loads are split into `begin_load` / `finish_load` around a generation
//! ticket. Starting another load or stopping bumps the generation, and a
//! ticket from an older generation is discarded when it comes back, so the
//! last load always wins.

use std::path::PathBuf;
use std::time::Duration;

use crate::audio::PlaybackEngine;
use crate::config::PlaybackSettings;
use crate::error::{PlayerError, Result};
use crate::library::Track;
use crate::playlist::{Playlist, SortColumn};
use crate::tracker::{PlaybackState, PositionTracker, TrackerEvent, TrackerState};

/// Proof that a load was requested, and for which generation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadTicket {
    generation: u64,
    index: usize,
    path: PathBuf,
}

impl LoadTicket {
    pub fn path(&self) -> &std::path::Path {
        &self.path
    }

    pub fn index(&self) -> usize {
        self.index
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum SessionEvent {
    Position {
        position: Duration,
        duration: Duration,
    },
    TrackStarted {
        index: usize,
        path: PathBuf,
        duration: Duration,
    },
    /// The engine ran out of audio. `path` is `None` if the track has since
    /// left the playlist.
    TrackEnded {
        path: Option<PathBuf>,
    },
    LoadFailed {
        path: PathBuf,
        reason: String,
    },
    Stopped,
}

pub struct PlayerSession<E: PlaybackEngine> {
    engine: E,
    tracker: PositionTracker,
    playlist: Playlist,
    generation: u64,
    pending: Option<LoadTicket>,
    pending_seek: Option<f64>,
    volume: f32,
    skip_unplayable: bool,
    events: Vec<SessionEvent>,
}

impl<E: PlaybackEngine> PlayerSession<E> {
    pub fn new(mut engine: E, playlist: Playlist, settings: &PlaybackSettings) -> Self {
        let volume = settings.volume.clamp(0.0, 1.0);
        engine.set_volume(volume);
        Self {
            engine,
            tracker: PositionTracker::new(Duration::from_millis(settings.end_slop_ms)),
            playlist,
            generation: 0,
            pending: None,
            pending_seek: None,
            volume,
            skip_unplayable: settings.skip_unplayable,
            events: Vec::new(),
        }
    }

    pub fn engine(&self) -> &E {
        &self.engine
    }

    pub fn engine_mut(&mut self) -> &mut E {
        &mut self.engine
    }

    pub fn tracker(&self) -> &PositionTracker {
        &self.tracker
    }

    pub fn playlist(&self) -> &Playlist {
        &self.playlist
    }

    pub fn playback_state(&self) -> PlaybackState {
        self.tracker.playback_state()
    }

    pub fn position(&self) -> Duration {
        self.tracker.position(&self.engine)
    }

    pub fn duration(&self) -> Duration {
        self.tracker.duration()
    }

    pub fn volume(&self) -> f32 {
        self.volume
    }

    pub fn is_loading(&self) -> bool {
        self.pending.is_some()
    }

    pub fn has_pending_seek(&self) -> bool {
        self.pending_seek.is_some()
    }

    /// Drain events produced by user actions since the last tick.
    pub fn take_events(&mut self) -> Vec<SessionEvent> {
        std::mem::take(&mut self.events)
    }

    /// Claim the next load generation for the track at `index`.
    /// Any earlier ticket becomes stale.
    pub fn begin_load(&mut self, index: usize) -> Option<LoadTicket> {
        let path = self.playlist.get(index)?.path.clone();
        self.generation += 1;
        self.pending_seek = None;
        let ticket = LoadTicket {
            generation: self.generation,
            index,
            path,
        };
        self.pending = Some(ticket.clone());
        Some(ticket)
    }

    /// Complete a load started with `begin_load`.
    ///
    /// A superseded ticket returns `Ok(None)` without touching the engine.
    /// On a decode failure the cursor, the tracker and whatever was playing
    /// stay as they were. On success the cursor moves to the loaded track
    /// and a seek queued while loading is applied.
    pub fn finish_load(&mut self, ticket: &LoadTicket) -> Result<Option<Duration>> {
        if self.pending.as_ref() != Some(ticket) {
            log::debug!("discarding superseded load of {:?}", ticket.path);
            return Ok(None);
        }
        self.pending = None;
        let seek = self.pending_seek.take();

        let duration = self.engine.load(&ticket.path)?;
        self.playlist.set_current_by_identity(&ticket.path);
        self.tracker.on_loaded(duration);
        log::info!("loaded {:?} ({:.1}s)", ticket.path, duration.as_secs_f64());

        if let Some(fraction) = seek {
            self.tracker.seek(&mut self.engine, fraction)?;
        }
        Ok(Some(duration))
    }

    fn start(&mut self, index: usize) -> Result<()> {
        let ticket = self
            .begin_load(index)
            .ok_or(PlayerError::NothingLoaded)?;
        let Some(duration) = self.finish_load(&ticket)? else {
            return Ok(());
        };
        self.tracker.play(&mut self.engine)?;
        self.events.push(SessionEvent::TrackStarted {
            index: self.playlist.current_index().unwrap_or(ticket.index),
            path: ticket.path,
            duration,
        });
        Ok(())
    }

    /// Load and play the track at `index`.
    ///
    /// When the track cannot be decoded and skipping is enabled, the
    /// following tracks are tried in turn. The search gives up on reaching
    /// the track that is already playing, which then keeps playing.
    pub fn play_index(&mut self, index: usize) -> Result<()> {
        let attempts = if self.skip_unplayable {
            self.playlist.len().max(1)
        } else {
            1
        };
        let mut target = index;
        let mut last_error = None;

        for _ in 0..attempts {
            match self.start(target) {
                Ok(()) => return Ok(()),
                Err(e @ PlayerError::Decode { .. }) => {
                    log::warn!("{e}");
                    if let Some(track) = self.playlist.get(target) {
                        self.events.push(SessionEvent::LoadFailed {
                            path: track.path.clone(),
                            reason: e.to_string(),
                        });
                    }
                    last_error = Some(e);
                }
                Err(e) => return Err(e),
            }
            match self.playlist.step_from(Some(target), 1) {
                Some(next) if Some(next) != self.playlist.current_index() => target = next,
                _ => break,
            }
        }
        Err(last_error.unwrap_or(PlayerError::NothingLoaded))
    }

    /// Play when stopped, pause when playing, resume when paused.
    /// With nothing loaded yet this starts the selected (or first) track.
    pub fn play_pause(&mut self) -> Result<()> {
        match self.tracker.playback_state() {
            PlaybackState::Playing => {
                self.tracker.pause(&mut self.engine);
                Ok(())
            }
            PlaybackState::Paused => {
                self.tracker.resume(&mut self.engine);
                Ok(())
            }
            PlaybackState::Stopped if self.tracker.state() == TrackerState::Idle => {
                let index = self.playlist.current_index().unwrap_or(0);
                self.play_index(index)
            }
            PlaybackState::Stopped => self.tracker.play(&mut self.engine),
        }
    }

    pub fn pause(&mut self) {
        self.tracker.pause(&mut self.engine);
    }

    pub fn resume(&mut self) {
        self.tracker.resume(&mut self.engine);
    }

    /// Halt playback, forget the position, cancel a queued seek and
    /// invalidate any outstanding load.
    pub fn stop(&mut self) {
        self.generation += 1;
        self.pending = None;
        self.pending_seek = None;
        self.tracker.stop(&mut self.engine);
        self.events.push(SessionEvent::Stopped);
    }

    /// Play the following track, wrapping past the end.
    pub fn next(&mut self) -> Result<()> {
        match self.playlist.peek_next() {
            Some(index) => self.play_index(index),
            None => Ok(()),
        }
    }

    /// Play the preceding track, wrapping past the start.
    pub fn previous(&mut self) -> Result<()> {
        match self.playlist.peek_previous() {
            Some(index) => self.play_index(index),
            None => Ok(()),
        }
    }

    /// Jump to `fraction` of the current track. While a load is outstanding
    /// the seek is queued and applied once the load lands.
    pub fn seek(&mut self, fraction: f64) -> Result<()> {
        if self.pending.is_some() {
            self.pending_seek = Some(fraction);
            return Ok(());
        }
        self.tracker.seek(&mut self.engine, fraction).map(|_| ())
    }

    /// Seek relative to the current position by whole percent of the track.
    pub fn seek_by_percent(&mut self, delta: i32) -> Result<()> {
        let duration = self.tracker.duration();
        if duration.is_zero() {
            return Ok(());
        }
        let now = self.position().as_secs_f64() / duration.as_secs_f64();
        self.seek(now + f64::from(delta) / 100.0)
    }

    pub fn set_volume(&mut self, volume: f32) {
        self.volume = volume.clamp(0.0, 1.0);
        self.engine.set_volume(self.volume);
    }

    pub fn shuffle(&mut self) {
        self.playlist.shuffle();
    }

    pub fn sort_by_column(&mut self, column: SortColumn) {
        self.playlist.sort_by_column(column);
    }

    pub fn add_tracks(&mut self, tracks: Vec<Track>) -> usize {
        self.playlist.add_tracks(tracks)
    }

    /// Swap in a rescanned library. Playback is untouched even if the
    /// playing file is gone from the new list.
    pub fn replace_tracks(&mut self, tracks: Vec<Track>) {
        self.playlist.replace(tracks);
    }

    /// One polling tick: report the position, or on end of track advance
    /// to the next one. Returns everything that happened since the last
    /// tick, user actions included.
    pub fn tick(&mut self) -> Vec<SessionEvent> {
        match self.tracker.tick(&mut self.engine) {
            Some(TrackerEvent::PositionChanged { position, duration }) => {
                self.events.push(SessionEvent::Position { position, duration });
            }
            Some(TrackerEvent::TrackEnded) => {
                let path = self.playlist.current().map(|t| t.path.clone());
                self.events.push(SessionEvent::TrackEnded { path });
                if let Err(e) = self.next() {
                    log::warn!("auto-advance failed: {e}");
                }
            }
            None => {}
        }
        self.take_events()
    }
}
