//! The ordered track list and the cursor pointing at the current track.
//!
//! Navigation wraps in both directions; there is no end-of-playlist state.
//! Every reorder keeps the current track by identity (its path), never by
//! position, so a shuffle or sort never changes what is playing.

mod sort;

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use rand::Rng;
use rand::seq::SliceRandom;

use crate::library::Track;

pub use sort::{SortColumn, SortOrder};

#[derive(Debug, Default)]
pub struct Playlist {
    tracks: Vec<Track>,
    current: Option<usize>,
    sort: Option<(SortColumn, SortOrder)>,
}

impl Playlist {
    /// Build a playlist in library order (track number, then filename).
    pub fn new(tracks: Vec<Track>) -> Self {
        let mut p = Self::default();
        p.add_tracks(tracks);
        p
    }

    pub fn len(&self) -> usize {
        self.tracks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tracks.is_empty()
    }

    pub fn tracks(&self) -> &[Track] {
        &self.tracks
    }

    pub fn get(&self, index: usize) -> Option<&Track> {
        self.tracks.get(index)
    }

    /// `None` means nothing has been loaded yet.
    pub fn current_index(&self) -> Option<usize> {
        self.current
    }

    pub fn current(&self) -> Option<&Track> {
        self.current.and_then(|i| self.tracks.get(i))
    }

    /// The active column sort, if the user picked one.
    pub fn sort_state(&self) -> Option<(SortColumn, SortOrder)> {
        self.sort
    }

    /// Point the cursor at `index`. Out-of-range indices are rejected.
    pub fn set_current(&mut self, index: usize) -> bool {
        if index < self.tracks.len() {
            self.current = Some(index);
            true
        } else {
            false
        }
    }

    pub fn clear_current(&mut self) {
        self.current = None;
    }

    pub fn position_of(&self, path: &Path) -> Option<usize> {
        self.tracks.iter().position(|t| t.id() == path)
    }

    /// Re-resolve the cursor to wherever `path` now sits.
    /// Clears the cursor when the track is no longer in the list.
    pub fn set_current_by_identity(&mut self, path: &Path) -> Option<usize> {
        self.current = self.position_of(path);
        self.current
    }

    /// Index `advance` would move to, without moving.
    pub fn peek_next(&self) -> Option<usize> {
        self.step_from(self.current, 1)
    }

    /// Index `retreat` would move to, without moving.
    pub fn peek_previous(&self) -> Option<usize> {
        self.step_from(self.current, -1)
    }

    /// The index `delta` steps away from `from`, wrapping both ways.
    /// From no position, forward lands on the first track and backward on
    /// the last.
    pub fn step_from(&self, from: Option<usize>, delta: isize) -> Option<usize> {
        if self.tracks.is_empty() {
            return None;
        }
        let len = self.tracks.len() as isize;
        let start = match from {
            Some(i) => i as isize,
            None if delta >= 0 => -1,
            None => len,
        };
        Some((start + delta).rem_euclid(len) as usize)
    }

    /// Step forward, wrapping from the last track to the first.
    /// With nothing loaded the first track becomes current.
    pub fn advance(&mut self) -> Option<usize> {
        self.current = self.peek_next();
        self.current
    }

    /// Step backward, wrapping from the first track to the last.
    /// With nothing loaded the last track becomes current.
    pub fn retreat(&mut self) -> Option<usize> {
        self.current = self.peek_previous();
        self.current
    }

    /// Uniformly permute the tracks using the thread RNG.
    pub fn shuffle(&mut self) {
        self.shuffle_with(&mut rand::thread_rng());
    }

    pub fn shuffle_with<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        self.reorder(|tracks| tracks.shuffle(rng));
        self.sort = None;
    }

    /// Sort by `column`. Picking the active column again flips its direction.
    pub fn sort_by_column(&mut self, column: SortColumn) {
        let order = match self.sort {
            Some((c, o)) if c == column => o.flipped(),
            _ => SortOrder::Ascending,
        };
        self.sort_with(column, order);
    }

    pub fn sort_with(&mut self, column: SortColumn, order: SortOrder) {
        self.reorder(|tracks| tracks.sort_by(|a, b| sort::compare(column, order, a, b)));
        self.sort = Some((column, order));
    }

    /// Append tracks not already present (by path) and restore library order.
    /// Returns how many were added.
    pub fn add_tracks(&mut self, tracks: Vec<Track>) -> usize {
        let mut known: HashSet<PathBuf> = self.tracks.iter().map(|t| t.path.clone()).collect();
        let before = self.tracks.len();
        for t in tracks {
            if known.insert(t.path.clone()) {
                self.tracks.push(t);
            }
        }
        let added = self.tracks.len() - before;
        if added > 0 {
            self.reorder(|tracks| tracks.sort_by(sort::default_order));
            self.sort = None;
        }
        added
    }

    /// Swap in a freshly scanned list, keeping the current track if it survived.
    pub fn replace(&mut self, tracks: Vec<Track>) {
        let current = self.current().map(|t| t.path.clone());
        self.tracks.clear();
        self.current = None;
        self.add_tracks(tracks);
        if let Some(path) = current {
            self.set_current_by_identity(&path);
        }
    }

    fn reorder(&mut self, f: impl FnOnce(&mut Vec<Track>)) {
        let current = self.current().map(|t| t.path.clone());
        f(&mut self.tracks);
        if let Some(path) = current {
            self.set_current_by_identity(&path);
        }
    }
}
