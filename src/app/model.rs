//! View state for the terminal front-end.
//!
//! `App` holds only what the screen needs between frames: the cursor in the
//! track table, the last reported position, the last spectrum frame and a
//! status line. Playback itself lives in `PlayerSession`.

use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::config::UiSettings;
use crate::library::{TrackMetadata, read_metadata};
use crate::playlist::Playlist;
use crate::session::SessionEvent;
use crate::spectrum::SpectrumFrame;

/// Contents of the metadata popup for one track.
#[derive(Debug, Clone, PartialEq)]
pub struct MetadataView {
    pub path: PathBuf,
    pub metadata: Result<TrackMetadata, String>,
}

/// What a submitted path prompt does.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PromptKind {
    /// Rebuild the library from another folder and remember it.
    LibraryFolder,
    /// Append a directory's tracks to the playlist.
    AddDirectory,
}

/// A one-line path entry shown over the track table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathPrompt {
    pub kind: PromptKind,
    pub input: String,
}

impl PathPrompt {
    /// The entered path with a leading `~` expanded. `None` when blank.
    pub fn path(&self) -> Option<PathBuf> {
        let input = self.input.trim();
        if input.is_empty() {
            return None;
        }
        if let Some(rest) = input.strip_prefix("~/") {
            if let Some(home) = std::env::var_os("HOME") {
                return Some(PathBuf::from(home).join(rest));
            }
        }
        Some(PathBuf::from(input))
    }
}

pub struct App {
    pub selected: usize,
    /// Move the table cursor along with the playing track.
    pub follow_playback: bool,
    pub show_spectrum: bool,
    pub spectrum_available: bool,
    pub output_available: bool,
    pub spectrum: SpectrumFrame,
    pub position: Duration,
    pub duration: Duration,
    pub status: Option<String>,
    pub folder: PathBuf,
    pub metadata_window: Option<MetadataView>,
    pub prompt: Option<PathPrompt>,
}

impl App {
    pub fn new(folder: PathBuf, ui: &UiSettings) -> Self {
        Self {
            selected: 0,
            follow_playback: true,
            show_spectrum: ui.show_spectrum,
            spectrum_available: true,
            output_available: true,
            spectrum: SpectrumFrame::default(),
            position: Duration::ZERO,
            duration: Duration::ZERO,
            status: None,
            folder,
            metadata_window: None,
            prompt: None,
        }
    }

    pub fn follow_playback_on(&mut self) {
        self.follow_playback = true;
    }

    pub fn follow_playback_off(&mut self) {
        self.follow_playback = false;
    }

    /// Move the table cursor down, wrapping at the bottom.
    pub fn select_next(&mut self, len: usize) {
        if len == 0 {
            return;
        }
        self.follow_playback_off();
        self.selected = (self.selected + 1) % len;
    }

    /// Move the table cursor up, wrapping at the top.
    pub fn select_prev(&mut self, len: usize) {
        if len == 0 {
            return;
        }
        self.follow_playback_off();
        self.selected = (self.selected + len - 1) % len;
    }

    pub fn select_first(&mut self) {
        self.follow_playback_off();
        self.selected = 0;
    }

    pub fn select_last(&mut self, len: usize) {
        self.follow_playback_off();
        self.selected = len.saturating_sub(1);
    }

    /// Keep the cursor on the playing track when following, and inside the
    /// table either way.
    pub fn sync_selection(&mut self, playlist: &Playlist) {
        if self.follow_playback {
            if let Some(i) = playlist.current_index() {
                self.selected = i;
            }
        }
        self.selected = self.selected.min(playlist.len().saturating_sub(1));
    }

    /// Fold one session event into the view.
    pub fn apply_event(&mut self, event: &SessionEvent) {
        match event {
            SessionEvent::Position { position, duration } => {
                self.position = *position;
                self.duration = *duration;
            }
            SessionEvent::TrackStarted {
                index, duration, ..
            } => {
                self.position = Duration::ZERO;
                self.duration = *duration;
                self.status = None;
                if self.follow_playback {
                    self.selected = *index;
                }
            }
            SessionEvent::TrackEnded { .. } => {
                self.position = self.duration;
            }
            SessionEvent::LoadFailed { path, reason } => {
                self.status = Some(format!("skipped {}: {reason}", file_label(path)));
            }
            SessionEvent::Stopped => {
                self.position = Duration::ZERO;
                self.spectrum = SpectrumFrame::default();
            }
        }
    }

    pub fn set_spectrum(&mut self, frame: SpectrumFrame) {
        self.spectrum = frame;
    }

    /// Show or hide the spectrum panel. Refused when there is no capture
    /// device to feed it.
    pub fn toggle_spectrum(&mut self) {
        if !self.spectrum_available {
            self.status = Some("spectrum unavailable".to_string());
            return;
        }
        self.show_spectrum = !self.show_spectrum;
    }

    /// Open the metadata popup for the selected track, or close it.
    pub fn toggle_metadata_window(&mut self, playlist: &Playlist) {
        if self.metadata_window.take().is_some() {
            return;
        }
        let Some(track) = playlist.get(self.selected) else {
            return;
        };
        self.metadata_window = Some(MetadataView {
            path: track.path.clone(),
            metadata: read_metadata(&track.path).map_err(|e| e.to_string()),
        });
    }

    /// Open the path prompt. The folder prompt starts from the current
    /// library folder so it can be edited rather than retyped.
    pub fn open_prompt(&mut self, kind: PromptKind) {
        let input = match kind {
            PromptKind::LibraryFolder => self.folder.display().to_string(),
            PromptKind::AddDirectory => String::new(),
        };
        self.metadata_window = None;
        self.prompt = Some(PathPrompt { kind, input });
    }

    pub fn prompt_push(&mut self, c: char) {
        if let Some(prompt) = &mut self.prompt {
            prompt.input.push(c);
        }
    }

    pub fn prompt_backspace(&mut self) {
        if let Some(prompt) = &mut self.prompt {
            prompt.input.pop();
        }
    }

    /// Close the prompt, returning what was entered.
    pub fn take_prompt(&mut self) -> Option<PathPrompt> {
        self.prompt.take()
    }

    pub fn set_status(&mut self, message: impl Into<String>) {
        self.status = Some(message.into());
    }

    /// Fraction of the track played, for the progress gauge.
    pub fn progress(&self) -> f64 {
        if self.duration.is_zero() {
            return 0.0;
        }
        (self.position.as_secs_f64() / self.duration.as_secs_f64()).clamp(0.0, 1.0)
    }
}

fn file_label(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}
