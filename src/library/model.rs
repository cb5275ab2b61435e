use std::path::{Path, PathBuf};

use super::metadata::TrackMetadata;

/// One playable file in the library.
///
/// Tracks are immutable once built. Identity is the file path: two `Track`
/// values for the same path are the same track, whatever their tags say.
/// Duration is deliberately absent; it is resolved when the track is loaded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Track {
    pub path: PathBuf,
    pub title: String,
    pub filename: String,
    pub track_number: u32,
}

impl Track {
    /// Build a track with no tag information: filename as title, track 0.
    pub fn from_path(path: &Path) -> Self {
        let filename = file_name_of(path);
        Self {
            path: path.to_path_buf(),
            title: filename.clone(),
            filename,
            track_number: 0,
        }
    }

    /// Build a track from advisory metadata, falling back per field.
    pub fn with_metadata(path: &Path, meta: &TrackMetadata) -> Self {
        let mut track = Self::from_path(path);
        if let Some(t) = meta.title.as_deref().map(str::trim).filter(|t| !t.is_empty()) {
            track.title = t.to_string();
        }
        track.track_number = meta.track_number.unwrap_or(0);
        track
    }

    pub fn id(&self) -> &Path {
        &self.path
    }
}

fn file_name_of(path: &Path) -> String {
    path.file_name()
        .and_then(|s| s.to_str())
        .unwrap_or("UNKNOWN")
        .to_string()
}
