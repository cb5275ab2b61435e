//! Tag and audio-property lookup.
//!
//! Metadata is advisory: it feeds titles, ordering and the duration shown
//! in the UI, but playback never depends on it succeeding.

use std::path::Path;
use std::time::Duration;

use lofty::prelude::*;

use crate::error::{PlayerError, Result};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TrackMetadata {
    pub title: Option<String>,
    pub track_number: Option<u32>,
    pub duration: Duration,
    /// Audio bitrate in kbps.
    pub bitrate: Option<u32>,
    /// Sample rate in Hz.
    pub sample_rate: Option<u32>,
    pub channels: Option<u8>,
}

/// Read tags and stream properties from `path`.
pub fn read_metadata(path: &Path) -> Result<TrackMetadata> {
    let tagged = lofty::read_from_path(path).map_err(|e| PlayerError::metadata(path, e))?;

    let props = tagged.properties();
    let mut meta = TrackMetadata {
        duration: props.duration(),
        bitrate: props.audio_bitrate().or_else(|| props.overall_bitrate()),
        sample_rate: props.sample_rate(),
        channels: props.channels(),
        ..TrackMetadata::default()
    };

    if let Some(tag) = tagged.primary_tag().or_else(|| tagged.first_tag()) {
        meta.title = tag
            .title()
            .map(|t| t.trim().to_string())
            .filter(|t| !t.is_empty());
        // lofty already splits "3/12" style values.
        meta.track_number = tag.track();
    }

    Ok(meta)
}
