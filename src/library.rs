//! Library module: track model, metadata lookup and folder scanning.

mod metadata;
mod model;
mod scan;

pub use metadata::{TrackMetadata, read_metadata};
pub use model::Track;
pub use scan::{probe_track, scan, scan_paths, tracks_from_paths};
