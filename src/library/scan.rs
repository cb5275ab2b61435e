use std::path::{Path, PathBuf};

use walkdir::WalkDir;

use crate::config::LibrarySettings;

use super::metadata::read_metadata;
use super::model::Track;

pub(super) fn is_audio_file(path: &Path, settings: &LibrarySettings) -> bool {
    let exts: Vec<String> = settings
        .extensions
        .iter()
        .map(|e| e.trim().trim_start_matches('.').to_ascii_lowercase())
        .filter(|e| !e.is_empty())
        .collect();

    path.extension()
        .and_then(|s| s.to_str())
        .map(|ext| {
            let ext = ext.to_ascii_lowercase();
            exts.iter().any(|e| e == &ext)
        })
        .unwrap_or(false)
}

fn is_hidden(path: &Path) -> bool {
    path.file_name()
        .and_then(|s| s.to_str())
        .map(|name| name.starts_with('.'))
        .unwrap_or(false)
}

/// Build a `Track` for `path`, falling back to the filename when tags can't be read.
pub fn probe_track(path: &Path) -> Track {
    match read_metadata(path) {
        Ok(meta) => Track::with_metadata(path, &meta),
        Err(e) => {
            log::warn!("{e}; using filename as title");
            Track::from_path(path)
        }
    }
}

/// Turn an arbitrary list of paths (e.g. dropped files) into tracks,
/// skipping anything that isn't a supported audio file.
pub fn tracks_from_paths<P: AsRef<Path>>(paths: &[P], settings: &LibrarySettings) -> Vec<Track> {
    paths
        .iter()
        .map(AsRef::as_ref)
        .filter(|p| p.is_file() && is_audio_file(p, settings))
        .map(probe_track)
        .collect()
}

/// Collect supported audio files under `dir`.
pub fn scan_paths(dir: &Path, settings: &LibrarySettings) -> Vec<PathBuf> {
    let mut walker = WalkDir::new(dir).follow_links(settings.follow_links);

    // Non-recursive = only the root directory.
    let depth_cap = if settings.recursive {
        settings.max_depth
    } else {
        Some(1)
    };
    if let Some(d) = depth_cap {
        walker = walker.max_depth(d);
    }

    walker
        .into_iter()
        .filter_entry(|e| settings.include_hidden || e.depth() == 0 || !is_hidden(e.path()))
        .filter_map(|entry| match entry {
            Ok(e) => Some(e),
            Err(err) => {
                log::warn!("skipping unreadable entry: {err}");
                None
            }
        })
        .map(|e| e.into_path())
        .filter(|p| p.is_file() && is_audio_file(p, settings))
        .collect()
}

/// Scan `dir` and probe every supported file. Order is left to the playlist.
pub fn scan(dir: &Path, settings: &LibrarySettings) -> Vec<Track> {
    let paths = scan_paths(dir, settings);
    log::info!("found {} audio files under {}", paths.len(), dir.display());
    paths.iter().map(|p| probe_track(p)).collect()
}
