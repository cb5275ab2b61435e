//! File logging for the terminal binary.
//!
//! The terminal is owned by the UI, so log records go to a file instead of
//! stderr.

use std::env;
use std::fs;
use std::path::PathBuf;

use crate::config::{LoggingSettings, config_dir};

/// Resolve the log file from `ALLEGRO_LOG_PATH`, else `allegro.log` in the
/// config directory, else the system temp directory.
pub fn resolve_log_path() -> PathBuf {
    if let Some(p) = env::var_os("ALLEGRO_LOG_PATH") {
        return PathBuf::from(p);
    }
    config_dir()
        .unwrap_or_else(env::temp_dir)
        .join("allegro.log")
}

/// Install the global `fern` dispatcher. Returns the file being written.
pub fn init(settings: &LoggingSettings) -> Result<PathBuf, Box<dyn std::error::Error>> {
    let level: log::LevelFilter = settings.level.parse().unwrap_or(log::LevelFilter::Info);
    let log_path = resolve_log_path();

    if let Some(parent) = log_path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }

    fern::Dispatch::new()
        .format(|out, message, record| {
            out.finish(format_args!(
                "{}[{}][{}] {}",
                chrono::Local::now().format("[%Y-%m-%d][%H:%M:%S%.3f]"),
                record.target(),
                record.level(),
                message
            ))
        })
        .level(level)
        // The decoders log every probed packet at debug level.
        .level_for("symphonia_core", log::LevelFilter::Warn)
        .level_for("symphonia_bundle_mp3", log::LevelFilter::Warn)
        .chain(fern::log_file(&log_path)?)
        .apply()?;

    Ok(log_path)
}
