//! The small persisted record of which folder the library was built from.
//!
//! Kept apart from `Settings` because it is written by the program, while
//! `config.toml` is only ever written by the user.

use std::env;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{PlayerError, Result};

use super::load::config_dir;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LibraryState {
    /// Folder scanned for tracks at startup.
    pub folder: PathBuf,
}

impl Default for LibraryState {
    fn default() -> Self {
        Self {
            folder: PathBuf::from("."),
        }
    }
}

impl LibraryState {
    /// Read the state file at `path`. A missing file yields the defaults.
    pub fn load_from(path: &Path) -> Result<Self> {
        let text = match fs::read_to_string(path) {
            Ok(t) => t,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Self::default()),
            Err(e) => return Err(e.into()),
        };
        toml::from_str(&text).map_err(|e| PlayerError::State(e.to_string()))
    }

    /// Write the state file, creating its parent directory when needed.
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        let text = toml::to_string_pretty(self).map_err(|e| PlayerError::State(e.to_string()))?;
        fs::write(path, text)?;
        Ok(())
    }

    /// Load from the resolved state path, logging and defaulting on any failure.
    pub fn load_or_default() -> Self {
        let Some(path) = resolve_state_path() else {
            return Self::default();
        };
        match Self::load_from(&path) {
            Ok(s) => s,
            Err(e) => {
                log::warn!("ignoring unreadable state file {}: {e}", path.display());
                Self::default()
            }
        }
    }
}

/// Resolve the state path from `ALLEGRO_STATE_PATH`, else `state.toml` in the
/// config directory.
pub fn resolve_state_path() -> Option<PathBuf> {
    if let Some(p) = env::var_os("ALLEGRO_STATE_PATH") {
        return Some(PathBuf::from(p));
    }
    config_dir().map(|d| d.join("state.toml"))
}
