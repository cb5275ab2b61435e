use serde::Deserialize;

/// Top-level application settings loaded from `config.toml`.
///
/// File format: TOML
/// Default path (Linux/XDG): `$XDG_CONFIG_HOME/allegro/config.toml` or `~/.config/allegro/config.toml`
///
/// Precedence (highest wins):
/// 1) Environment variables (prefix `ALLEGRO__`, `__` as nested separator)
/// 2) Config file (if present)
/// 3) Struct defaults
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub library: LibrarySettings,
    pub playback: PlaybackSettings,
    pub spectrum: SpectrumSettings,
    pub ui: UiSettings,
    pub logging: LoggingSettings,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LibrarySettings {
    /// File extensions to treat as audio (case-insensitive, without dot).
    pub extensions: Vec<String>,
    /// Whether to follow symlinks during scanning.
    pub follow_links: bool,
    /// Whether to include hidden files/directories (dotfiles).
    pub include_hidden: bool,
    /// Whether to recurse into subdirectories.
    pub recursive: bool,
    /// Optional cap on directory recursion depth.
    pub max_depth: Option<usize>,
}

impl Default for LibrarySettings {
    fn default() -> Self {
        Self {
            extensions: ["mp3", "flac", "aac", "m4a", "ogg", "opus", "aiff", "wav"]
                .iter()
                .map(|e| e.to_string())
                .collect(),
            follow_links: true,
            include_hidden: false,
            recursive: true,
            max_depth: None,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PlaybackSettings {
    /// Output volume in `0.0..=1.0`.
    pub volume: f32,
    /// Position polling interval (milliseconds).
    pub tick_ms: u64,
    /// How far past the known duration the computed position may run before
    /// the track counts as finished (milliseconds).
    pub end_slop_ms: u64,
    /// Advance to the next track when a track fails to decode.
    pub skip_unplayable: bool,
    /// Step used by the seek-forward/backward keys, in percent of the track.
    pub seek_step_percent: u8,
}

impl Default for PlaybackSettings {
    fn default() -> Self {
        Self {
            volume: 1.0,
            tick_ms: 250,
            end_slop_ms: 500,
            skip_unplayable: true,
            seek_step_percent: 5,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SpectrumSettings {
    /// Open the capture device and run the analyzer at all.
    pub enabled: bool,
    /// Samples per capture frame.
    pub frame_size: usize,
    /// Minimum spacing between analyzed frames (milliseconds).
    pub interval_ms: u64,
    /// Lower clamp of the dB scale. Both bounds stay within 0..=100.
    pub floor_db: f32,
    /// Upper clamp of the dB scale.
    pub ceiling_db: f32,
}

impl Default for SpectrumSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            frame_size: 1024,
            interval_ms: 50,
            floor_db: 0.0,
            ceiling_db: 100.0,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct UiSettings {
    /// The text rendered inside the top header box.
    pub header_text: String,
    /// Whether the spectrum panel starts visible.
    pub show_spectrum: bool,
}

impl Default for UiSettings {
    fn default() -> Self {
        Self {
            header_text: " ~ allegro ~ ".to_string(),
            show_spectrum: true,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingSettings {
    /// One of `off`, `error`, `warn`, `info`, `debug`, `trace`.
    pub level: String,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}
