use std::{env, path::PathBuf};

use super::schema::Settings;

/// Configuration loading helpers.
///
/// `Settings::load` tries environment variables first (prefix `ALLEGRO__`), then an
/// optional config file and falls back to struct defaults.
impl Settings {
    /// Load settings from environment and optional config file.
    pub fn load() -> Result<Self, ::config::ConfigError> {
        let config_path = resolve_config_path();

        let mut builder = ::config::Config::builder();

        if let Some(path) = &config_path {
            builder = builder.add_source(::config::File::from(path.as_path()).required(false));
        }

        builder = builder.add_source(
            ::config::Environment::with_prefix("ALLEGRO")
                .separator("__")
                .try_parsing(true),
        );

        let cfg = builder.build()?;
        let settings: Settings = cfg.try_deserialize()?;
        Ok(settings)
    }

    /// Perform basic validation checks on loaded settings.
    pub fn validate(&self) -> Result<(), String> {
        if !(0.0..=1.0).contains(&self.playback.volume) {
            return Err("playback.volume must be within 0.0..=1.0".to_string());
        }
        if self.playback.tick_ms == 0 {
            return Err("playback.tick_ms must be >= 1".to_string());
        }
        if self.playback.seek_step_percent == 0 || self.playback.seek_step_percent > 100 {
            return Err("playback.seek_step_percent must be within 1..=100".to_string());
        }
        if self.spectrum.frame_size < 2 || self.spectrum.frame_size % 2 != 0 {
            return Err("spectrum.frame_size must be an even number >= 2".to_string());
        }
        let db_range = 0.0..=100.0;
        if !db_range.contains(&self.spectrum.floor_db)
            || !db_range.contains(&self.spectrum.ceiling_db)
        {
            return Err("spectrum.floor_db and spectrum.ceiling_db must be within 0..=100".into());
        }
        if self.spectrum.floor_db >= self.spectrum.ceiling_db {
            return Err("spectrum.floor_db must be below spectrum.ceiling_db".to_string());
        }
        if self.logging.level.parse::<log::LevelFilter>().is_err() {
            return Err(format!("logging.level {:?} is not a log level", self.logging.level));
        }
        Ok(())
    }
}

/// Resolve the config path from `ALLEGRO_CONFIG_PATH` or XDG defaults.
pub fn resolve_config_path() -> Option<PathBuf> {
    if let Some(p) = env::var_os("ALLEGRO_CONFIG_PATH") {
        return Some(PathBuf::from(p));
    }
    default_config_path()
}

/// The per-user configuration directory, `$XDG_CONFIG_HOME/allegro` or
/// `~/.config/allegro` when `XDG_CONFIG_HOME` is not set.
pub fn config_dir() -> Option<PathBuf> {
    let config_home = if let Some(xdg) = env::var_os("XDG_CONFIG_HOME") {
        Some(PathBuf::from(xdg))
    } else {
        env::var_os("HOME").map(|home| PathBuf::from(home).join(".config"))
    };

    config_home.map(|d| d.join("allegro"))
}

/// Compute the default config path under `$XDG_CONFIG_HOME/allegro/config.toml`
/// or `~/.config/allegro/config.toml` when `XDG_CONFIG_HOME` is not set.
pub fn default_config_path() -> Option<PathBuf> {
    config_dir().map(|d| d.join("config.toml"))
}
