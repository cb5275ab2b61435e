//! allegro: a terminal music player built around a polled playback engine,
//! a position tracker and a live spectrum analyzer.
//!
//! The library holds the player core (`session`, `tracker`, `playlist`,
//! `audio`, `spectrum`); `runtime`, `app` and `ui` are the terminal
//! front-end driving it.

pub mod app;
pub mod audio;
pub mod config;
pub mod error;
pub mod library;
pub mod logging;
pub mod playlist;
pub mod runtime;
pub mod session;
pub mod spectrum;
pub mod tracker;
pub mod ui;

pub use error::{PlayerError, Result};
pub use session::{PlayerSession, SessionEvent};
