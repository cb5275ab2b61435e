//! Error taxonomy shared by the playback, capture and library layers.
//!
//! Per-track and per-frame errors are meant to be logged and contained by
//! the caller; only `DeviceUnavailable` is expected to reach the top level,
//! and even then the runtime falls back to a degraded mode.

use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum PlayerError {
    /// The file could not be opened or decoded for playback.
    #[error("cannot decode {path:?}: {reason}")]
    Decode { path: PathBuf, reason: String },

    /// The capture buffer overran because the consumer fell behind.
    #[error("capture buffer overflowed; frame dropped")]
    CaptureOverflow,

    /// Tags or audio properties could not be read.
    #[error("cannot read metadata from {path:?}: {reason}")]
    Metadata { path: PathBuf, reason: String },

    /// No usable audio output or input device.
    #[error("audio device unavailable: {0}")]
    DeviceUnavailable(String),

    /// A transport command was issued with nothing loaded.
    #[error("nothing is loaded")]
    NothingLoaded,

    /// A capture frame whose length the pipeline was not planned for.
    #[error("frame has {actual} samples, expected {expected}")]
    FrameSize { expected: usize, actual: usize },

    /// A folder action was pointed at something that is not a directory.
    #[error("{0:?} is not a directory")]
    NotADirectory(PathBuf),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// The persisted folder state could not be encoded or decoded.
    #[error("state file: {0}")]
    State(String),
}

impl PlayerError {
    pub(crate) fn decode(path: impl Into<PathBuf>, reason: impl ToString) -> Self {
        Self::Decode {
            path: path.into(),
            reason: reason.to_string(),
        }
    }

    pub(crate) fn metadata(path: impl Into<PathBuf>, reason: impl ToString) -> Self {
        Self::Metadata {
            path: path.into(),
            reason: reason.to_string(),
        }
    }

    /// Whether this error only costs a single frame of spectrum output.
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::CaptureOverflow | Self::FrameSize { .. })
    }
}

pub type Result<T> = std::result::Result<T, PlayerError>;
