// Error types shared across the gallery
use std::path::PathBuf;
use thiserror::Error;

use crate::playback::SurfaceId;

/// Failure to read or parse a gallery configuration document
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("invalid built-in config: {0}")]
    Builtin(#[from] serde_json::Error),
}

/// A single image or video that could not be loaded.
/// Always recovered locally by rendering a placeholder.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum MediaError {
    #[error("media not found: {0}")]
    NotFound(PathBuf),

    #[error("failed to decode {path}: {reason}")]
    Decode { path: PathBuf, reason: String },
}

/// A play request that did not result in playback
#[derive(Debug, Clone, PartialEq, Error)]
pub enum PlaybackError {
    #[error("playback rejected: {0}")]
    Rejected(String),

    #[error("no media element registered for {0:?}")]
    UnknownSurface(SurfaceId),
}
