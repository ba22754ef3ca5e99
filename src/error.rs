//! Typed configuration errors.
//!
//! Everything in here is fatal: the run stops before any work is dispatched.
//! Per-chunk and per-item failures are not errors at all, they travel as
//! outcome values (see `extractor::ChunkOutcome` and
//! `image_processing::ThumbnailOutcome`).

use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    /// The photo root does not exist
    #[error("Photos directory not found: {}", .0.display())]
    RootNotFound(PathBuf),

    /// The photo root exists but is a file
    #[error("Not a directory: {}", .0.display())]
    NotADirectory(PathBuf),

    /// The external metadata extractor could not be started
    #[error("{program} not found or not runnable ({reason}). Download from https://exiftool.org/")]
    ToolMissing { program: String, reason: String },

    /// The settings file could not be read
    #[error("Failed to read settings file {}: {source}", path.display())]
    SettingsRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The settings file is not valid TOML or has unknown keys
    #[error("Failed to parse settings file {}: {source}", path.display())]
    SettingsParse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    /// A configuration value is out of range
    #[error("Invalid configuration: {0}")]
    InvalidValue(String),
}
