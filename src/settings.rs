use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::error::ConfigError;
use crate::extractor::ExtractorKind;

/// File looked up in the working directory when `--config` is not given.
pub const DEFAULT_SETTINGS_FILE: &str = "photomap.toml";

/// Optional defaults read from a TOML file. Every key may be omitted;
/// command-line flags win over anything set here.
///
/// ```toml
/// workers = 8
/// thumb_width = 200
/// thumb_height = 200
/// thumb_dir = "web/thumbnails"
/// output = "web/photos.geojson"
/// extractor = "native"
/// extensions = ["jpg", "jpeg", "png"]
/// ```
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Settings {
    pub workers: Option<usize>,
    pub thumb_width: Option<u32>,
    pub thumb_height: Option<u32>,
    pub thumb_dir: Option<PathBuf>,
    pub metadata_file: Option<PathBuf>,
    pub output: Option<PathBuf>,
    pub original_prefix: Option<String>,
    pub extractor: Option<ExtractorKind>,
    pub exiftool: Option<PathBuf>,
    pub extensions: Option<Vec<String>>,
    pub include_hidden: Option<bool>,
}

impl Settings {
    /// Loads `path` if given (it must exist), otherwise `photomap.toml` from
    /// the working directory if present, otherwise built-in defaults.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        match path {
            Some(path) => Self::from_file(path),
            None => {
                let fallback = Path::new(DEFAULT_SETTINGS_FILE);
                if fallback.is_file() {
                    Self::from_file(fallback)
                } else {
                    Ok(Settings::default())
                }
            }
        }
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::SettingsRead {
            path: path.to_path_buf(),
            source,
        })?;
        toml::from_str(&content).map_err(|source| ConfigError::SettingsParse {
            path: path.to_path_buf(),
            source,
        })
    }
}
