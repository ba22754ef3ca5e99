use clap::Parser;
use std::path::PathBuf;

use crate::constants::*;
use crate::discovery::DiscoveryOptions;
use crate::error::ConfigError;
use crate::extractor::ExtractorKind;
use crate::pipeline::PipelineConfig;
use crate::settings::Settings;
use crate::utils::default_worker_count;

/// Extract GPS data from photos, create thumbnails and build a GeoJSON map layer.
#[derive(Debug, Parser)]
#[command(name = "photomap-prepare", version, about)]
pub struct Cli {
    /// Root directory containing the photos
    pub photo_dir: PathBuf,

    /// Worker threads per stage [default: number of CPU cores]
    #[arg(short, long)]
    pub workers: Option<usize>,

    /// Thumbnail bounding box [default: 150 150]
    #[arg(long, num_args = 2, value_names = ["WIDTH", "HEIGHT"])]
    pub thumb_size: Option<Vec<u32>>,

    /// Thumbnail directory [default: thumbnails]
    #[arg(long)]
    pub thumb_dir: Option<PathBuf>,

    /// Intermediate metadata JSON [default: photos.json]
    #[arg(long)]
    pub metadata_file: Option<PathBuf>,

    /// Output GeoJSON file [default: photos_with_thumbs.geojson]
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Prefix for the `original` property [default: photos]
    #[arg(long)]
    pub original_prefix: Option<String>,

    /// Metadata extractor backend [default: exiftool]
    #[arg(long, value_enum)]
    pub extractor: Option<ExtractorKind>,

    /// Path to the exiftool binary [default: exiftool]
    #[arg(long)]
    pub exiftool: Option<PathBuf>,

    /// Photo file extension to include; repeat for several [default: jpg, jpeg]
    #[arg(long = "ext", value_name = "EXT")]
    pub extensions: Vec<String>,

    /// Also scan hidden files and directories
    #[arg(long)]
    pub include_hidden: bool,

    /// Skip scanning and extraction; load the metadata file from a previous run
    #[arg(long)]
    pub reuse_metadata: bool,

    /// Do not generate thumbnails
    #[arg(long)]
    pub no_thumbnails: bool,

    /// Settings file [default: ./photomap.toml if present]
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long)]
    pub verbose: bool,

    /// Emit logs as JSON
    #[arg(long)]
    pub json_logs: bool,
}

/// Everything `main` needs after merging flags, settings and defaults.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub pipeline: PipelineConfig,
    pub extractor: ExtractorKind,
    pub exiftool: PathBuf,
}

impl Cli {
    /// Flags override the settings file, which overrides built-in defaults.
    pub fn resolve(self, settings: Settings) -> Result<AppConfig, ConfigError> {
        let workers = self
            .workers
            .or(settings.workers)
            .unwrap_or_else(default_worker_count);
        if workers == 0 {
            return Err(ConfigError::InvalidValue("workers must be at least 1".to_string()));
        }

        let thumb_size = match self.thumb_size.as_deref() {
            Some([w, h]) => (*w, *h),
            Some(other) => {
                return Err(ConfigError::InvalidValue(format!(
                    "--thumb-size takes WIDTH HEIGHT, got {} values",
                    other.len()
                )))
            }
            None => (
                settings.thumb_width.unwrap_or(DEFAULT_THUMB_WIDTH),
                settings.thumb_height.unwrap_or(DEFAULT_THUMB_HEIGHT),
            ),
        };
        if thumb_size.0 == 0 || thumb_size.1 == 0 {
            return Err(ConfigError::InvalidValue(format!(
                "thumbnail size must be positive, got {}x{}",
                thumb_size.0, thumb_size.1
            )));
        }

        let raw_extensions = if !self.extensions.is_empty() {
            self.extensions
        } else {
            settings
                .extensions
                .unwrap_or_else(|| DEFAULT_EXTENSIONS.iter().map(|e| e.to_string()).collect())
        };
        let extensions: Vec<String> = raw_extensions
            .iter()
            .map(|e| e.trim().trim_start_matches('.').to_lowercase())
            .filter(|e| !e.is_empty())
            .collect();
        if extensions.is_empty() {
            return Err(ConfigError::InvalidValue("extension list is empty".to_string()));
        }

        let pipeline = PipelineConfig {
            photo_dir: self.photo_dir,
            workers,
            thumb_size,
            thumb_dir: self
                .thumb_dir
                .or(settings.thumb_dir)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_THUMB_DIR)),
            metadata_file: self
                .metadata_file
                .or(settings.metadata_file)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_METADATA_FILE)),
            output: self
                .output
                .or(settings.output)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_OUTPUT_GEOJSON)),
            original_prefix: self
                .original_prefix
                .or(settings.original_prefix)
                .unwrap_or_else(|| DEFAULT_ORIGINAL_PREFIX.to_string()),
            discovery: DiscoveryOptions {
                extensions,
                include_hidden: self.include_hidden || settings.include_hidden.unwrap_or(false),
            },
            reuse_metadata: self.reuse_metadata,
            thumbnails: !self.no_thumbnails,
        };

        Ok(AppConfig {
            pipeline,
            extractor: self.extractor.or(settings.extractor).unwrap_or_default(),
            exiftool: self
                .exiftool
                .or(settings.exiftool)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_EXIFTOOL)),
        })
    }
}
