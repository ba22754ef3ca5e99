//! Stage sequencing: discovery, extraction, thumbnails, GeoJSON.
//!
//! Each stage finishes completely before the next one starts. The merged
//! metadata is written to disk between extraction and the later stages so
//! those can be re-run on their own with `reuse_metadata`.

use anyhow::Result;
use std::collections::HashSet;
use std::path::PathBuf;
use tracing::{info, warn};

use crate::discovery::{discover_images, DiscoveryOptions};
use crate::extractor::MetadataExtractor;
use crate::geojson::{build_feature_collection, write_feature_collection, FeatureOptions};
use crate::processing::{extract_all, generate_thumbnails, ThumbnailSummary};
use crate::records::{load_records, save_records, PhotoRecord};

/// Fully resolved settings for one run.
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    pub photo_dir: PathBuf,
    pub workers: usize,
    pub thumb_size: (u32, u32),
    pub thumb_dir: PathBuf,
    pub metadata_file: PathBuf,
    pub output: PathBuf,
    pub original_prefix: String,
    pub discovery: DiscoveryOptions,
    /// Load `metadata_file` instead of scanning and extracting
    pub reuse_metadata: bool,
    pub thumbnails: bool,
}

#[derive(Debug, Default)]
pub struct RunSummary {
    /// `None` when the metadata file was reused
    pub discovered: Option<usize>,
    pub records: usize,
    pub failed_chunks: usize,
    pub thumbnails: Option<ThumbnailSummary>,
    pub features: usize,
    /// Records dropped by the coordinate range check
    pub skipped_coordinates: usize,
}

#[derive(Debug)]
pub enum RunOutcome {
    Completed(RunSummary),
    /// Extraction found nothing to map; later stages were not run
    NoGpsRecords,
}

pub fn run(config: &PipelineConfig, extractor: &dyn MetadataExtractor) -> Result<RunOutcome> {
    let mut summary = RunSummary::default();

    let records = if config.reuse_metadata {
        info!("Loading metadata from {}", config.metadata_file.display());
        let parsed = load_records(&config.metadata_file)?;
        if parsed.without_gps > 0 || parsed.unparsable > 0 {
            info!(
                "Ignored {} entries without GPS and {} with unreadable coordinates",
                parsed.without_gps, parsed.unparsable
            );
        }
        parsed.records
    } else {
        extract_stage(config, extractor, &mut summary)?
    };
    summary.records = records.len();

    if records.is_empty() {
        info!("No photos with GPS data found, nothing to map");
        return Ok(RunOutcome::NoGpsRecords);
    }

    let mut missing_thumbs = HashSet::new();
    if config.thumbnails {
        let report = generate_thumbnails(&records, &config.thumb_dir, config.thumb_size, config.workers)?;
        if report.summary.failed > 0 {
            warn!("{} thumbnails could not be created", report.summary.failed);
        }
        summary.thumbnails = Some(report.summary);
        missing_thumbs = report.failed_sources;
    }

    let options = FeatureOptions {
        thumb_dir: config
            .thumbnails
            .then(|| config.thumb_dir.to_string_lossy().into_owned()),
        original_prefix: config.original_prefix.clone(),
        missing_thumbs,
    };
    let report = build_feature_collection(&records, &options);
    write_feature_collection(&config.output, &report.collection)?;
    summary.features = report.collection.features.len();
    summary.skipped_coordinates = report.skipped;

    info!("Created {}", config.output.display());
    info!("  Features: {}", summary.features);
    info!("  Skipped (invalid coordinates): {}", summary.skipped_coordinates);
    if let Some(thumbs) = &summary.thumbnails {
        info!(
            "  Thumbnails: {} created, {} already present, {} failed",
            thumbs.created, thumbs.skipped, thumbs.failed
        );
    }

    Ok(RunOutcome::Completed(summary))
}

fn extract_stage(
    config: &PipelineConfig,
    extractor: &dyn MetadataExtractor,
    summary: &mut RunSummary,
) -> Result<Vec<PhotoRecord>> {
    let files = discover_images(&config.photo_dir, &config.discovery)?;
    summary.discovered = Some(files.len());

    let extraction = extract_all(&files, config.workers, extractor)?;
    summary.failed_chunks = extraction.failed_chunks;
    info!(
        "Total photos: {}, Photos with GPS: {}",
        files.len(),
        extraction.records.len()
    );

    if !extraction.records.is_empty() {
        save_records(&config.metadata_file, &extraction.records)?;
        info!("Saved metadata to {}", config.metadata_file.display());
    }
    Ok(extraction.records)
}
