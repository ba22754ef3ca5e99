use anyhow::{Context, Result};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::{info, warn};

use crate::chunking::{chunk_count, partition};
use crate::constants::THUMBNAIL_PROGRESS_EVERY;
use crate::extractor::{extract_chunk_outcome, MetadataExtractor};
use crate::image_processing::{create_thumbnail, ThumbnailOutcome, ThumbnailTask};
use crate::pool::WorkerPool;
use crate::records::PhotoRecord;
use crate::utils::ensure_directory_exists;

/// Merged result of the extraction stage.
#[derive(Debug, Default)]
pub struct ExtractionSummary {
    /// GPS-tagged records, in chunk completion order
    pub records: Vec<PhotoRecord>,
    pub chunks: usize,
    pub failed_chunks: usize,
}

/// Tally of the thumbnail stage.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ThumbnailSummary {
    pub created: usize,
    pub skipped: usize,
    pub failed: usize,
}

impl ThumbnailSummary {
    /// Thumbnails that exist after the run
    pub fn succeeded(&self) -> usize {
        self.created + self.skipped
    }

    fn count(&mut self, outcome: &ThumbnailOutcome) {
        match outcome {
            ThumbnailOutcome::Created => self.created += 1,
            ThumbnailOutcome::Skipped => self.skipped += 1,
            ThumbnailOutcome::Failed(_) => self.failed += 1,
        }
    }
}

/// Thumbnail stage result: the tally plus which sources have no thumbnail.
#[derive(Debug, Default)]
pub struct ThumbnailReport {
    pub summary: ThumbnailSummary,
    /// `source_file` of every record whose thumbnail could not be made
    pub failed_sources: HashSet<String>,
}

/// Extracts GPS metadata from `files` with a pool of `workers` threads,
/// one extractor call per chunk.
pub fn extract_all(
    files: &[PathBuf],
    workers: usize,
    extractor: &dyn MetadataExtractor,
) -> Result<ExtractionSummary> {
    let chunks = partition(files, chunk_count(workers));
    let total = chunks.len();
    let mut summary = ExtractionSummary {
        chunks: total,
        ..Default::default()
    };
    if chunks.is_empty() {
        info!("No files to extract metadata from");
        return Ok(summary);
    }

    info!(
        "Extracting metadata from {} files in {} chunks with {} workers ({})",
        files.len(),
        total,
        workers,
        extractor.name()
    );
    let start_time = Instant::now();
    let pool = WorkerPool::new(workers, "extract")?;
    let mut done = 0;

    pool.run_unordered(
        chunks,
        |chunk| extract_chunk_outcome(extractor, &chunk),
        |outcome| {
            done += 1;
            if outcome.failed() {
                summary.failed_chunks += 1;
            }
            summary.records.extend(outcome.records);
            info!(
                "Chunk {}/{} done, {} photos with GPS so far",
                done,
                total,
                summary.records.len()
            );
        },
    );

    info!(
        "Extraction finished in {:.2}s: {} photos with GPS, {} of {} chunks failed",
        start_time.elapsed().as_secs_f64(),
        summary.records.len(),
        summary.failed_chunks,
        total
    );
    Ok(summary)
}

/// Creates a thumbnail for every record under `dest_dir`.
///
/// Per-item failures are logged and counted; only failing to create the
/// destination directory or the pool is an error.
pub fn generate_thumbnails(
    records: &[PhotoRecord],
    dest_dir: &Path,
    size: (u32, u32),
    workers: usize,
) -> Result<ThumbnailReport> {
    ensure_directory_exists(dest_dir)
        .with_context(|| format!("Failed to create thumbnail directory {}", dest_dir.display()))?;
    info!("Thumbnails will be saved to: {}", dest_dir.display());

    let tasks: Vec<(&str, ThumbnailTask)> = records
        .iter()
        .map(|record| {
            (
                record.source_file.as_str(),
                ThumbnailTask {
                    source: PathBuf::from(&record.source_file),
                    dest_dir: dest_dir.to_path_buf(),
                    width: size.0,
                    height: size.1,
                },
            )
        })
        .collect();
    let total = tasks.len();

    let start_time = Instant::now();
    let pool = WorkerPool::new(workers, "thumbnail")?;
    let mut report = ThumbnailReport::default();
    let summary = &mut report.summary;
    let failed_sources = &mut report.failed_sources;
    let mut completed = 0;

    pool.run_unordered(
        tasks,
        |(source_file, task)| {
            let outcome = create_thumbnail(&task);
            (source_file, task, outcome)
        },
        |(source_file, task, outcome)| {
            completed += 1;
            summary.count(&outcome);
            if let ThumbnailOutcome::Failed(reason) = &outcome {
                warn!("Could not create thumbnail for {}: {}", task.source.display(), reason);
                failed_sources.insert(source_file.to_string());
            }
            if completed % THUMBNAIL_PROGRESS_EVERY == 0 {
                info!(
                    "Processed {}/{} thumbnails ({} ok)",
                    completed,
                    total,
                    summary.succeeded()
                );
            }
        },
    );

    info!(
        "Thumbnails finished in {:.2}s: {} created, {} already present, {} failed",
        start_time.elapsed().as_secs_f64(),
        report.summary.created,
        report.summary.skipped,
        report.summary.failed
    );
    Ok(report)
}
