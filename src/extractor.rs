//! Metadata extraction worker interface.

use anyhow::Result;
use clap::ValueEnum;
use serde::Deserialize;
use tracing::{debug, warn};

use crate::chunking::Chunk;
use crate::records::PhotoRecord;

/// Reads GPS metadata for a whole chunk in one call.
///
/// Implementations should only return records that carry both latitude and
/// longitude. An `Err` means the chunk as a whole could not be processed.
pub trait MetadataExtractor: Send + Sync {
    fn name(&self) -> &str;

    fn extract_chunk(&self, chunk: &Chunk) -> Result<Vec<PhotoRecord>>;
}

/// Available extractor backends.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExtractorKind {
    /// External exiftool process, one invocation per chunk
    #[default]
    Exiftool,
    /// In-process EXIF reader
    Native,
}

/// Result of running one chunk through an extractor.
#[derive(Debug)]
pub struct ChunkOutcome {
    pub chunk_id: usize,
    pub file_count: usize,
    pub records: Vec<PhotoRecord>,
    pub error: Option<String>,
}

impl ChunkOutcome {
    pub fn failed(&self) -> bool {
        self.error.is_some()
    }
}

/// Runs one chunk, turning a failure into an empty outcome so sibling
/// chunks are unaffected.
pub fn extract_chunk_outcome(extractor: &dyn MetadataExtractor, chunk: &Chunk) -> ChunkOutcome {
    debug!("Chunk {}: extracting {} files", chunk.id, chunk.files.len());
    match extractor.extract_chunk(chunk) {
        Ok(records) => ChunkOutcome {
            chunk_id: chunk.id,
            file_count: chunk.files.len(),
            records,
            error: None,
        },
        Err(e) => {
            warn!("Chunk {} ({} files) failed: {:#}", chunk.id, chunk.files.len(), e);
            ChunkOutcome {
                chunk_id: chunk.id,
                file_count: chunk.files.len(),
                records: Vec::new(),
                error: Some(format!("{:#}", e)),
            }
        }
    }
}
