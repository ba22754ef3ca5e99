//! In-process EXIF backend built on kamadak-exif.
//!
//! Slower per file than a warm exiftool on large batches, but needs no
//! external binary.

pub mod generic;

use anyhow::Result;
use exif::Tag;
use std::path::Path;
use tracing::debug;

use crate::chunking::Chunk;
use crate::extractor::MetadataExtractor;
use crate::records::PhotoRecord;

pub use generic::{apply_exif_orientation, get_datetime_from_exif, get_gps_coord, read_exif};

#[derive(Debug, Clone, Copy, Default)]
pub struct NativeExif;

impl MetadataExtractor for NativeExif {
    fn name(&self) -> &str {
        "native"
    }

    fn extract_chunk(&self, chunk: &Chunk) -> Result<Vec<PhotoRecord>> {
        Ok(chunk
            .files
            .iter()
            .filter_map(|path| read_gps_record(path))
            .collect())
    }
}

/// Builds a record for `path` if its EXIF carries both coordinates.
pub fn read_gps_record(path: &Path) -> Option<PhotoRecord> {
    let Some(exif) = read_exif(path) else {
        debug!("No EXIF in {}", path.display());
        return None;
    };

    let latitude = get_gps_coord(&exif, Tag::GPSLatitude, Tag::GPSLatitudeRef);
    let longitude = get_gps_coord(&exif, Tag::GPSLongitude, Tag::GPSLongitudeRef);
    let (Some(latitude), Some(longitude)) = (latitude, longitude) else {
        debug!("No GPS data in {}", path.display());
        return None;
    };

    Some(PhotoRecord {
        source_file: path.to_string_lossy().into_owned(),
        latitude,
        longitude,
        datetime_original: get_datetime_from_exif(&exif).unwrap_or_default(),
        file_name: path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default(),
    })
}
