use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::path::Path;
use tracing::{debug, warn};

use crate::utils::write_json_atomic;

/// GPS metadata for one photo.
///
/// Field names follow exiftool's `-json` output so the intermediate
/// artifact can be swapped for a raw exiftool dump and vice versa.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PhotoRecord {
    #[serde(rename = "SourceFile")]
    pub source_file: String,
    #[serde(rename = "GPSLatitude")]
    pub latitude: f64,
    #[serde(rename = "GPSLongitude")]
    pub longitude: f64,
    #[serde(rename = "DateTimeOriginal", default)]
    pub datetime_original: String,
    #[serde(rename = "FileName")]
    pub file_name: String,
}

/// One entry as it comes out of the extractor, before validation.
#[derive(Debug, Deserialize)]
struct RawEntry {
    #[serde(rename = "SourceFile", default)]
    source_file: Option<String>,
    #[serde(rename = "GPSLatitude", default)]
    latitude: Option<Value>,
    #[serde(rename = "GPSLongitude", default)]
    longitude: Option<Value>,
    #[serde(rename = "DateTimeOriginal", default)]
    datetime_original: Option<Value>,
    #[serde(rename = "FileName", default)]
    file_name: Option<String>,
}

/// Records parsed from an extractor dump, with counts of what was left out.
#[derive(Debug, Default)]
pub struct ParsedRecords {
    pub records: Vec<PhotoRecord>,
    /// Entries carrying no latitude or no longitude at all
    pub without_gps: usize,
    /// Entries whose coordinates are present but not numeric
    pub unparsable: usize,
}

/// Parses an exiftool-style JSON array (`-n -json`).
///
/// Empty input means "no files matched" and yields no records.
/// Malformed JSON is an error; malformed individual entries are dropped.
pub fn parse_exiftool_json(data: &[u8]) -> Result<ParsedRecords> {
    if data.iter().all(u8::is_ascii_whitespace) {
        return Ok(ParsedRecords::default());
    }

    let entries: Vec<RawEntry> =
        serde_json::from_slice(data).context("Extractor output is not a JSON array")?;

    let mut parsed = ParsedRecords::default();
    for entry in entries {
        let source = entry.source_file.unwrap_or_default();
        let (Some(lat), Some(lon)) = (entry.latitude, entry.longitude) else {
            debug!("No GPS data for {}", source);
            parsed.without_gps += 1;
            continue;
        };

        let (latitude, longitude) = match (coordinate_value(&lat), coordinate_value(&lon)) {
            (Some(latitude), Some(longitude)) => (latitude, longitude),
            _ => {
                warn!("Could not parse coordinates for {}: lat={}, lon={}", source, lat, lon);
                parsed.unparsable += 1;
                continue;
            }
        };

        let file_name = entry.file_name.unwrap_or_else(|| {
            Path::new(&source)
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_else(|| "unknown".to_string())
        });

        parsed.records.push(PhotoRecord {
            source_file: source,
            latitude,
            longitude,
            datetime_original: entry.datetime_original.map(text_value).unwrap_or_default(),
            file_name,
        });
    }

    Ok(parsed)
}

/// Accepts JSON numbers and numeric strings; exiftool emits either
/// depending on the tag and on `-n`.
fn coordinate_value(value: &Value) -> Option<f64> {
    let number = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    }?;
    number.is_finite().then_some(number)
}

fn text_value(value: Value) -> String {
    match value {
        Value::String(s) => s,
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

/// Persists the merged record list as the intermediate artifact.
pub fn save_records(path: &Path, records: &[PhotoRecord]) -> Result<()> {
    write_json_atomic(path, records)
        .with_context(|| format!("Failed to write metadata file {}", path.display()))
}

/// Loads a previously saved artifact (or a raw exiftool dump).
pub fn load_records(path: &Path) -> Result<ParsedRecords> {
    let data = std::fs::read(path)
        .with_context(|| format!("Failed to read metadata file {}", path.display()))?;
    parse_exiftool_json(&data)
        .with_context(|| format!("Invalid JSON in metadata file {}", path.display()))
}
