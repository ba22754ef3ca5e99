//! GeoJSON feature collection for the map front end.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;
use tracing::warn;

use crate::records::PhotoRecord;
use crate::utils::write_json_atomic;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureCollection {
    #[serde(rename = "type")]
    pub kind: String,
    pub features: Vec<Feature>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Feature {
    #[serde(rename = "type")]
    pub kind: String,
    pub geometry: Point,
    pub properties: FeatureProperties,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Point {
    #[serde(rename = "type")]
    pub kind: String,
    /// `[longitude, latitude]`
    pub coordinates: [f64; 2],
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureProperties {
    pub filename: String,
    pub datetime: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thumb: Option<String>,
    pub original: String,
}

/// How feature properties reference files next to the GeoJSON.
#[derive(Debug, Clone, Default)]
pub struct FeatureOptions {
    /// Thumbnail directory as the map should see it; `None` when no
    /// thumbnails were generated
    pub thumb_dir: Option<String>,
    /// Directory prefix for links to the full-size photo
    pub original_prefix: String,
    /// `source_file` values whose thumbnail is missing; their features get
    /// no `thumb` property
    pub missing_thumbs: HashSet<String>,
}

#[derive(Debug)]
pub struct GeoJsonReport {
    pub collection: FeatureCollection,
    /// Records dropped for out-of-range coordinates
    pub skipped: usize,
}

/// Strict WGS84 range check. NaN and infinities fail it too.
pub fn coordinates_valid(latitude: f64, longitude: f64) -> bool {
    (-90.0..=90.0).contains(&latitude) && (-180.0..=180.0).contains(&longitude)
}

impl Feature {
    pub fn from_record(record: &PhotoRecord, options: &FeatureOptions) -> Self {
        Feature {
            kind: "Feature".to_string(),
            geometry: Point {
                kind: "Point".to_string(),
                coordinates: [record.longitude, record.latitude],
            },
            properties: FeatureProperties {
                filename: record.file_name.clone(),
                datetime: record.datetime_original.clone(),
                thumb: options
                    .thumb_dir
                    .as_deref()
                    .filter(|_| !options.missing_thumbs.contains(&record.source_file))
                    .map(|dir| join_reference(dir, &record.file_name)),
                original: join_reference(&options.original_prefix, &record.file_name),
            },
        }
    }
}

/// One feature per record with valid coordinates; the rest are counted
/// and logged, never clamped.
pub fn build_feature_collection(records: &[PhotoRecord], options: &FeatureOptions) -> GeoJsonReport {
    let mut features = Vec::with_capacity(records.len());
    let mut skipped = 0;

    for record in records {
        if !coordinates_valid(record.latitude, record.longitude) {
            warn!(
                "Invalid coordinates for {}: lat={}, lon={}",
                record.file_name, record.latitude, record.longitude
            );
            skipped += 1;
            continue;
        }
        features.push(Feature::from_record(record, options));
    }

    GeoJsonReport {
        collection: FeatureCollection {
            kind: "FeatureCollection".to_string(),
            features,
        },
        skipped,
    }
}

/// Writes the collection as pretty JSON, replacing `path` atomically.
pub fn write_feature_collection(path: &Path, collection: &FeatureCollection) -> Result<()> {
    write_json_atomic(path, collection)
        .with_context(|| format!("Could not write {}", path.display()))
}

/// URL-style join: always `/`, no doubled separators.
fn join_reference(prefix: &str, name: &str) -> String {
    let prefix = prefix.replace('\\', "/");
    let prefix = prefix.trim_end_matches('/');
    if prefix.is_empty() {
        name.to_string()
    } else {
        format!("{}/{}", prefix, name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    fn record(name: &str, latitude: f64, longitude: f64) -> PhotoRecord {
        PhotoRecord {
            source_file: format!("/photos/{}", name),
            latitude,
            longitude,
            datetime_original: String::new(),
            file_name: name.to_string(),
        }
    }

    fn options() -> FeatureOptions {
        FeatureOptions {
            thumb_dir: Some("thumbnails".to_string()),
            original_prefix: "photos".to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn test_valid_records_become_lon_lat_points() {
        let records = vec![record("a.jpg", 40.0, -73.0), record("b.jpg", 51.5, -0.1)];

        let report = build_feature_collection(&records, &options());

        assert_eq!(report.skipped, 0);
        let coords: Vec<[f64; 2]> = report
            .collection
            .features
            .iter()
            .map(|f| f.geometry.coordinates)
            .collect();
        assert_eq!(coords, vec![[-73.0, 40.0], [-0.1, 51.5]]);
    }

    #[test]
    fn test_range_boundaries_are_inclusive() {
        for (lat, lon) in [(90.0, 180.0), (-90.0, -180.0), (0.0, 0.0), (-89.999, 179.999)] {
            let report = build_feature_collection(&[record("x.jpg", lat, lon)], &options());
            assert_eq!(report.collection.features.len(), 1, "lat={} lon={}", lat, lon);
            assert_eq!(report.collection.features[0].geometry.coordinates, [lon, lat]);
        }
    }

    #[test]
    fn test_out_of_range_records_are_dropped_and_counted() {
        let records = vec![
            record("ok.jpg", 10.0, 10.0),
            record("lat.jpg", 95.0, 10.0),
            record("lon.jpg", 10.0, -180.5),
            record("nan.jpg", f64::NAN, 0.0),
            record("inf.jpg", 0.0, f64::INFINITY),
        ];

        let report = build_feature_collection(&records, &options());

        assert_eq!(report.skipped, 4);
        assert_eq!(report.collection.features.len(), 1);
        assert_eq!(report.collection.features[0].properties.filename, "ok.jpg");
    }

    /// Collects formatted log output for assertions.
    #[derive(Clone, Default)]
    struct CapturedLogs(Arc<Mutex<Vec<u8>>>);

    impl std::io::Write for CapturedLogs {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    impl CapturedLogs {
        fn text(&self) -> String {
            String::from_utf8_lossy(&self.0.lock().unwrap()).into_owned()
        }
    }

    #[test]
    fn test_out_of_range_record_is_logged_as_warning() {
        let logs = CapturedLogs::default();
        let writer = logs.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_writer(move || writer.clone())
            .with_ansi(false)
            .finish();

        let report = tracing::subscriber::with_default(subscriber, || {
            build_feature_collection(
                &[record("ok.jpg", 10.0, 10.0), record("pole.jpg", 95.0, 0.0)],
                &options(),
            )
        });

        assert_eq!(report.skipped, 1);
        let text = logs.text();
        let line = text
            .lines()
            .find(|l| l.contains("pole.jpg"))
            .unwrap_or_else(|| panic!("no log line for pole.jpg in {:?}", text));
        assert!(line.contains("WARN"), "{}", line);
        assert!(line.contains("lat=95"), "{}", line);
        assert!(!text.contains("ok.jpg"));
    }

    #[test]
    fn test_failed_thumbnail_leaves_thumb_unset() {
        let records = vec![record("good.jpg", 1.0, 2.0), record("corrupt.jpg", 3.0, 4.0)];
        let opts = FeatureOptions {
            missing_thumbs: HashSet::from(["/photos/corrupt.jpg".to_string()]),
            ..options()
        };

        let report = build_feature_collection(&records, &opts);

        let features = &report.collection.features;
        assert_eq!(features.len(), 2);
        assert_eq!(features[0].properties.thumb.as_deref(), Some("thumbnails/good.jpg"));
        assert_eq!(features[1].properties.thumb, None);
        assert_eq!(features[1].properties.original, "photos/corrupt.jpg");
    }

    #[test]
    fn test_properties_reference_thumbnail_and_original() {
        let mut r = record("IMG_1.JPG", 1.0, 2.0);
        r.datetime_original = "2023:05:01 10:20:30".to_string();
        let opts = FeatureOptions {
            thumb_dir: Some("out/thumbs/".to_string()),
            original_prefix: "photos".to_string(),
            ..Default::default()
        };

        let feature = Feature::from_record(&r, &opts);

        assert_eq!(feature.properties.thumb.as_deref(), Some("out/thumbs/IMG_1.JPG"));
        assert_eq!(feature.properties.original, "photos/IMG_1.JPG");
        assert_eq!(feature.properties.datetime, "2023:05:01 10:20:30");
    }

    #[test]
    fn test_serialized_shape_matches_geojson() {
        let opts = FeatureOptions::default();
        let report = build_feature_collection(&[record("a.jpg", 40.0, -73.0)], &opts);

        let value = serde_json::to_value(&report.collection).unwrap();

        assert_eq!(value["type"], "FeatureCollection");
        let feature = &value["features"][0];
        assert_eq!(feature["type"], "Feature");
        assert_eq!(feature["geometry"]["type"], "Point");
        assert_eq!(feature["geometry"]["coordinates"], serde_json::json!([-73.0, 40.0]));
        assert_eq!(feature["properties"]["datetime"], "");
        assert_eq!(feature["properties"]["original"], "a.jpg");
        assert!(feature["properties"].get("thumb").is_none());
    }

    #[test]
    fn test_write_replaces_existing_output() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("photos.geojson");
        std::fs::write(&path, "stale").unwrap();

        let report = build_feature_collection(&[record("a.jpg", 1.0, 2.0)], &options());
        write_feature_collection(&path, &report.collection).unwrap();

        let text = std::fs::read_to_string(&path).unwrap();
        let back: FeatureCollection = serde_json::from_str(&text).unwrap();
        assert_eq!(back, report.collection);
    }
}
