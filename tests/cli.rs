use exif::experimental::Writer;
use exif::{Field, In, Rational, Tag, Value};
use image::{DynamicImage, ImageFormat};
use std::io::Cursor;
use std::path::Path;
use std::process::{Command, Output};

use photomap_prepare::geojson::FeatureCollection;

fn photomap(dir: &Path, args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_photomap-prepare"))
        .args(args)
        .current_dir(dir)
        .env_remove("RUST_LOG")
        .env("NO_COLOR", "1")
        .output()
        .unwrap()
}

fn stderr(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).into_owned()
}

fn rational_triple(d: u32, m: u32, s: u32) -> Value {
    Value::Rational(vec![
        Rational { num: d, denom: 1 },
        Rational { num: m, denom: 1 },
        Rational { num: s, denom: 1 },
    ])
}

fn ascii(s: &str) -> Value {
    Value::Ascii(vec![s.as_bytes().to_vec()])
}

/// A 64x48 JPEG carrying 40°N 73°W in its APP1 segment.
fn write_gps_jpeg(path: &Path) {
    let fields = [
        (Tag::GPSLatitudeRef, ascii("N")),
        (Tag::GPSLatitude, rational_triple(40, 0, 0)),
        (Tag::GPSLongitudeRef, ascii("W")),
        (Tag::GPSLongitude, rational_triple(73, 0, 0)),
        (Tag::DateTimeOriginal, ascii("2022:08:14 09:30:00")),
    ]
    .map(|(tag, value)| Field {
        tag,
        ifd_num: In::PRIMARY,
        value,
    });
    let mut writer = Writer::new();
    for field in &fields {
        writer.push_field(field);
    }
    let mut tiff = Cursor::new(Vec::new());
    writer.write(&mut tiff, false).unwrap();
    let tiff = tiff.into_inner();

    let mut jpeg = Vec::new();
    DynamicImage::new_rgb8(64, 48)
        .write_to(&mut Cursor::new(&mut jpeg), ImageFormat::Jpeg)
        .unwrap();

    let mut out = Vec::new();
    out.extend_from_slice(&jpeg[..2]);
    out.extend_from_slice(&[0xFF, 0xE1]);
    out.extend_from_slice(&((2 + 6 + tiff.len()) as u16).to_be_bytes());
    out.extend_from_slice(b"Exif\0\0");
    out.extend_from_slice(&tiff);
    out.extend_from_slice(&jpeg[2..]);
    std::fs::write(path, out).unwrap();
}

#[test]
fn test_missing_root_exits_with_1() {
    let dir = tempfile::tempdir().unwrap();

    let output = photomap(dir.path(), &["does-not-exist", "--extractor", "native"]);

    assert_eq!(output.status.code(), Some(1));
    assert!(stderr(&output).contains("Photos directory not found"), "{}", stderr(&output));
}

#[test]
fn test_empty_directory_exits_with_1() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::create_dir(dir.path().join("photos")).unwrap();

    let output = photomap(dir.path(), &["photos", "--extractor", "native"]);

    assert_eq!(output.status.code(), Some(1));
    assert!(!dir.path().join("photos_with_thumbs.geojson").exists());
    assert!(!dir.path().join("photos.json").exists());
}

#[test]
fn test_missing_exiftool_exits_with_1() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::create_dir(dir.path().join("photos")).unwrap();
    write_gps_jpeg(&dir.path().join("photos").join("ny.jpg"));

    let output = photomap(dir.path(), &["photos", "--exiftool", "/nonexistent/exiftool"]);

    assert_eq!(output.status.code(), Some(1));
    assert!(stderr(&output).contains("not found or not runnable"), "{}", stderr(&output));
    assert!(!dir.path().join("photos_with_thumbs.geojson").exists());
}

#[test]
fn test_unreadable_settings_file_exits_with_1() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::create_dir(dir.path().join("photos")).unwrap();

    let output = photomap(dir.path(), &["photos", "-c", "missing.toml"]);

    assert_eq!(output.status.code(), Some(1));
}

#[test]
fn test_native_run_exits_with_0_and_writes_outputs() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::create_dir(dir.path().join("photos")).unwrap();
    write_gps_jpeg(&dir.path().join("photos").join("ny.jpg"));

    let output = photomap(dir.path(), &["photos", "--extractor", "native", "-w", "2"]);

    assert_eq!(output.status.code(), Some(0), "{}", stderr(&output));
    let text = std::fs::read_to_string(dir.path().join("photos_with_thumbs.geojson")).unwrap();
    let collection: FeatureCollection = serde_json::from_str(&text).unwrap();
    assert_eq!(collection.features.len(), 1);
    let feature = &collection.features[0];
    assert_eq!(feature.geometry.coordinates, [-73.0, 40.0]);
    assert_eq!(feature.properties.datetime, "2022:08:14 09:30:00");
    assert_eq!(feature.properties.thumb.as_deref(), Some("thumbnails/ny.jpg"));
    assert!(dir.path().join("thumbnails").join("ny.jpg").is_file());
    assert!(dir.path().join("photos.json").is_file());
}

#[test]
fn test_reuse_metadata_does_not_need_exiftool() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::create_dir(dir.path().join("photos")).unwrap();
    write_gps_jpeg(&dir.path().join("photos").join("ny.jpg"));
    let first = photomap(dir.path(), &["photos", "--extractor", "native"]);
    assert_eq!(first.status.code(), Some(0), "{}", stderr(&first));
    std::fs::remove_file(dir.path().join("photos_with_thumbs.geojson")).unwrap();

    let output = photomap(
        dir.path(),
        &["photos", "--reuse-metadata", "--exiftool", "/nonexistent/exiftool"],
    );

    assert_eq!(output.status.code(), Some(0), "{}", stderr(&output));
    assert!(dir.path().join("photos_with_thumbs.geojson").is_file());
}
