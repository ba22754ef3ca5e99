use chrono::NaiveDateTime;
use exif::{Exif, In, Reader, Tag, Value};
use image::DynamicImage;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

const EXIF_DATETIME_FORMAT: &str = "%Y:%m:%d %H:%M:%S";

/// Reads the EXIF block of a file, keeping whatever could be parsed when
/// the structure is partly broken (common after some editors rewrite it).
pub fn read_exif(path: &Path) -> Option<Exif> {
    let file = File::open(path).ok()?;
    let mut buf_reader = BufReader::new(file);
    let mut exif_reader = Reader::new();
    exif_reader.continue_on_error(true);

    match exif_reader.read_from_container(&mut buf_reader) {
        Ok(exif) => Some(exif),
        Err(exif::Error::PartialResult(partial)) => {
            let (exif, _errors) = partial.into_inner();
            Some(exif)
        }
        Err(_) => None,
    }
}

/// Rotates/flips an image according to its EXIF orientation tag.
/// Images without readable EXIF are returned unchanged.
pub fn apply_exif_orientation(source_path: &Path, img: DynamicImage) -> DynamicImage {
    let orientation = read_exif(source_path)
        .and_then(|exif| {
            exif.get_field(Tag::Orientation, In::PRIMARY)
                .and_then(|f| f.value.get_uint(0))
        })
        .unwrap_or(1);

    match orientation {
        2 => img.fliph(),
        3 => img.rotate180(),
        4 => img.flipv(),
        5 => img.rotate90().fliph(),
        6 => img.rotate90(),
        7 => img.rotate270().fliph(),
        8 => img.rotate270(),
        _ => img,
    }
}

/// Degrees/minutes/seconds to signed decimal degrees.
/// `S` and `W` hemispheres are negative.
pub fn dms_to_decimal(degrees: f64, minutes: f64, seconds: f64, hemisphere: Option<char>) -> f64 {
    let decimal = degrees + minutes / 60.0 + seconds / 3600.0;
    match hemisphere {
        Some('S') | Some('s') | Some('W') | Some('w') => -decimal,
        _ => decimal,
    }
}

/// Signed decimal coordinate from a GPS rational triple and its ref tag.
/// A missing ref is read as N/E.
pub fn get_gps_coord(exif: &Exif, coord_tag: Tag, ref_tag: Tag) -> Option<f64> {
    let coord = exif.get_field(coord_tag, In::PRIMARY)?;
    let Value::Rational(ref parts) = coord.value else {
        return None;
    };
    if parts.len() != 3 {
        return None;
    }

    let hemisphere = exif
        .get_field(ref_tag, In::PRIMARY)
        .and_then(|f| match f.value {
            Value::Ascii(ref vec) => vec.first().and_then(|s| s.first()).map(|b| *b as char),
            _ => None,
        });

    let decimal = dms_to_decimal(parts[0].to_f64(), parts[1].to_f64(), parts[2].to_f64(), hemisphere);
    decimal.is_finite().then_some(decimal)
}

/// Capture time as `YYYY:MM:DD HH:MM:SS`, the way exiftool prints it.
/// Tries `DateTimeOriginal` first, then `DateTime`. Placeholder values such
/// as `0000:00:00 00:00:00` are treated as absent.
pub fn get_datetime_from_exif(exif: &Exif) -> Option<String> {
    [Tag::DateTimeOriginal, Tag::DateTime]
        .into_iter()
        .filter_map(|tag| exif.get_field(tag, In::PRIMARY))
        .find_map(|field| match field.value {
            Value::Ascii(ref vec) => vec
                .first()
                .and_then(|raw| std::str::from_utf8(raw).ok())
                .and_then(normalize_exif_datetime),
            _ => None,
        })
}

fn normalize_exif_datetime(raw: &str) -> Option<String> {
    let raw = raw.trim_end_matches('\0').trim();
    NaiveDateTime::parse_from_str(raw, EXIF_DATETIME_FORMAT)
        .ok()
        .map(|dt| dt.format(EXIF_DATETIME_FORMAT).to_string())
}
