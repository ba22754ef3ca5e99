//! Prepares a folder of photos for a web map: extracts GPS coordinates,
//! renders thumbnails and writes a GeoJSON feature collection.

pub mod chunking;
pub mod cli;
pub mod constants;
pub mod discovery;
pub mod error;
pub mod exif_parser;
pub mod exiftool;
pub mod extractor;
pub mod geojson;
pub mod image_processing;
pub mod logging;
pub mod pipeline;
pub mod pool;
pub mod processing;
pub mod records;
pub mod settings;
pub mod utils;
