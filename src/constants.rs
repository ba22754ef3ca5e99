// Thumbnail parameters
pub const DEFAULT_THUMB_WIDTH: u32 = 150;
pub const DEFAULT_THUMB_HEIGHT: u32 = 150;
pub const THUMBNAIL_JPEG_QUALITY: u8 = 85;
pub const THUMBNAIL_PROGRESS_EVERY: usize = 100;

// Default artifact locations (relative to the working directory)
pub const DEFAULT_THUMB_DIR: &str = "thumbnails";
pub const DEFAULT_METADATA_FILE: &str = "photos.json";
pub const DEFAULT_OUTPUT_GEOJSON: &str = "photos_with_thumbs.geojson";
pub const DEFAULT_ORIGINAL_PREFIX: &str = "photos";

// Discovery
pub const DEFAULT_EXTENSIONS: &[&str] = &["jpg", "jpeg"];

// Chunks per worker. More chunks than workers smooths out slow chunks.
pub const CHUNK_OVERSUBSCRIPTION: usize = 4;

// External extractor
pub const DEFAULT_EXIFTOOL: &str = "exiftool";
