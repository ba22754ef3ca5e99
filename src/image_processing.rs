use anyhow::{Context, Result};
use image::codecs::jpeg::JpegEncoder;
use image::imageops::FilterType;
use image::{DynamicImage, GenericImageView, ImageFormat};
use std::panic::{self, AssertUnwindSafe};
use std::path::{Path, PathBuf};

use crate::constants::THUMBNAIL_JPEG_QUALITY;
use crate::exif_parser::apply_exif_orientation;
use crate::utils::write_atomic;

/// One thumbnail to produce.
#[derive(Debug, Clone)]
pub struct ThumbnailTask {
    pub source: PathBuf,
    pub dest_dir: PathBuf,
    pub width: u32,
    pub height: u32,
}

impl ThumbnailTask {
    /// Thumbnails keep the source file name.
    pub fn destination(&self) -> Option<PathBuf> {
        self.source.file_name().map(|name| self.dest_dir.join(name))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ThumbnailOutcome {
    Created,
    /// The destination already existed; nothing was decoded
    Skipped,
    Failed(String),
}

impl ThumbnailOutcome {
    pub fn is_success(&self) -> bool {
        !matches!(self, ThumbnailOutcome::Failed(_))
    }
}

/// Produces the thumbnail for `task`. Never panics and never returns an
/// error: every problem is reported as `ThumbnailOutcome::Failed`.
pub fn create_thumbnail(task: &ThumbnailTask) -> ThumbnailOutcome {
    let Some(dest) = task.destination() else {
        return ThumbnailOutcome::Failed(format!("No file name in {}", task.source.display()));
    };
    if dest.exists() {
        return ThumbnailOutcome::Skipped;
    }

    // Some decoders panic on truncated input instead of returning an error.
    match panic::catch_unwind(AssertUnwindSafe(|| render_thumbnail(task, &dest))) {
        Ok(Ok(())) => ThumbnailOutcome::Created,
        Ok(Err(e)) => ThumbnailOutcome::Failed(format!("{:#}", e)),
        Err(_) => ThumbnailOutcome::Failed(format!("Decoder panicked on {}", task.source.display())),
    }
}

fn render_thumbnail(task: &ThumbnailTask, dest: &Path) -> Result<()> {
    let img = image::open(&task.source)
        .with_context(|| format!("Failed to open image: {}", task.source.display()))?;
    let img = apply_exif_orientation(&task.source, img);
    let scaled = fit_within(img, task.width, task.height);

    let format = ImageFormat::from_path(dest).unwrap_or(ImageFormat::Jpeg);
    write_atomic(dest, |writer| {
        if format == ImageFormat::Jpeg {
            let encoder = JpegEncoder::new_with_quality(writer, THUMBNAIL_JPEG_QUALITY);
            DynamicImage::ImageRgb8(scaled.to_rgb8()).write_with_encoder(encoder)?;
        } else {
            scaled.write_to(writer, format)?;
        }
        Ok(())
    })
    .with_context(|| format!("Failed to write thumbnail: {}", dest.display()))
}

/// Shrinks the image to fit inside `width`×`height`, keeping the aspect
/// ratio. Images that already fit are returned as they are.
pub fn fit_within(img: DynamicImage, width: u32, height: u32) -> DynamicImage {
    let (w, h) = img.dimensions();
    if w <= width && h <= height {
        return img;
    }
    img.resize(width, height, FilterType::Lanczos3)
}
