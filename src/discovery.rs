use anyhow::Result;
use ignore::WalkBuilder;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use crate::constants::DEFAULT_EXTENSIONS;
use crate::error::ConfigError;

/// Which files count as photos.
#[derive(Debug, Clone)]
pub struct DiscoveryOptions {
    /// Lowercase extensions without the leading dot
    pub extensions: Vec<String>,
    /// Descend into dot-directories and pick up dot-files
    pub include_hidden: bool,
}

impl Default for DiscoveryOptions {
    fn default() -> Self {
        Self {
            extensions: DEFAULT_EXTENSIONS.iter().map(|e| e.to_string()).collect(),
            include_hidden: false,
        }
    }
}

impl DiscoveryOptions {
    fn matches(&self, path: &Path) -> bool {
        path.extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| {
                let ext = ext.to_lowercase();
                self.extensions.iter().any(|allowed| *allowed == ext)
            })
            .unwrap_or(false)
    }
}

/// Recursively collects photo files under `root`.
///
/// Paths are absolute and sorted, so chunking is reproducible between runs.
pub fn discover_images(root: &Path, options: &DiscoveryOptions) -> Result<Vec<PathBuf>> {
    if !root.exists() {
        return Err(ConfigError::RootNotFound(root.to_path_buf()).into());
    }
    if !root.is_dir() {
        return Err(ConfigError::NotADirectory(root.to_path_buf()).into());
    }
    let root = root.canonicalize()?;
    info!("Scanning photos directory: {}", root.display());

    let walker = WalkBuilder::new(&root)
        .standard_filters(false)
        .hidden(!options.include_hidden)
        .follow_links(true)
        .build();

    let mut files: Vec<PathBuf> = walker
        .filter_map(|entry| match entry {
            Ok(entry) => Some(entry),
            Err(e) => {
                debug!("Skipping unreadable entry: {}", e);
                None
            }
        })
        .filter(|e| e.file_type().is_some_and(|ft| ft.is_file()))
        .filter(|e| options.matches(e.path()))
        .map(|e| e.into_path())
        .collect();

    files.sort();
    info!("Found {} photos", files.len());
    Ok(files)
}
