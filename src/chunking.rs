use std::path::PathBuf;

use crate::constants::CHUNK_OVERSUBSCRIPTION;

/// A contiguous run of input files processed by one extractor call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Chunk {
    pub id: usize,
    pub files: Vec<PathBuf>,
}

/// Target number of chunks for a pool of `workers` threads.
pub fn chunk_count(workers: usize) -> usize {
    workers.max(1) * CHUNK_OVERSUBSCRIPTION
}

/// Splits `items` into at most `parts` contiguous slices whose lengths
/// differ by at most one. Longer slices come first.
pub fn split_even<T: Clone>(items: &[T], parts: usize) -> Vec<Vec<T>> {
    if items.is_empty() {
        return Vec::new();
    }
    let parts = parts.clamp(1, items.len());
    let base = items.len() / parts;
    let extra = items.len() % parts;

    let mut slices = Vec::with_capacity(parts);
    let mut start = 0;
    for i in 0..parts {
        let len = base + usize::from(i < extra);
        slices.push(items[start..start + len].to_vec());
        start += len;
    }
    slices
}

/// Partitions the discovered files into numbered chunks.
pub fn partition(files: &[PathBuf], parts: usize) -> Vec<Chunk> {
    split_even(files, parts)
        .into_iter()
        .enumerate()
        .map(|(id, files)| Chunk { id, files })
        .collect()
}
