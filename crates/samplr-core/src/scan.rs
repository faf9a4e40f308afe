use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};

use log::{info, warn};
use rayon::prelude::*;

use crate::date;
use crate::error::{Result, SampleError};
use crate::media::{TimestampSource, TimestampedImage};
use crate::ThrottledProgress;

/// Extensions accepted as images (compared case-insensitively)
pub const SUPPORTED_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "gif"];

/// Check if a path has a supported image extension
pub fn is_supported_image(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map_or(false, |ext| {
            SUPPORTED_EXTENSIONS
                .iter()
                .any(|s| s.eq_ignore_ascii_case(ext))
        })
}

/// List supported image files directly inside `source_dir` (non-recursive).
pub fn list_image_files(source_dir: &Path) -> Result<Vec<PathBuf>> {
    let entries = fs::read_dir(source_dir).map_err(|e| match e.kind() {
        io::ErrorKind::NotFound => SampleError::SourceNotFound {
            path: source_dir.to_path_buf(),
        },
        _ => SampleError::SourceUnreadable {
            path: source_dir.to_path_buf(),
            source: e,
        },
    })?;

    let mut files = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|e| SampleError::SourceUnreadable {
            path: source_dir.to_path_buf(),
            source: e,
        })?;
        let path = entry.path();
        if path.is_file() && is_supported_image(&path) {
            files.push(path);
        }
    }
    Ok(files)
}

/// Enumerate images in `source_dir` and resolve a timestamp for each, in parallel.
///
/// The result is sorted by timestamp, ties broken by filename, so it is identical
/// regardless of directory listing order or thread scheduling.
pub fn scan_images(source_dir: &Path, progress: &ThrottledProgress<'_>) -> Result<Vec<TimestampedImage>> {
    if !source_dir.exists() {
        return Err(SampleError::SourceNotFound {
            path: source_dir.to_path_buf(),
        });
    }
    if !source_dir.is_dir() {
        return Err(SampleError::SourceUnreadable {
            path: source_dir.to_path_buf(),
            source: io::Error::new(io::ErrorKind::Other, "not a directory"),
        });
    }

    let files = list_image_files(source_dir)?;
    let total = files.len() as u64;
    let counter = AtomicU64::new(0);

    let mut images: Vec<TimestampedImage> = files
        .into_par_iter()
        .filter_map(|path| {
            let resolved = date::resolve_timestamp(&path);
            let current = counter.fetch_add(1, Ordering::Relaxed);
            progress.report("scan", current, total, "Resolving timestamps");
            match resolved {
                Some(r) => Some(TimestampedImage::new(path, r.date, r.source)),
                None => {
                    warn!("Skipping {}: no timestamp could be resolved", path.display());
                    None
                }
            }
        })
        .collect();

    images.sort_by(|a, b| {
        a.timestamp()
            .cmp(&b.timestamp())
            .then_with(|| a.path().file_name().cmp(&b.path().file_name()))
    });

    let from_exif = images
        .iter()
        .filter(|m| m.source() == TimestampSource::Exif)
        .count();
    info!(
        "Found {} image(s) in {} ({} dated from EXIF)",
        images.len(),
        source_dir.display(),
        from_exif
    );

    Ok(images)
}
