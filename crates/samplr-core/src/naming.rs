use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::media::TimestampedImage;
use crate::scan::is_supported_image;

/// Base name used when none is given and the first image carries no "CO" marker.
pub const DEFAULT_BASE_NAME: &str = "image";

/// Minimum width of the zero-padded counter; larger counters widen it.
const COUNTER_WIDTH: usize = 4;

/// Derive the output base name from the first selected image's filename.
///
/// Camera captures are named `CO...`; sampled output is named `SM...`. Only the
/// first "CO" is replaced, e.g. `CO_0042.JPG` becomes `SM_0042`.
pub fn derive_base_name(first_image: &Path) -> String {
    let stem = first_image
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("");
    if stem.contains("CO") {
        stem.replacen("CO", "SM", 1)
    } else {
        DEFAULT_BASE_NAME.to_string()
    }
}

/// `{base}_{counter:04}.{ext}` with the extension lowercased.
pub fn output_file_name(base_name: &str, counter: usize, source: &Path) -> String {
    let ext = source
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_lowercase())
        .unwrap_or_else(|| "jpg".to_string());
    format!("{}_{:0width$}.{}", base_name, counter, ext, width = COUNTER_WIDTH)
}

/// One file to copy: where it comes from and the name it gets in the destination
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlannedCopy {
    pub source: PathBuf,
    pub file_name: String,
}

/// Sequentially named copies of the selected images, in numbering order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputPlan {
    pub destination: PathBuf,
    pub base_name: String,
    pub entries: Vec<PlannedCopy>,
}

impl OutputPlan {
    /// Assign names to `selection` starting at `first_counter`.
    pub fn new(
        selection: &[&TimestampedImage],
        base_name: &str,
        destination: &Path,
        first_counter: usize,
    ) -> Self {
        let entries = selection
            .iter()
            .zip(first_counter..)
            .map(|(m, counter)| PlannedCopy {
                source: m.path().to_path_buf(),
                file_name: output_file_name(base_name, counter, m.path()),
            })
            .collect();
        Self {
            destination: destination.to_path_buf(),
            base_name: base_name.to_string(),
            entries,
        }
    }

    pub fn dest_path(&self, entry: &PlannedCopy) -> PathBuf {
        self.destination.join(&entry.file_name)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Parse the counter out of `{base}_{digits}.{ext}`, if the name has that shape.
fn existing_counter(file_name: &str, base_name: &str) -> Option<usize> {
    let rest = file_name.strip_prefix(base_name)?.strip_prefix('_')?;
    let (digits, _ext) = rest.split_once('.')?;
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    digits.parse().ok()
}

/// First free counter after the highest `{base}_{NNNN}` image already in `destination`.
/// A missing destination starts at 1.
pub fn next_counter_after_existing(destination: &Path, base_name: &str) -> io::Result<usize> {
    let entries = match fs::read_dir(destination) {
        Ok(entries) => entries,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(1),
        Err(e) => return Err(e),
    };

    let mut max = 0;
    for entry in entries {
        let path = entry?.path();
        if !is_supported_image(&path) {
            continue;
        }
        if let Some(n) = path
            .file_name()
            .and_then(|n| n.to_str())
            .and_then(|n| existing_counter(n, base_name))
        {
            max = max.max(n);
        }
    }
    Ok(max + 1)
}
