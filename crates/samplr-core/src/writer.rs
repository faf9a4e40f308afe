use std::collections::HashMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use log::{debug, info};
use serde::{Deserialize, Serialize};

use crate::error::{Result, SampleError};
use crate::media::TimestampedImage;
use crate::naming::OutputPlan;
use crate::ThrottledProgress;

/// What to do about files already present in the destination.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum ExistingPolicy {
    /// Number from 1 and overwrite any file with the same name, without warning
    #[default]
    Overwrite,
    /// Number after the highest counter already in the destination for this base name
    Continue,
    /// Fail before copying anything if a planned name is already taken
    Refuse,
}

/// Create the destination directory (and parents) if missing, and check it accepts new files.
pub fn prepare_destination(destination: &Path) -> Result<()> {
    let unwritable = |source| SampleError::DestinationUnwritable {
        path: destination.to_path_buf(),
        source,
    };
    fs::create_dir_all(destination).map_err(unwritable)?;
    // An existing read-only directory passes create_dir_all
    tempfile::NamedTempFile::new_in(destination).map_err(unwritable)?;
    Ok(())
}

/// Fail with `DestinationUnwritable` if a planned file is one of the source images.
///
/// Copying a file onto itself truncates it, which happens when the destination
/// is the source directory and a planned name matches an existing image.
pub fn ensure_sources_untouched(plan: &OutputPlan, sources: &[TimestampedImage]) -> Result<()> {
    let existing: Vec<(PathBuf, PathBuf)> = plan
        .entries
        .iter()
        .map(|e| plan.dest_path(e))
        .filter_map(|dest| fs::canonicalize(&dest).ok().map(|real| (dest, real)))
        .collect();
    if existing.is_empty() {
        return Ok(());
    }

    let originals: HashMap<PathBuf, &Path> = sources
        .iter()
        .filter_map(|m| fs::canonicalize(m.path()).ok().map(|real| (real, m.path())))
        .collect();
    match existing
        .into_iter()
        .find_map(|(dest, real)| originals.get(&real).map(|src| (dest, *src)))
    {
        Some((path, src)) => Err(SampleError::DestinationUnwritable {
            path,
            source: io::Error::new(
                io::ErrorKind::AlreadyExists,
                format!("would overwrite source image {}", src.display()),
            ),
        }),
        None => Ok(()),
    }
}

/// Fail with `DestinationExists` on the first planned file that is already present.
pub fn ensure_no_collisions(plan: &OutputPlan) -> Result<()> {
    match plan
        .entries
        .iter()
        .map(|e| plan.dest_path(e))
        .find(|p| p.exists())
    {
        Some(path) => Err(SampleError::DestinationExists { path }),
        None => Ok(()),
    }
}

/// Copy every planned file, in plan order. Sources are never modified.
///
/// Copies are byte-for-byte and carry the source's modification time. The first
/// failure aborts the run, reporting how many files were already copied.
pub fn write_output(plan: &OutputPlan, progress: &ThrottledProgress<'_>) -> Result<usize> {
    let total = plan.len() as u64;

    for (copied, entry) in plan.entries.iter().enumerate() {
        let dest = plan.dest_path(entry);
        let copy_error = |source| SampleError::Copy {
            from: entry.source.clone(),
            to: dest.clone(),
            copied,
            source,
        };

        fs::copy(&entry.source, &dest).map_err(copy_error)?;

        if let Ok(meta) = fs::metadata(&entry.source) {
            let mtime = filetime::FileTime::from_last_modification_time(&meta);
            filetime::set_file_mtime(&dest, mtime).ok();
        }

        debug!("{} -> {}", entry.source.display(), dest.display());
        progress.report("copy", copied as u64, total, "Copying images");
    }

    info!("Copied {} file(s) to {}", plan.len(), plan.destination.display());
    Ok(plan.len())
}
