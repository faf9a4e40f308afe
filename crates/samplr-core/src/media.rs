use std::path::{Path, PathBuf};

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};

/// Where an image's timestamp came from, best first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TimestampSource {
    /// Embedded capture metadata (EXIF)
    Exif,
    /// Filesystem last-modified time
    FileModified,
}

/// An eligible image with its resolved capture time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimestampedImage {
    path: PathBuf,
    timestamp: NaiveDateTime,
    source: TimestampSource,
}

impl TimestampedImage {
    pub fn new(path: PathBuf, timestamp: NaiveDateTime, source: TimestampSource) -> Self {
        Self {
            path,
            timestamp,
            source,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Zone-naive capture time, treated as local time.
    pub fn timestamp(&self) -> NaiveDateTime {
        self.timestamp
    }

    pub fn source(&self) -> TimestampSource {
        self.source
    }

    pub fn date(&self) -> NaiveDate {
        self.timestamp.date()
    }

    pub fn time_of_day(&self) -> NaiveTime {
        self.timestamp.time()
    }

    /// Just the filename, lossily decoded.
    pub fn file_name(&self) -> String {
        self.path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default()
    }
}
