pub mod exif;
pub mod mtime;

use std::io;
use std::path::Path;

use chrono::{NaiveDateTime, NaiveTime};
use log::debug;
use thiserror::Error;

use crate::error::SampleError;
use crate::media::TimestampSource;

/// Per-file failure of one resolver. Absorbed by the chain, never surfaced to callers.
#[derive(Error, Debug)]
pub enum MetadataError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
    #[error("unreadable EXIF: {0}")]
    Exif(#[from] ::exif::Error),
    #[error("no capture date tag")]
    NoDateTag,
}

/// Result of timestamp resolution: date + where it came from
#[derive(Debug, Clone, Copy)]
pub struct DateResult {
    pub date: NaiveDateTime,
    pub source: TimestampSource,
}

type Resolver = fn(&Path) -> Result<NaiveDateTime, MetadataError>;

struct Attempt {
    source: TimestampSource,
    resolve: Resolver,
}

/// Resolver attempts in priority order; the first success wins.
static RESOLVERS: &[Attempt] = &[
    Attempt {
        source: TimestampSource::Exif,
        resolve: exif::read_capture_time,
    },
    Attempt {
        source: TimestampSource::FileModified,
        resolve: mtime::modified_time,
    },
];

/// Resolve a capture timestamp: EXIF first, then filesystem modification time.
/// Returns `None` only when every attempt failed (e.g. the file vanished mid-run).
pub fn resolve_timestamp(path: &Path) -> Option<DateResult> {
    for attempt in RESOLVERS {
        match (attempt.resolve)(path) {
            Ok(date) => {
                return Some(DateResult {
                    date,
                    source: attempt.source,
                })
            }
            Err(e) => debug!("{:?} timestamp unavailable for {}: {}", attempt.source, path.display(), e),
        }
    }
    None
}

/// Parse a 24-hour `HH:MM` time of day.
pub fn parse_time_of_day(name: &'static str, value: &str) -> Result<NaiveTime, SampleError> {
    NaiveTime::parse_from_str(value.trim(), "%H:%M")
        .map_err(|_| SampleError::invalid(name, format!("time must be in HH:MM format, got {:?}", value)))
}
