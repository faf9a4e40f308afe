use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use ::exif::{In, Reader, Tag};
use chrono::{NaiveDate, NaiveDateTime, NaiveTime};

use super::MetadataError;

/// Tags tried in order: shutter time, digitisation time, last edit time.
const DATE_TAGS: [Tag; 3] = [Tag::DateTimeOriginal, Tag::DateTimeDigitized, Tag::DateTime];

/// Read the capture time from an image's embedded EXIF data.
/// EXIF datetimes have no timezone info - they are local time as-is.
pub fn read_capture_time(path: &Path) -> Result<NaiveDateTime, MetadataError> {
    let file = File::open(path)?;
    let exif = Reader::new().read_from_container(&mut BufReader::new(file))?;

    DATE_TAGS
        .iter()
        .filter_map(|tag| exif.get_field(*tag, In::PRIMARY))
        .find_map(|field| parse_exif_datetime(&field.display_value().to_string()))
        .ok_or(MetadataError::NoDateTag)
}

/// Lenient EXIF datetime parse: `YYYY:MM:DD HH:MM:SS[.fff]`, with `-`, `/`, `\`
/// or `.` accepted as date separators. Only a value with no time part at all
/// resolves to midnight.
fn parse_exif_datetime(s: &str) -> Option<NaiveDateTime> {
    let s = s.trim().trim_matches('"').trim();
    let (date_part, time_part) = s.split_once(' ').unwrap_or((s, ""));

    let date = NaiveDate::parse_from_str(&date_part.replace(['-', '/', '\\', '.'], ":"), "%Y:%m:%d").ok()?;
    let time_part = time_part.trim();
    if time_part.is_empty() {
        return date.and_hms_opt(0, 0, 0);
    }

    // %.f also accepts a value without sub-seconds
    let time = NaiveTime::parse_from_str(time_part, "%H:%M:%S%.f").ok()?;
    Some(date.and_time(time))
}
