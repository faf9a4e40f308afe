use std::fs;
use std::path::Path;

use chrono::{DateTime, Local, NaiveDateTime};

use super::MetadataError;

/// Filesystem last-modified time, converted to naive local time.
pub fn modified_time(path: &Path) -> Result<NaiveDateTime, MetadataError> {
    let modified = fs::metadata(path)?.modified()?;
    Ok(DateTime::<Local>::from(modified).naive_local())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use std::fs::File;
    use tempfile::tempdir;

    #[test]
    fn test_reads_back_local_mtime() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("a.png");
        File::create(&path).unwrap();

        let dt = NaiveDate::from_ymd_opt(2024, 1, 15)
            .unwrap()
            .and_hms_opt(14, 5, 9)
            .unwrap();
        let local = dt.and_local_timezone(Local).earliest().unwrap();
        filetime::set_file_mtime(&path, filetime::FileTime::from_unix_time(local.timestamp(), 0)).unwrap();

        assert_eq!(modified_time(&path).unwrap(), dt);
    }
}
