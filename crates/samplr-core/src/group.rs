use chrono::NaiveDate;

use crate::media::TimestampedImage;

/// All images sharing one calendar date, ordered by capture time.
#[derive(Debug, Clone, Copy)]
pub struct DayGroup<'a> {
    pub date: NaiveDate,
    pub images: &'a [TimestampedImage],
}

/// Partition a chronologically sorted sequence into per-day groups.
///
/// Dates are taken from the naive timestamp as-is (no timezone math). Groups come
/// out in the order their date is first seen, which for sorted input is ascending.
pub fn group_by_day(images: &[TimestampedImage]) -> Vec<DayGroup<'_>> {
    debug_assert!(images.windows(2).all(|w| w[0].timestamp() <= w[1].timestamp()));

    images
        .chunk_by(|a, b| a.date() == b.date())
        .map(|chunk| DayGroup {
            date: chunk[0].date(),
            images: chunk,
        })
        .collect()
}
