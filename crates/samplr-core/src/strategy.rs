//! Sampling strategies.
//!
//! Exactly one strategy is active per run. `EveryNth` strides across the whole
//! chronological sequence; `ClosestToTime` and `NthInRange` work per calendar day.

use std::fmt;

use chrono::NaiveTime;
use serde::{Deserialize, Serialize};

use crate::date::parse_time_of_day;
use crate::error::{Result, SampleError};
use crate::group::group_by_day;
use crate::media::TimestampedImage;

/// Picks a subset of a chronologically sorted image sequence.
///
/// The returned images are a duplicate-free subsequence of the input, in the
/// order they should be numbered.
pub trait Select {
    fn select<'a>(&self, images: &'a [TimestampedImage]) -> Vec<&'a TimestampedImage>;
}

fn stride(name: &'static str, n: i64) -> Result<usize> {
    if n < 1 {
        return Err(SampleError::invalid(name, format!("must be at least 1, got {}", n)));
    }
    usize::try_from(n).map_err(|_| SampleError::invalid(name, format!("too large: {}", n)))
}

/// Every `n`th image of the flat sequence: indices `0, n, 2n, ...`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EveryNth {
    n: usize,
}

impl EveryNth {
    pub fn new(n: i64) -> Result<Self> {
        Ok(Self {
            n: stride("every_nth", n)?,
        })
    }
}

impl Select for EveryNth {
    fn select<'a>(&self, images: &'a [TimestampedImage]) -> Vec<&'a TimestampedImage> {
        images.iter().step_by(self.n).collect()
    }
}

/// The single image per day whose time of day is nearest to `target`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClosestToTime {
    target: NaiveTime,
}

impl ClosestToTime {
    pub fn new(target: NaiveTime) -> Self {
        Self { target }
    }

    /// Absolute time-of-day distance in milliseconds, ignoring the calendar date.
    pub fn distance(&self, image: &TimestampedImage) -> i64 {
        image
            .time_of_day()
            .signed_duration_since(self.target)
            .num_milliseconds()
            .abs()
    }
}

impl Select for ClosestToTime {
    fn select<'a>(&self, images: &'a [TimestampedImage]) -> Vec<&'a TimestampedImage> {
        // min_by_key keeps the first minimum, i.e. the earliest image on ties
        group_by_day(images)
            .into_iter()
            .filter_map(|day| day.images.iter().min_by_key(|m| self.distance(m)))
            .collect()
    }
}

/// Per day, every `n`th image among those taken within `[start, end]` inclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NthInRange {
    n: usize,
    start: NaiveTime,
    end: NaiveTime,
}

impl NthInRange {
    pub fn new(n: i64, start: NaiveTime, end: NaiveTime) -> Result<Self> {
        let n = stride("time_range.n", n)?;
        if start > end {
            return Err(SampleError::invalid(
                "time_range",
                format!("start {} is after end {}", start.format("%H:%M"), end.format("%H:%M")),
            ));
        }
        Ok(Self { n, start, end })
    }

    pub fn contains(&self, image: &TimestampedImage) -> bool {
        (self.start..=self.end).contains(&image.time_of_day())
    }
}

impl Select for NthInRange {
    fn select<'a>(&self, images: &'a [TimestampedImage]) -> Vec<&'a TimestampedImage> {
        group_by_day(images)
            .into_iter()
            .flat_map(|day| {
                day.images
                    .iter()
                    .filter(|m| self.contains(m))
                    .step_by(self.n)
            })
            .collect()
    }
}

/// The validated strategy for one run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Strategy {
    EveryNth(EveryNth),
    ClosestToTime(ClosestToTime),
    NthInRange(NthInRange),
}

impl Select for Strategy {
    fn select<'a>(&self, images: &'a [TimestampedImage]) -> Vec<&'a TimestampedImage> {
        match self {
            Strategy::EveryNth(s) => s.select(images),
            Strategy::ClosestToTime(s) => s.select(images),
            Strategy::NthInRange(s) => s.select(images),
        }
    }
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Strategy::EveryNth(s) => write!(f, "1 in every {} images", s.n),
            Strategy::ClosestToTime(s) => write!(f, "closest to {} each day", s.target.format("%H:%M")),
            Strategy::NthInRange(s) => write!(
                f,
                "1 in every {} images between {} and {} each day",
                s.n,
                s.start.format("%H:%M"),
                s.end.format("%H:%M")
            ),
        }
    }
}

/// Unvalidated strategy selection, as received from a front-end.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum StrategySpec {
    EveryNth { n: i64 },
    ClosestTo { time: String },
    TimeRange { n: i64, start: String, end: String },
}

impl StrategySpec {
    /// Validate parameters. Performs no I/O.
    pub fn build(&self) -> Result<Strategy> {
        match self {
            StrategySpec::EveryNth { n } => Ok(Strategy::EveryNth(EveryNth::new(*n)?)),
            StrategySpec::ClosestTo { time } => Ok(Strategy::ClosestToTime(ClosestToTime::new(
                parse_time_of_day("closest_to", time)?,
            ))),
            StrategySpec::TimeRange { n, start, end } => {
                let start = parse_time_of_day("time_range.start", start)?;
                let end = parse_time_of_day("time_range.end", end)?;
                Ok(Strategy::NthInRange(NthInRange::new(*n, start, end)?))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::media::TimestampSource;
    use chrono::NaiveDate;
    use std::path::PathBuf;

    fn image(day: u32, h: u32, m: u32) -> TimestampedImage {
        let ts = NaiveDate::from_ymd_opt(2024, 1, day)
            .unwrap()
            .and_hms_opt(h, m, 0)
            .unwrap();
        let name = format!("CO_{:02}{:02}{:02}.jpg", day, h, m);
        TimestampedImage::new(PathBuf::from(name), ts, TimestampSource::FileModified)
    }

    fn hm(h: u32, m: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(h, m, 0).unwrap()
    }

    fn times(selected: &[&TimestampedImage]) -> Vec<(u32, NaiveTime)> {
        use chrono::Datelike;
        selected.iter().map(|m| (m.date().day(), m.time_of_day())).collect()
    }

    #[test]
    fn test_every_nth_count_and_indices() {
        for len in 0..25usize {
            let images: Vec<_> = (0..len).map(|i| image(1, (i / 60) as u32, (i % 60) as u32)).collect();
            for n in 1..8usize {
                let selected = EveryNth::new(n as i64).unwrap().select(&images);
                assert_eq!(selected.len(), (len + n - 1) / n);
                for (k, m) in selected.iter().enumerate() {
                    assert_eq!(*m, &images[k * n]);
                }
            }
        }
    }

    #[test]
    fn test_every_nth_strides_across_days() {
        let images: Vec<_> = (0..10).map(|i| image(1 + i / 4, 8 + i, 0)).collect();
        let selected = EveryNth::new(3).unwrap().select(&images);
        let picked: Vec<_> = selected.iter().map(|m| m.file_name()).collect();
        let expected: Vec<_> = [0, 3, 6, 9].iter().map(|&i| images[i].file_name()).collect();
        assert_eq!(picked, expected);
    }

    #[test]
    fn test_every_nth_rejects_zero_and_negative() {
        assert!(matches!(EveryNth::new(0), Err(SampleError::InvalidParameter { .. })));
        assert!(matches!(EveryNth::new(-3), Err(SampleError::InvalidParameter { .. })));
    }

    #[test]
    fn test_closest_to_time_per_day() {
        let images = vec![
            image(1, 8, 0),
            image(1, 12, 0),
            image(1, 16, 0),
            image(2, 9, 0),
            image(2, 13, 5),
        ];
        let selected = ClosestToTime::new(hm(12, 30)).select(&images);
        assert_eq!(times(&selected), vec![(1, hm(12, 0)), (2, hm(13, 5))]);
    }

    #[test]
    fn test_closest_to_time_tie_prefers_earliest() {
        let images = vec![image(1, 11, 0), image(1, 13, 0)];
        let selected = ClosestToTime::new(hm(12, 0)).select(&images);
        assert_eq!(times(&selected), vec![(1, hm(11, 0))]);
    }

    #[test]
    fn test_closest_is_minimal_within_day() {
        let mut images: Vec<_> = (0..48u32).map(|i| image(1 + i / 16, i * 7 % 24, i * 13 % 60)).collect();
        images.sort_by_key(|m| m.timestamp());
        let strategy = ClosestToTime::new(hm(17, 20));
        let selected = strategy.select(&images);

        assert_eq!(selected.len(), 3);
        for pick in selected {
            let best = images
                .iter()
                .filter(|m| m.date() == pick.date())
                .map(|m| strategy.distance(m))
                .min()
                .unwrap();
            assert_eq!(strategy.distance(pick), best);
        }
    }

    #[test]
    fn test_nth_in_range_filters_then_strides() {
        let images = vec![
            image(1, 8, 0),
            image(1, 10, 0),
            image(1, 12, 0),
            image(1, 14, 0),
            image(1, 16, 0),
        ];
        let strategy = NthInRange::new(2, hm(9, 0), hm(15, 0)).unwrap();
        let selected = strategy.select(&images);
        assert_eq!(times(&selected), vec![(1, hm(10, 0)), (1, hm(14, 0))]);
    }

    #[test]
    fn test_nth_in_range_inclusive_bounds_and_empty_days() {
        let images = vec![
            image(1, 9, 0),
            image(1, 15, 0),
            image(2, 7, 0),
            image(3, 9, 0),
        ];
        let strategy = NthInRange::new(1, hm(9, 0), hm(15, 0)).unwrap();
        let selected = strategy.select(&images);
        assert_eq!(times(&selected), vec![(1, hm(9, 0)), (1, hm(15, 0)), (3, hm(9, 0))]);
        assert!(selected.iter().all(|m| strategy.contains(m)));
    }

    #[test]
    fn test_nth_in_range_stride_restarts_each_day() {
        let images = vec![
            image(1, 10, 0),
            image(1, 11, 0),
            image(1, 12, 0),
            image(2, 10, 0),
            image(2, 11, 0),
        ];
        let selected = NthInRange::new(2, hm(0, 0), hm(23, 59)).unwrap().select(&images);
        assert_eq!(
            times(&selected),
            vec![(1, hm(10, 0)), (1, hm(12, 0)), (2, hm(10, 0))]
        );
    }

    #[test]
    fn test_nth_in_range_validation() {
        assert!(NthInRange::new(0, hm(9, 0), hm(15, 0)).is_err());
        assert!(NthInRange::new(1, hm(15, 0), hm(9, 0)).is_err());
        assert!(NthInRange::new(1, hm(9, 0), hm(9, 0)).is_ok());
    }

    #[test]
    fn test_build_validates_parameters() {
        let s = StrategySpec::TimeRange {
            n: 2,
            start: "09:00".into(),
            end: "15:00".into(),
        }
        .build()
        .unwrap();
        assert_eq!(s.to_string(), "1 in every 2 images between 09:00 and 15:00 each day");

        let err = StrategySpec::ClosestTo { time: "12h30".into() }.build().unwrap_err();
        assert!(err.to_string().contains("closest_to"));

        let spec: StrategySpec = serde_json::from_str(r#"{"mode":"every_nth","n":5}"#).unwrap();
        assert_eq!(spec, StrategySpec::EveryNth { n: 5 });
    }
}
