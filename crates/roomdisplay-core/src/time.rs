//! Time helpers for the room display.
//!
//! This module provides [`TimeWindow`], a half-open UTC interval used for the
//! reference day, and [`local_to_utc`] for pinning a wall-clock time in a
//! given timezone to an absolute instant.

use chrono::{DateTime, Duration, NaiveDate, NaiveDateTime, NaiveTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};

/// Converts a wall-clock time in `tz` to a UTC instant.
///
/// Ambiguous times (the repeated hour when clocks go back) resolve to the
/// earlier instant. Times skipped by a forward transition resolve to the first
/// valid wall-clock time after the gap.
pub fn local_to_utc<Tz: TimeZone>(naive: &NaiveDateTime, tz: &Tz) -> DateTime<Utc> {
    if let Some(dt) = tz.from_local_datetime(naive).earliest() {
        return dt.with_timezone(&Utc);
    }

    (1..=16)
        .find_map(|step| {
            tz.from_local_datetime(&(*naive + Duration::minutes(15 * step)))
                .earliest()
        })
        .map(|dt| dt.with_timezone(&Utc))
        .unwrap_or_else(|| naive.and_utc())
}

/// Local midnight at the start of `date`, as a UTC instant.
pub fn local_midnight<Tz: TimeZone>(date: NaiveDate, tz: &Tz) -> DateTime<Utc> {
    local_to_utc(&date.and_time(NaiveTime::MIN), tz)
}

/// A half-open interval `[start, end)` in UTC.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeWindow {
    /// Start of the window (inclusive).
    pub start: DateTime<Utc>,
    /// End of the window (exclusive).
    pub end: DateTime<Utc>,
}

impl TimeWindow {
    /// Creates a new time window.
    ///
    /// # Panics
    ///
    /// Panics if `start` is after `end`.
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        assert!(start <= end, "TimeWindow start must be <= end");
        Self { start, end }
    }

    /// The local calendar day in `tz` that contains `now`.
    ///
    /// Runs from local midnight to the following local midnight, so the
    /// window is 23 or 25 hours long on DST transition days.
    pub fn day_of<Tz: TimeZone>(now: DateTime<Utc>, tz: &Tz) -> Self {
        let today = now.with_timezone(tz).date_naive();
        Self::for_date(today, tz)
    }

    /// The local calendar day `date` in `tz`.
    pub fn for_date<Tz: TimeZone>(date: NaiveDate, tz: &Tz) -> Self {
        let start = local_midnight(date, tz);
        let end = match date.succ_opt() {
            Some(tomorrow) => local_midnight(tomorrow, tz),
            None => start,
        };
        Self { start, end }
    }

    /// Returns the duration of this time window.
    pub fn duration(&self) -> Duration {
        self.end - self.start
    }

    /// Checks if a datetime falls within this window (`[start, end)`).
    pub fn contains(&self, dt: DateTime<Utc>) -> bool {
        self.start <= dt && dt < self.end
    }

    /// Checks if the interval `[start, end)` overlaps this window.
    ///
    /// True when it starts before the window ends AND ends after the window starts.
    pub fn overlaps(&self, start: DateTime<Utc>, end: DateTime<Utc>) -> bool {
        start < self.end && end > self.start
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::FixedOffset;
    use chrono_tz::{America::New_York, Europe::Paris};

    fn utc(y: i32, m: u32, d: u32, h: u32, min: u32, s: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, h, min, s).unwrap()
    }

    fn naive(y: i32, m: u32, d: u32, h: u32, min: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d)
            .unwrap()
            .and_hms_opt(h, min, 0)
            .unwrap()
    }

    mod local_conversion {
        use super::*;

        #[test]
        fn plain_offset() {
            let tz = FixedOffset::east_opt(2 * 3600).unwrap();
            assert_eq!(
                local_to_utc(&naive(2025, 3, 1, 9, 0), &tz),
                utc(2025, 3, 1, 7, 0, 0)
            );
        }

        #[test]
        fn ambiguous_time_takes_earliest() {
            // 02:30 happens twice in Paris on 2025-10-26.
            let dt = local_to_utc(&naive(2025, 10, 26, 2, 30), &Paris);
            assert_eq!(dt, utc(2025, 10, 26, 0, 30, 0));
        }

        #[test]
        fn skipped_time_moves_past_gap() {
            // 02:30 does not exist in Paris on 2025-03-30.
            let dt = local_to_utc(&naive(2025, 3, 30, 2, 30), &Paris);
            assert_eq!(dt, utc(2025, 3, 30, 1, 0, 0));
        }
    }

    mod time_window {
        use super::*;

        #[test]
        fn creation() {
            let window = TimeWindow::new(utc(2025, 3, 1, 9, 0, 0), utc(2025, 3, 1, 17, 0, 0));
            assert_eq!(window.duration(), Duration::hours(8));
        }

        #[test]
        #[should_panic(expected = "start must be <= end")]
        fn invalid_window() {
            TimeWindow::new(utc(2025, 3, 1, 17, 0, 0), utc(2025, 3, 1, 9, 0, 0));
        }

        #[test]
        fn day_of_utc() {
            let window = TimeWindow::day_of(utc(2025, 3, 1, 15, 42, 0), &Utc);
            assert_eq!(window.start, utc(2025, 3, 1, 0, 0, 0));
            assert_eq!(window.end, utc(2025, 3, 2, 0, 0, 0));
        }

        #[test]
        fn day_of_uses_local_date() {
            // 23:30 UTC is already the next day in Paris.
            let window = TimeWindow::day_of(utc(2025, 3, 1, 23, 30, 0), &Paris);
            assert_eq!(window.start, utc(2025, 3, 1, 23, 0, 0));
            assert_eq!(window.end, utc(2025, 3, 2, 23, 0, 0));
        }

        #[test]
        fn short_day_on_spring_forward() {
            let date = NaiveDate::from_ymd_opt(2025, 3, 9).unwrap();
            let window = TimeWindow::for_date(date, &New_York);
            assert_eq!(window.duration(), Duration::hours(23));
            assert_eq!(window.start, utc(2025, 3, 9, 5, 0, 0));
        }

        #[test]
        fn long_day_on_fall_back() {
            let date = NaiveDate::from_ymd_opt(2025, 10, 26).unwrap();
            let window = TimeWindow::for_date(date, &Paris);
            assert_eq!(window.duration(), Duration::hours(25));
        }

        #[test]
        fn contains_is_half_open() {
            let window = TimeWindow::new(utc(2025, 3, 1, 9, 0, 0), utc(2025, 3, 1, 17, 0, 0));
            assert!(window.contains(utc(2025, 3, 1, 9, 0, 0)));
            assert!(window.contains(utc(2025, 3, 1, 16, 59, 59)));
            assert!(!window.contains(utc(2025, 3, 1, 17, 0, 0)));
            assert!(!window.contains(utc(2025, 3, 1, 8, 59, 59)));
        }

        #[test]
        fn overlaps() {
            let window = TimeWindow::new(utc(2025, 3, 1, 0, 0, 0), utc(2025, 3, 2, 0, 0, 0));

            // Inside
            assert!(window.overlaps(utc(2025, 3, 1, 10, 0, 0), utc(2025, 3, 1, 11, 0, 0)));
            // Starts the day before
            assert!(window.overlaps(utc(2025, 2, 28, 22, 0, 0), utc(2025, 3, 1, 1, 0, 0)));
            // Spans the whole day
            assert!(window.overlaps(utc(2025, 2, 28, 0, 0, 0), utc(2025, 3, 3, 0, 0, 0)));
            // Ends exactly at midnight
            assert!(!window.overlaps(utc(2025, 2, 28, 23, 0, 0), utc(2025, 3, 1, 0, 0, 0)));
            // Starts exactly at the next midnight
            assert!(!window.overlaps(utc(2025, 3, 2, 0, 0, 0), utc(2025, 3, 2, 1, 0, 0)));
        }
    }
}
