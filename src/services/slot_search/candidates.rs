//! Hourly grid of candidate start times

use chrono::{DateTime, Duration, NaiveDate, NaiveTime, Utc};

use crate::services::civil_time::{add_days, CivilCalendar};

/// A grid start time for one technician-day
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GridCandidate {
    pub date: NaiveDate,
    pub starts_at: DateTime<Utc>,
    pub ends_at: DateTime<Utc>,
}

/// Consecutive local dates starting at `start`
pub fn horizon(start: NaiveDate, days: u32) -> impl Iterator<Item = NaiveDate> {
    (0..days).map(move |offset| add_days(start, offset))
}

/// One candidate per full hour from `first_hour` to `last_hour` inclusive
pub fn hourly_candidates(
    calendar: &dyn CivilCalendar,
    date: NaiveDate,
    first_hour: u32,
    last_hour: u32,
    duration: Duration,
) -> Vec<GridCandidate> {
    (first_hour..=last_hour)
        .filter_map(|hour| NaiveTime::from_hms_opt(hour, 0, 0))
        .map(|local| {
            let starts_at = calendar.to_instant(date, local);
            GridCandidate {
                date,
                starts_at,
                ends_at: starts_at + duration,
            }
        })
        .collect()
}
