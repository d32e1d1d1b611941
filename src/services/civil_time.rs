//! Civil-time strategy: mapping business wall-clock times to instants
//!
//! Business hours are defined in a named timezone. The zoned calendar
//! resolves them through the timezone database and follows daylight saving;
//! the fixed calendar keeps the legacy single-offset approximation.

use std::sync::Arc;

use chrono::{DateTime, Days, Duration, FixedOffset, NaiveDate, NaiveDateTime, NaiveTime, Offset, TimeZone, Utc};
use chrono_tz::Tz;
use tracing::warn;

use crate::config::{OffsetMode, SchedulingPolicy};
use crate::defaults::DEFAULT_FIXED_UTC_OFFSET_HOURS;

/// Day-boundary and timezone policy injected into the engine
pub trait CivilCalendar: Send + Sync {
    /// Human-readable name for logging
    fn name(&self) -> String;

    /// Absolute instant of a local wall-clock time
    fn to_instant(&self, date: NaiveDate, time: NaiveTime) -> DateTime<Utc>;

    /// Local wall-clock representation of an instant
    fn local(&self, instant: DateTime<Utc>) -> NaiveDateTime;

    fn local_date(&self, instant: DateTime<Utc>) -> NaiveDate {
        self.local(instant).date()
    }

    fn time_label(&self, instant: DateTime<Utc>) -> String {
        self.local(instant).format("%H:%M").to_string()
    }

    /// Half-open `[start, end)` instants covering `days` local days from `date`
    fn range_bounds(&self, date: NaiveDate, days: u32) -> (DateTime<Utc>, DateTime<Utc>) {
        let end_date = add_days(date, days);
        (
            self.to_instant(date, NaiveTime::MIN),
            self.to_instant(end_date, NaiveTime::MIN),
        )
    }
}

pub fn add_days(date: NaiveDate, days: u32) -> NaiveDate {
    date.checked_add_days(Days::new(days as u64)).unwrap_or(NaiveDate::MAX)
}

/// DST-aware calendar backed by the timezone database
pub struct ZonedCalendar {
    tz: Tz,
}

impl ZonedCalendar {
    pub fn new(tz: Tz) -> Self {
        Self { tz }
    }
}

impl CivilCalendar for ZonedCalendar {
    fn name(&self) -> String {
        self.tz.name().to_string()
    }

    fn to_instant(&self, date: NaiveDate, time: NaiveTime) -> DateTime<Utc> {
        let naive = date.and_time(time);
        // Ambiguous times (autumn fall-back) take the earlier instant; times
        // inside the spring-forward gap move to the first valid hour.
        self.tz
            .from_local_datetime(&naive)
            .earliest()
            .or_else(|| self.tz.from_local_datetime(&(naive + Duration::hours(1))).earliest())
            .map(|t| t.with_timezone(&Utc))
            .unwrap_or_else(|| {
                warn!("Cannot resolve {} in {}, treating it as UTC", naive, self.tz.name());
                naive.and_utc()
            })
    }

    fn local(&self, instant: DateTime<Utc>) -> NaiveDateTime {
        instant.with_timezone(&self.tz).naive_local()
    }
}

/// Single UTC offset all year, ignoring daylight saving
pub struct FixedOffsetCalendar {
    offset: FixedOffset,
}

impl FixedOffsetCalendar {
    pub fn from_hours(utc_offset_hours: i32) -> Self {
        let offset = FixedOffset::east_opt(utc_offset_hours * 3600).unwrap_or_else(|| {
            warn!("UTC offset {}h out of range, using UTC", utc_offset_hours);
            Utc.fix()
        });
        Self { offset }
    }
}

impl CivilCalendar for FixedOffsetCalendar {
    fn name(&self) -> String {
        format!("UTC{}", self.offset)
    }

    fn to_instant(&self, date: NaiveDate, time: NaiveTime) -> DateTime<Utc> {
        let naive = date.and_time(time);
        (naive - self.offset).and_utc()
    }

    fn local(&self, instant: DateTime<Utc>) -> NaiveDateTime {
        instant.with_timezone(&self.offset).naive_local()
    }
}

/// Build the calendar described by the policy.
///
/// An unknown timezone name degrades to the legacy fixed offset instead of
/// failing the scheduler.
pub fn calendar_for(policy: &SchedulingPolicy) -> Arc<dyn CivilCalendar> {
    match policy.offset_mode {
        OffsetMode::Zoned => match policy.timezone.parse::<Tz>() {
            Ok(tz) => Arc::new(ZonedCalendar::new(tz)),
            Err(e) => {
                warn!(
                    "Unknown timezone '{}' ({}), falling back to fixed UTC{:+} offset",
                    policy.timezone, e, DEFAULT_FIXED_UTC_OFFSET_HOURS
                );
                Arc::new(FixedOffsetCalendar::from_hours(DEFAULT_FIXED_UTC_OFFSET_HOURS))
            }
        },
        OffsetMode::Fixed { utc_offset_hours } => Arc::new(FixedOffsetCalendar::from_hours(utc_offset_hours)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn time(h: u32, m: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(h, m, 0).unwrap()
    }

    fn utc(y: i32, m: u32, d: u32, h: u32, min: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, h, min, 0).unwrap()
    }

    fn montreal() -> ZonedCalendar {
        ZonedCalendar::new(chrono_tz::America::Montreal)
    }

    #[test]
    fn test_zoned_calendar_follows_daylight_saving() {
        let calendar = montreal();
        // EST in winter, EDT in summer
        assert_eq!(calendar.to_instant(date(2026, 1, 15), time(8, 0)), utc(2026, 1, 15, 13, 0));
        assert_eq!(calendar.to_instant(date(2026, 7, 15), time(8, 0)), utc(2026, 7, 15, 12, 0));
    }

    #[test]
    fn test_fixed_calendar_reproduces_legacy_plus_five() {
        let calendar = FixedOffsetCalendar::from_hours(-5);
        assert_eq!(calendar.to_instant(date(2026, 1, 15), time(8, 0)), utc(2026, 1, 15, 13, 0));
        assert_eq!(calendar.to_instant(date(2026, 7, 15), time(8, 0)), utc(2026, 7, 15, 13, 0));
        assert_eq!(calendar.time_label(utc(2026, 7, 15, 13, 0)), "08:00");
    }

    #[test]
    fn test_spring_forward_gap_moves_to_next_valid_hour() {
        // 2026-03-08 02:30 does not exist in Montreal
        let instant = montreal().to_instant(date(2026, 3, 8), time(2, 30));
        assert_eq!(instant, utc(2026, 3, 8, 7, 30));
    }

    #[test]
    fn test_fall_back_ambiguity_takes_earlier_instant() {
        // 2026-11-01 01:30 happens twice; the EDT one comes first
        let instant = montreal().to_instant(date(2026, 11, 1), time(1, 30));
        assert_eq!(instant, utc(2026, 11, 1, 5, 30));
    }

    #[test]
    fn test_local_date_uses_civil_day_not_utc_day() {
        // 23:30 in Montreal on March 2 is already March 3 in UTC
        let calendar = montreal();
        let instant = calendar.to_instant(date(2026, 3, 2), time(23, 30));
        assert_eq!(instant.date_naive(), date(2026, 3, 3));
        assert_eq!(calendar.local_date(instant), date(2026, 3, 2));
    }

    #[test]
    fn test_range_bounds_cover_whole_local_days() {
        let (start, end) = montreal().range_bounds(date(2026, 3, 2), 7);
        assert_eq!(start, utc(2026, 3, 2, 5, 0));
        // DST starts inside the horizon, so the end is at UTC-4
        assert_eq!(end, utc(2026, 3, 9, 4, 0));
    }

    #[test]
    fn test_unknown_timezone_falls_back_to_fixed_offset() {
        let policy = SchedulingPolicy {
            timezone: "Mars/Olympus_Mons".to_string(),
            ..SchedulingPolicy::default()
        };
        let calendar = calendar_for(&policy);
        assert_eq!(calendar.to_instant(date(2026, 7, 15), time(8, 0)), utc(2026, 7, 15, 13, 0));
    }
}
