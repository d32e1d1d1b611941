//! Time source and the past-candidate guard

use std::sync::Arc;

use chrono::{DateTime, Utc};
use chrono_tz::Tz;
use tracing::warn;

/// Source of "now"
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Clock frozen at a given instant
pub struct FixedClock(pub DateTime<Utc>);

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.0
    }
}

/// Decides whether a candidate start has already passed.
///
/// Comparison happens on wall-clock values in the business timezone. If the
/// timezone cannot be loaded the guard compares raw instants instead.
#[derive(Clone)]
pub struct ClockGuard {
    zone: Option<Tz>,
    clock: Arc<dyn Clock>,
}

impl ClockGuard {
    pub fn new(timezone: &str, clock: Arc<dyn Clock>) -> Self {
        let zone = match timezone.parse::<Tz>() {
            Ok(tz) => Some(tz),
            Err(e) => {
                warn!("Clock guard cannot load timezone '{}' ({}), comparing raw instants", timezone, e);
                None
            }
        };
        Self { zone, clock }
    }

    pub fn is_past(&self, candidate: DateTime<Utc>) -> bool {
        let now = self.clock.now();
        match self.zone {
            Some(tz) => candidate.with_timezone(&tz).naive_local() < now.with_timezone(&tz).naive_local(),
            None => candidate < now,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn guard_at(now: DateTime<Utc>, timezone: &str) -> ClockGuard {
        ClockGuard::new(timezone, Arc::new(FixedClock(now)))
    }

    #[test]
    fn test_one_minute_before_now_is_past() {
        let now = Utc.with_ymd_and_hms(2026, 3, 2, 15, 0, 0).unwrap();
        let guard = guard_at(now, "America/Montreal");

        assert!(guard.is_past(now - Duration::minutes(1)));
        assert!(!guard.is_past(now + Duration::minutes(1)));
    }

    #[test]
    fn test_current_instant_is_not_past() {
        let now = Utc.with_ymd_and_hms(2026, 3, 2, 15, 0, 0).unwrap();
        assert!(!guard_at(now, "America/Montreal").is_past(now));
    }

    #[test]
    fn test_unknown_timezone_falls_back_to_instant_comparison() {
        let now = Utc.with_ymd_and_hms(2026, 3, 2, 15, 0, 0).unwrap();
        let guard = guard_at(now, "Not/A_Zone");

        assert!(guard.is_past(now - Duration::minutes(1)));
        assert!(!guard.is_past(now + Duration::minutes(1)));
    }
}
