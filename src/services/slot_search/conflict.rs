//! Overlap test between a candidate and a technician's booked jobs

use chrono::{DateTime, Utc};

use crate::types::ScheduledJob;

/// True if `[start, end)` overlaps any active job. Touching intervals do not
/// conflict.
pub fn has_conflict(start: DateTime<Utc>, end: DateTime<Utc>, jobs: &[&ScheduledJob]) -> bool {
    jobs.iter()
        .filter(|job| job.is_active())
        .any(|job| start < job.end_at() && end > job.scheduled_at)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use uuid::Uuid;

    use crate::services::civil_time::{CivilCalendar, ZonedCalendar};
    use crate::services::testing::{date, job_at, time};
    use crate::types::JobStatus;

    fn calendar() -> ZonedCalendar {
        ZonedCalendar::new(chrono_tz::America::Montreal)
    }

    fn check(jobs: &[ScheduledJob], hour: u32, minute: u32) -> bool {
        let calendar = calendar();
        let start = calendar.to_instant(date(2026, 3, 2), time(hour, minute));
        let refs: Vec<&ScheduledJob> = jobs.iter().collect();
        has_conflict(start, start + Duration::minutes(60), &refs)
    }

    #[test]
    fn test_candidate_around_one_hour_job() {
        let tech = Uuid::new_v4();
        let jobs = vec![job_at(&calendar(), &[tech], date(2026, 3, 2), 10, 0)];

        assert!(!check(&jobs, 9, 0), "09:00-10:00 touches the job start");
        assert!(check(&jobs, 10, 30), "10:30 overlaps 10:00-11:00");
        assert!(!check(&jobs, 11, 0), "11:00 touches the job end");
        assert!(check(&jobs, 9, 30));
    }

    #[test]
    fn test_explicit_end_time_extends_job() {
        let tech = Uuid::new_v4();
        let mut job = job_at(&calendar(), &[tech], date(2026, 3, 2), 10, 0);
        job.scheduled_end_at = Some(job.scheduled_at + Duration::minutes(150));
        let jobs = vec![job];

        assert!(check(&jobs, 12, 0));
        assert!(!check(&jobs, 12, 30));
    }

    #[test]
    fn test_cancelled_jobs_do_not_conflict() {
        let tech = Uuid::new_v4();
        let mut job = job_at(&calendar(), &[tech], date(2026, 3, 2), 10, 0);
        job.status = JobStatus::Cancelled;

        assert!(!check(&[job], 10, 0));
    }

    #[test]
    fn test_no_jobs_means_no_conflict() {
        assert!(!check(&[], 10, 0));
    }
}
