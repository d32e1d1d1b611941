//! Route-aware candidates in the idle time around booked jobs.
//!
//! Scores are travel cost in km, so lower is better: distance to the first
//! job for a day-start slot, insertion detour for a gap between jobs, and
//! distance from the last job for a day-end slot.

use chrono::{DateTime, Duration, Utc};

use super::conflict::has_conflict;
use crate::services::geo::{distance_km, is_known, UNKNOWN_DISTANCE_KM};
use crate::types::{Coordinates, ScheduledJob};

#[derive(Debug, Clone, Copy)]
pub struct GapRules {
    pub duration: Duration,
    /// Idle time a gap needs beyond the service duration
    pub padding: Duration,
    /// Distance between a job's end and the offered start
    pub offset: Duration,
    pub work_start: DateTime<Utc>,
    pub work_end: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct GapCandidate {
    pub starts_at: DateTime<Utc>,
    pub score: f64,
    pub reason: String,
}

#[derive(Debug, Clone, Default)]
pub struct GapScan {
    pub candidates: Vec<GapCandidate>,
    pub evaluated: usize,
    pub rejected_conflict: usize,
}

impl GapScan {
    fn offer(&mut self, day_jobs: &[&ScheduledJob], rules: &GapRules, candidate: GapCandidate) {
        self.evaluated += 1;
        if has_conflict(candidate.starts_at, candidate.starts_at + rules.duration, day_jobs) {
            self.rejected_conflict += 1;
        } else {
            self.candidates.push(candidate);
        }
    }
}

/// Extra distance from visiting `target` between `from` and `to` instead of
/// driving directly
pub fn detour_km(from: Option<&Coordinates>, target: &Coordinates, to: Option<&Coordinates>) -> f64 {
    if !from.is_some_and(is_known) || !to.is_some_and(is_known) {
        return UNKNOWN_DISTANCE_KM;
    }
    let detour = distance_km(from, Some(target)) + distance_km(Some(target), to) - distance_km(from, to);
    detour.max(0.0)
}

/// Day-start, inter-job and day-end candidates for one technician-day.
/// `day_jobs` must be sorted by start.
pub fn scan_technician_day(day_jobs: &[&ScheduledJob], target: &Coordinates, rules: &GapRules) -> GapScan {
    let mut scan = GapScan::default();
    let active: Vec<&ScheduledJob> = day_jobs.iter().copied().filter(|j| j.is_active()).collect();

    let first = active.first().map(|job| job.coordinates());
    let day_start_score = match first {
        Some(coordinates) => distance_km(Some(target), coordinates.as_ref()),
        None => 0.0,
    };
    scan.offer(
        &active,
        rules,
        GapCandidate {
            starts_at: rules.work_start,
            score: day_start_score,
            reason: (if active.is_empty() { "Open day" } else { "Before first job" }).to_string(),
        },
    );

    for pair in active.windows(2) {
        let (before, after) = (pair[0], pair[1]);
        let idle = after.scheduled_at - before.end_at();
        if idle < rules.duration + rules.padding {
            continue;
        }
        let before_coords = before.coordinates();
        let after_coords = after.coordinates();
        scan.offer(
            &active,
            rules,
            GapCandidate {
                starts_at: before.end_at() + rules.offset,
                score: detour_km(before_coords.as_ref(), target, after_coords.as_ref()),
                reason: "Between jobs".to_string(),
            },
        );
    }

    if let Some(last) = active.iter().max_by_key(|j| j.end_at()) {
        let starts_at = last.end_at() + rules.offset;
        if starts_at < rules.work_end {
            scan.offer(
                &active,
                rules,
                GapCandidate {
                    starts_at,
                    score: distance_km(Some(target), last.coordinates().as_ref()),
                    reason: "After last job".to_string(),
                },
            );
        }
    }

    scan
}
