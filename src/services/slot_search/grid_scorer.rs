//! Proximity and load scoring for grid candidates (higher is better)

use crate::services::geo::{distance_km, UNKNOWN_DISTANCE_KM};
use crate::types::{Coordinates, ScheduledJob};

pub const BASE_SCORE: f64 = 50.0;
pub const CLEAR_DAY_BONUS: f64 = 10.0;
pub const OPTIMIZED_BONUS: f64 = 40.0;
pub const EFFICIENT_BONUS: f64 = 20.0;
pub const FAR_PENALTY: f64 = 10.0;

pub const OPTIMIZED_RADIUS_KM: f64 = 5.0;
pub const EFFICIENT_RADIUS_KM: f64 = 15.0;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GridScore {
    pub score: f64,
    pub reason: &'static str,
}

/// Score shared by every grid candidate of one technician-day
pub fn score_technician_day(day_jobs: &[&ScheduledJob], target: Option<&Coordinates>) -> GridScore {
    if day_jobs.is_empty() {
        return GridScore {
            score: BASE_SCORE + CLEAR_DAY_BONUS,
            reason: "",
        };
    }

    let Some(target) = target else {
        return GridScore {
            score: BASE_SCORE,
            reason: "",
        };
    };

    match nearest_job_km(day_jobs, target) {
        d if d < OPTIMIZED_RADIUS_KM => GridScore {
            score: BASE_SCORE + OPTIMIZED_BONUS,
            reason: "Optimized",
        },
        d if d < EFFICIENT_RADIUS_KM => GridScore {
            score: BASE_SCORE + EFFICIENT_BONUS,
            reason: "Efficient",
        },
        _ => GridScore {
            score: BASE_SCORE - FAR_PENALTY,
            reason: "",
        },
    }
}

/// Shortest distance from the target to a located job of the day
fn nearest_job_km(day_jobs: &[&ScheduledJob], target: &Coordinates) -> f64 {
    day_jobs
        .iter()
        .filter_map(|job| job.coordinates())
        .map(|c| distance_km(Some(target), Some(&c)))
        .fold(UNKNOWN_DISTANCE_KM, f64::min)
}
