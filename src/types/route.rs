//! Route sequencing types

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{Coordinates, ScheduledJob};

/// Request to re-order and re-time one technician's day
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OptimizeRouteRequest {
    pub date: NaiveDate,
    pub technician_id: Uuid,
}

/// A job with its resolved coordinates, as fed to the route orderer
#[derive(Debug, Clone)]
pub struct RouteStop {
    pub job: ScheduledJob,
    pub coordinates: Option<Coordinates>,
}

impl RouteStop {
    pub fn new(job: ScheduledJob) -> Self {
        let coordinates = job.coordinates();
        Self { job, coordinates }
    }
}

/// New start time written for a job
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RescheduledStop {
    pub job_id: Uuid,
    pub sequence: usize,
    pub starts_at: DateTime<Utc>,
    /// Local wall-clock label, `HH:MM`
    pub time: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RouteOptimization {
    pub success: bool,
    pub message: String,
    pub stops: Vec<RescheduledStop>,
}
