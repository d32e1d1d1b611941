//! Scheduled job types

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{Coordinates, PropertyLocation};
use crate::defaults::DEFAULT_JOB_DURATION_MINUTES;

/// Job status as stored. Only cancellation matters to the scheduler.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum JobStatus {
    Scheduled,
    Confirmed,
    InProgress,
    Completed,
    Cancelled,
    Other(String),
}

impl JobStatus {
    pub fn as_str(&self) -> &str {
        match self {
            JobStatus::Scheduled => "scheduled",
            JobStatus::Confirmed => "confirmed",
            JobStatus::InProgress => "in_progress",
            JobStatus::Completed => "completed",
            JobStatus::Cancelled => "cancelled",
            JobStatus::Other(other) => other,
        }
    }

    pub fn is_cancelled(&self) -> bool {
        matches!(self, JobStatus::Cancelled)
    }
}

impl From<String> for JobStatus {
    fn from(value: String) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "scheduled" => JobStatus::Scheduled,
            "confirmed" => JobStatus::Confirmed,
            "in_progress" => JobStatus::InProgress,
            "completed" => JobStatus::Completed,
            "cancelled" | "canceled" => JobStatus::Cancelled,
            _ => JobStatus::Other(value),
        }
    }
}

impl From<&str> for JobStatus {
    fn from(value: &str) -> Self {
        JobStatus::from(value.to_string())
    }
}

impl From<JobStatus> for String {
    fn from(status: JobStatus) -> Self {
        status.as_str().to_string()
    }
}

/// A job on the calendar, with its assigned technicians and property
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScheduledJob {
    pub id: Uuid,
    /// May be empty for unassigned jobs
    pub technician_ids: Vec<Uuid>,
    /// Absent for guest bookings without a resolved address
    pub property: Option<PropertyLocation>,
    pub scheduled_at: DateTime<Utc>,
    pub scheduled_end_at: Option<DateTime<Utc>>,
    pub status: JobStatus,
    pub actual_duration_minutes: Option<i32>,
}

impl ScheduledJob {
    pub fn is_active(&self) -> bool {
        !self.status.is_cancelled()
    }

    pub fn is_assigned_to(&self, technician_id: Uuid) -> bool {
        self.technician_ids.contains(&technician_id)
    }

    /// Explicit end, else start plus the recorded duration, else one hour
    pub fn end_at(&self) -> DateTime<Utc> {
        if let Some(end) = self.scheduled_end_at {
            return end;
        }
        let minutes = self
            .actual_duration_minutes
            .filter(|m| *m > 0)
            .map(i64::from)
            .unwrap_or(DEFAULT_JOB_DURATION_MINUTES);
        self.scheduled_at + Duration::minutes(minutes)
    }

    pub fn coordinates(&self) -> Option<Coordinates> {
        self.property.as_ref().and_then(PropertyLocation::coordinates)
    }
}
