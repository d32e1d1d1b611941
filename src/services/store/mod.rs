//! Availability store: read access to technicians, jobs, services and
//! properties, plus the two writes the engine performs.

#[cfg(test)]
pub mod memory;
mod postgres;

pub use postgres::PgAvailabilityStore;

use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::types::{Coordinates, JobStatus, PropertyLocation, ScheduledJob, ServiceDefinition, Technician};

/// Range query over scheduled jobs
#[derive(Debug, Clone)]
pub struct JobQuery {
    pub technician_id: Option<Uuid>,
    /// Inclusive
    pub range_start: DateTime<Utc>,
    /// Exclusive
    pub range_end: DateTime<Utc>,
    pub exclude_statuses: Vec<JobStatus>,
}

impl JobQuery {
    /// Jobs in `[range_start, range_end)`, cancelled ones excluded
    pub fn active_between(range_start: DateTime<Utc>, range_end: DateTime<Utc>) -> Self {
        Self {
            technician_id: None,
            range_start,
            range_end,
            exclude_statuses: vec![JobStatus::Cancelled],
        }
    }

    pub fn for_technician(mut self, technician_id: Uuid) -> Self {
        self.technician_id = Some(technician_id);
        self
    }

    /// Client-side form of the query predicate
    pub fn matches(&self, job: &ScheduledJob) -> bool {
        job.scheduled_at >= self.range_start
            && job.scheduled_at < self.range_end
            && self.technician_id.map_or(true, |id| job.is_assigned_to(id))
            && !self.exclude_statuses.contains(&job.status)
    }
}

/// Storage collaborator of the scheduling engine
#[async_trait]
pub trait AvailabilityStore: Send + Sync {
    async fn list_active_technicians(&self) -> Result<Vec<Technician>>;

    /// Jobs with their technicians and property, in one range query
    async fn list_jobs(&self, query: &JobQuery) -> Result<Vec<ScheduledJob>>;

    async fn get_service_definition(&self, service_id: Uuid) -> Result<Option<ServiceDefinition>>;

    async fn get_property_location(&self, property_id: Uuid) -> Result<Option<PropertyLocation>>;

    /// Persist geocoder output for a property
    async fn update_property_coordinates(&self, property_id: Uuid, coordinates: Coordinates) -> Result<()>;

    /// Move a job to a new start, keeping its length
    async fn reschedule_job(&self, job_id: Uuid, new_start: DateTime<Utc>) -> Result<()>;
}
