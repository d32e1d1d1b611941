//! In-memory availability store that records every call

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use uuid::Uuid;

use super::{AvailabilityStore, JobQuery};
use crate::types::{Coordinates, PropertyLocation, ScheduledJob, ServiceDefinition, Technician};

#[derive(Default)]
pub struct InMemoryStore {
    technicians: Mutex<Vec<Technician>>,
    jobs: Mutex<Vec<ScheduledJob>>,
    services: Mutex<HashMap<Uuid, ServiceDefinition>>,
    properties: Mutex<HashMap<Uuid, PropertyLocation>>,
    job_queries: Mutex<Vec<JobQuery>>,
    reschedules: Mutex<Vec<(Uuid, DateTime<Utc>)>>,
    coordinate_updates: Mutex<Vec<(Uuid, Coordinates)>>,
    fail_job_queries: AtomicBool,
    job_query_delay: Mutex<Option<Duration>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_technician(&self, technician: Technician) {
        self.technicians.lock().push(technician);
    }

    pub fn add_job(&self, job: ScheduledJob) {
        if let Some(property) = &job.property {
            self.properties.lock().entry(property.id).or_insert_with(|| property.clone());
        }
        self.jobs.lock().push(job);
    }

    pub fn add_service(&self, service: ServiceDefinition) {
        self.services.lock().insert(service.id, service);
    }

    pub fn add_property(&self, property: PropertyLocation) {
        self.properties.lock().insert(property.id, property);
    }

    /// Make `list_jobs` fail, to exercise fault handling
    pub fn fail_job_queries(&self) {
        self.fail_job_queries.store(true, Ordering::SeqCst);
    }

    /// Make `list_jobs` stall before answering, to exercise deadlines
    pub fn delay_job_queries(&self, delay: Duration) {
        *self.job_query_delay.lock() = Some(delay);
    }

    pub fn job_queries(&self) -> Vec<JobQuery> {
        self.job_queries.lock().clone()
    }

    pub fn reschedules(&self) -> Vec<(Uuid, DateTime<Utc>)> {
        self.reschedules.lock().clone()
    }

    pub fn coordinate_updates(&self) -> Vec<(Uuid, Coordinates)> {
        self.coordinate_updates.lock().clone()
    }

    pub fn job(&self, job_id: Uuid) -> Option<ScheduledJob> {
        self.jobs.lock().iter().find(|j| j.id == job_id).cloned()
    }
}

#[async_trait]
impl AvailabilityStore for InMemoryStore {
    async fn list_active_technicians(&self) -> Result<Vec<Technician>> {
        Ok(self.technicians.lock().iter().filter(|t| t.active).cloned().collect())
    }

    async fn list_jobs(&self, query: &JobQuery) -> Result<Vec<ScheduledJob>> {
        self.job_queries.lock().push(query.clone());
        let delay = *self.job_query_delay.lock();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        if self.fail_job_queries.load(Ordering::SeqCst) {
            anyhow::bail!("connection to job store lost");
        }

        let properties = self.properties.lock();
        let mut jobs: Vec<ScheduledJob> = self
            .jobs
            .lock()
            .iter()
            .filter(|job| query.matches(job))
            .cloned()
            .map(|mut job| {
                // Serve the current property record, like a join would
                if let Some(property) = job.property.as_ref().and_then(|p| properties.get(&p.id)) {
                    job.property = Some(property.clone());
                }
                job
            })
            .collect();
        jobs.sort_by_key(|j| j.scheduled_at);
        Ok(jobs)
    }

    async fn get_service_definition(&self, service_id: Uuid) -> Result<Option<ServiceDefinition>> {
        Ok(self.services.lock().get(&service_id).cloned())
    }

    async fn get_property_location(&self, property_id: Uuid) -> Result<Option<PropertyLocation>> {
        Ok(self.properties.lock().get(&property_id).cloned())
    }

    async fn update_property_coordinates(&self, property_id: Uuid, coordinates: Coordinates) -> Result<()> {
        if let Some(property) = self.properties.lock().get_mut(&property_id) {
            property.set_coordinates(coordinates);
        }
        self.coordinate_updates.lock().push((property_id, coordinates));
        Ok(())
    }

    async fn reschedule_job(&self, job_id: Uuid, new_start: DateTime<Utc>) -> Result<()> {
        let mut jobs = self.jobs.lock();
        let job = jobs
            .iter_mut()
            .find(|j| j.id == job_id)
            .ok_or_else(|| anyhow::anyhow!("job {} not found", job_id))?;

        if let Some(end) = job.scheduled_end_at {
            job.scheduled_end_at = Some(new_start + (end - job.scheduled_at));
        }
        job.scheduled_at = new_start;
        drop(jobs);

        self.reschedules.lock().push((job_id, new_start));
        Ok(())
    }
}
