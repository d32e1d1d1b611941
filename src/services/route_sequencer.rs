//! Daily route re-ordering and re-timing for one technician.
//!
//! Every job of the day gets a new start, including jobs whose position in
//! the visiting order did not change.

use std::collections::HashSet;

use anyhow::{bail, Result};
use chrono::{Duration, NaiveDate};
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::error::SchedulingError;
use crate::services::engine::{CallOptions, SchedulingEngine};
use crate::services::store::JobQuery;
use crate::types::{RescheduledStop, RouteOptimization, RouteStop};

impl SchedulingEngine {
    pub async fn optimize_daily_route(
        &self,
        date: NaiveDate,
        technician_id: Uuid,
        opts: &CallOptions,
    ) -> Result<RouteOptimization, SchedulingError> {
        self.sequence_day(date, technician_id, opts)
            .await
            .map_err(|e| SchedulingError::surface("optimize_daily_route", e))
    }

    async fn sequence_day(&self, date: NaiveDate, technician_id: Uuid, opts: &CallOptions) -> Result<RouteOptimization> {
        // Held from the read of the day until the last write
        let _reservation = self.reservations.acquire(technician_id, date).await?;

        let (range_start, range_end) = self.calendar.range_bounds(date, 1);
        let query = JobQuery::active_between(range_start, range_end).for_technician(technician_id);
        let jobs = self.call_store(opts, "list_jobs", self.store.list_jobs(&query)).await?;

        if jobs.len() <= 1 {
            debug!("Technician {} has {} job(s) on {}, nothing to optimize", technician_id, jobs.len(), date);
            return Ok(RouteOptimization {
                success: true,
                message: "Not enough jobs to optimize".to_string(),
                stops: Vec::new(),
            });
        }

        let mut stops = Vec::with_capacity(jobs.len());
        for job in jobs {
            let mut stop = RouteStop::new(job);
            if stop.coordinates.is_none() {
                self.resolve_stop(&mut stop, opts).await?;
            }
            stops.push(stop);
        }

        let expected: HashSet<Uuid> = stops.iter().map(|s| s.job.id).collect();
        let ordered = self.orderer.order_stops(stops)?;
        let returned: HashSet<Uuid> = ordered.iter().map(|s| s.job.id).collect();
        if ordered.len() != expected.len() || returned != expected {
            bail!(
                "route orderer '{}' returned {} stops, expected the same {} jobs",
                self.orderer.name(),
                ordered.len(),
                expected.len()
            );
        }

        let step = Duration::minutes(self.policy.route_step_minutes());
        let mut starts_at = self.calendar.to_instant(date, self.policy.route_day_start);
        let mut rescheduled = Vec::with_capacity(ordered.len());

        for (sequence, stop) in ordered.iter().enumerate() {
            self.call_store(opts, "reschedule_job", self.store.reschedule_job(stop.job.id, starts_at))
                .await?;
            let time = self.calendar.time_label(starts_at);
            info!("Job {} moved to {} {} (stop {})", stop.job.id, date, time, sequence + 1);
            rescheduled.push(RescheduledStop {
                job_id: stop.job.id,
                sequence: sequence + 1,
                starts_at,
                time,
            });
            starts_at += step;
        }

        Ok(RouteOptimization {
            success: true,
            message: format!("Route optimized: {} jobs rescheduled", rescheduled.len()),
            stops: rescheduled,
        })
    }

    /// Geocode a stop's property and persist the result. An address that
    /// cannot be resolved leaves the stop without coordinates.
    async fn resolve_stop(&self, stop: &mut RouteStop, opts: &CallOptions) -> Result<()> {
        let Some(property) = stop.job.property.as_ref() else {
            debug!("Job {} has no property, ordering it without a location", stop.job.id);
            return Ok(());
        };
        let Some(address) = property.address.as_deref().filter(|a| !a.trim().is_empty()) else {
            warn!("Property {} has no address to geocode", property.id);
            return Ok(());
        };

        match self.geocoder.geocode(address).await {
            Ok(Some(coordinates)) => {
                let property_id = property.id;
                self.call_store(
                    opts,
                    "update_property_coordinates",
                    self.store.update_property_coordinates(property_id, coordinates),
                )
                .await?;
                debug!("Geocoded property {} via {}", property_id, self.geocoder.name());
                stop.coordinates = Some(coordinates);
            }
            Ok(None) => warn!("Geocoder could not resolve address for property {}", property.id),
            Err(e) => warn!("Geocoding failed for property {}: {:#}", property.id, e),
        }
        Ok(())
    }
}
