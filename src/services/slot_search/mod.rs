//! Availability slot search
//!
//! Two searches share the same plumbing: one batch job query for the whole
//! range, client-side partition into technician-days, past and conflict
//! filtering, then scoring. They differ in what a score means:
//!
//! - `find_slots`: hourly grid over the horizon, scored for goodness
//! - `find_gap_slots`: gaps around booked jobs on one day, scored as detour cost

pub mod candidates;
pub mod conflict;
pub mod day_schedule;
pub mod gap_scorer;
pub mod grid_scorer;
pub mod ranking;

use anyhow::Result;
use chrono::Duration;
use tracing::{debug, info, warn};

use crate::error::SchedulingError;
use crate::services::engine::{CallOptions, SchedulingEngine};
use crate::services::store::JobQuery;
use crate::types::{
    CandidateKind, Coordinates, FindGapSlotsRequest, FindSlotsRequest, ScorePolarity, SearchDiagnostics,
    SlotCandidate, SlotSearchResult,
};

use candidates::{horizon, hourly_candidates};
use conflict::has_conflict;
use day_schedule::TechnicianDays;
use gap_scorer::{scan_technician_day, GapRules};
use grid_scorer::score_technician_day;

impl SchedulingEngine {
    /// Grid search over the configured horizon, best (highest score) first
    pub async fn find_slots(
        &self,
        request: &FindSlotsRequest,
        opts: &CallOptions,
    ) -> Result<SlotSearchResult, SchedulingError> {
        self.grid_search(request, opts)
            .await
            .map_err(|e| SchedulingError::surface("find_slots", e))
    }

    /// Gap search for one day around a target location, cheapest detour first
    pub async fn find_gap_slots(
        &self,
        request: &FindGapSlotsRequest,
        opts: &CallOptions,
    ) -> Result<SlotSearchResult, SchedulingError> {
        self.gap_search(request, opts)
            .await
            .map_err(|e| SchedulingError::surface("find_gap_slots", e))
    }

    async fn grid_search(&self, request: &FindSlotsRequest, opts: &CallOptions) -> Result<SlotSearchResult> {
        let polarity = ScorePolarity::HigherIsBetter;
        let start_date = request.search_start_date;

        let service = self
            .call_store(opts, "get_service_definition", self.store.get_service_definition(request.service_id))
            .await?
            .ok_or(SchedulingError::ServiceNotFound(request.service_id))?;
        let duration = service.duration();

        let target = match request.property_id {
            Some(property_id) => {
                let property = self
                    .call_store(opts, "get_property_location", self.store.get_property_location(property_id))
                    .await?
                    .ok_or(SchedulingError::PropertyNotFound(property_id))?;
                let coordinates = property.coordinates();
                if coordinates.is_none() {
                    debug!("Property {} has no coordinates, scoring without proximity", property_id);
                }
                coordinates
            }
            None => None,
        };

        let technicians = self
            .call_store(opts, "list_active_technicians", self.store.list_active_technicians())
            .await?;
        if technicians.is_empty() {
            warn!("Slot search from {} found no active technicians", start_date);
            return Ok(SlotSearchResult {
                slots: vec![ranking::no_technicians(start_date)],
                polarity,
                diagnostics: SearchDiagnostics::default(),
            });
        }

        let days = self.policy.horizon_days;
        let (range_start, range_end) = self.calendar.range_bounds(start_date, days);
        let jobs = self
            .call_store(opts, "list_jobs", self.store.list_jobs(&JobQuery::active_between(range_start, range_end)))
            .await?;
        let schedule = TechnicianDays::build(&jobs, self.calendar.as_ref());

        let mut diagnostics = SearchDiagnostics::default();
        let mut slots = Vec::new();

        for date in horizon(start_date, days) {
            let grid = hourly_candidates(
                self.calendar.as_ref(),
                date,
                self.policy.grid_first_hour,
                self.policy.grid_last_hour,
                duration,
            );

            for technician in &technicians {
                let day_jobs = schedule.jobs(technician.id, date);
                let score = score_technician_day(day_jobs, target.as_ref());

                for candidate in &grid {
                    diagnostics.evaluated += 1;
                    if self.guard.is_past(candidate.starts_at) {
                        diagnostics.rejected_past += 1;
                        continue;
                    }
                    if has_conflict(candidate.starts_at, candidate.ends_at, day_jobs) {
                        diagnostics.rejected_conflict += 1;
                        continue;
                    }
                    slots.push(SlotCandidate {
                        kind: CandidateKind::Slot,
                        date,
                        time: self.calendar.time_label(candidate.starts_at),
                        starts_at: Some(candidate.starts_at),
                        technician_id: Some(technician.id),
                        technician_name: technician.display_name.clone(),
                        score: score.score,
                        reason: score.reason.to_string(),
                    });
                }
            }
        }

        diagnostics.emitted = slots.len();
        debug!(
            "Grid search from {} ({} jobs, {} technicians, min technicians {}): {:?}",
            start_date,
            jobs.len(),
            technicians.len(),
            service.min_technician_count(),
            diagnostics
        );

        if slots.is_empty() {
            info!("No availability in the {} days from {}", days, start_date);
            slots.push(ranking::fully_booked(start_date, days, &diagnostics));
        } else {
            ranking::rank(&mut slots, polarity);
        }

        Ok(SlotSearchResult { slots, polarity, diagnostics })
    }

    async fn gap_search(&self, request: &FindGapSlotsRequest, opts: &CallOptions) -> Result<SlotSearchResult> {
        let polarity = ScorePolarity::LowerIsBetter;
        let date = request.date;

        if request.duration_minutes <= 0 {
            return Err(SchedulingError::InvalidInput(format!(
                "duration must be positive, got {} minutes",
                request.duration_minutes
            ))
            .into());
        }
        let target = Coordinates::new(request.target_lat, request.target_lng);
        if !(-90.0..=90.0).contains(&target.lat) || !(-180.0..=180.0).contains(&target.lng) {
            return Err(SchedulingError::InvalidInput(format!(
                "target ({}, {}) is not a valid coordinate",
                target.lat, target.lng
            ))
            .into());
        }

        let technicians = self
            .call_store(opts, "list_active_technicians", self.store.list_active_technicians())
            .await?;
        if technicians.is_empty() {
            warn!("Gap search on {} found no active technicians", date);
            return Ok(SlotSearchResult {
                slots: vec![ranking::no_technicians(date)],
                polarity,
                diagnostics: SearchDiagnostics::default(),
            });
        }

        let (range_start, range_end) = self.calendar.range_bounds(date, 1);
        let jobs = self
            .call_store(opts, "list_jobs", self.store.list_jobs(&JobQuery::active_between(range_start, range_end)))
            .await?;
        let schedule = TechnicianDays::build(&jobs, self.calendar.as_ref());

        let rules = GapRules {
            duration: Duration::minutes(request.duration_minutes),
            padding: Duration::minutes(self.policy.gap_padding_minutes),
            offset: Duration::minutes(self.policy.gap_offset_minutes),
            work_start: self.calendar.to_instant(date, self.policy.work_day_start),
            work_end: self.calendar.to_instant(date, self.policy.work_day_end),
        };

        let mut diagnostics = SearchDiagnostics::default();
        let mut slots = Vec::new();

        for technician in &technicians {
            let scan = scan_technician_day(schedule.jobs(technician.id, date), &target, &rules);
            diagnostics.evaluated += scan.evaluated;
            diagnostics.rejected_conflict += scan.rejected_conflict;

            for candidate in scan.candidates {
                if self.guard.is_past(candidate.starts_at) {
                    diagnostics.rejected_past += 1;
                    continue;
                }
                slots.push(SlotCandidate {
                    kind: CandidateKind::Slot,
                    date,
                    time: self.calendar.time_label(candidate.starts_at),
                    starts_at: Some(candidate.starts_at),
                    technician_id: Some(technician.id),
                    technician_name: technician.display_name.clone(),
                    score: candidate.score,
                    reason: candidate.reason,
                });
            }
        }

        diagnostics.emitted = slots.len();
        debug!("Gap search on {} ({} jobs): {:?}", date, jobs.len(), diagnostics);

        if slots.is_empty() {
            info!("No gap availability on {}", date);
            slots.push(ranking::fully_booked(date, 1, &diagnostics));
        } else {
            ranking::rank(&mut slots, polarity);
        }

        Ok(SlotSearchResult { slots, polarity, diagnostics })
    }
}
