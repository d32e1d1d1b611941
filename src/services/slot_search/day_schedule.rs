//! Client-side partition of one batch job query into technician-days

use std::collections::HashMap;

use chrono::NaiveDate;
use uuid::Uuid;

use crate::services::civil_time::CivilCalendar;
use crate::types::ScheduledJob;

/// Active jobs per (technician, local date), sorted by start
pub struct TechnicianDays<'a> {
    days: HashMap<(Uuid, NaiveDate), Vec<&'a ScheduledJob>>,
}

impl<'a> TechnicianDays<'a> {
    pub fn build(jobs: &'a [ScheduledJob], calendar: &dyn CivilCalendar) -> Self {
        let mut days: HashMap<(Uuid, NaiveDate), Vec<&'a ScheduledJob>> = HashMap::new();

        for job in jobs.iter().filter(|j| j.is_active()) {
            let date = calendar.local_date(job.scheduled_at);
            for technician_id in &job.technician_ids {
                days.entry((*technician_id, date)).or_default().push(job);
            }
        }

        for day in days.values_mut() {
            day.sort_by_key(|j| (j.scheduled_at, j.id));
        }

        Self { days }
    }

    pub fn jobs(&self, technician_id: Uuid, date: NaiveDate) -> &[&'a ScheduledJob] {
        self.days
            .get(&(technician_id, date))
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }
}
