//! Shared builders for scheduler tests

use chrono::{NaiveDate, NaiveTime};
use uuid::Uuid;

use crate::services::civil_time::CivilCalendar;
use crate::types::{Coordinates, JobStatus, PropertyLocation, ScheduledJob, Technician};

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

pub fn time(h: u32, m: u32) -> NaiveTime {
    NaiveTime::from_hms_opt(h, m, 0).unwrap()
}

pub fn technician(name: &str) -> Technician {
    Technician::new(Uuid::new_v4(), name)
}

pub fn property_at(coordinates: Coordinates) -> PropertyLocation {
    PropertyLocation {
        id: Uuid::new_v4(),
        lat: Some(coordinates.lat),
        lng: Some(coordinates.lng),
        address: Some(format!("{:.4}, {:.4}", coordinates.lat, coordinates.lng)),
    }
}

/// One-hour job at a local wall-clock time, without a property
pub fn job_at(
    calendar: &dyn CivilCalendar,
    technician_ids: &[Uuid],
    day: NaiveDate,
    hour: u32,
    minute: u32,
) -> ScheduledJob {
    ScheduledJob {
        id: Uuid::new_v4(),
        technician_ids: technician_ids.to_vec(),
        property: None,
        scheduled_at: calendar.to_instant(day, time(hour, minute)),
        scheduled_end_at: None,
        status: JobStatus::Scheduled,
        actual_duration_minutes: None,
    }
}

pub fn job_located(
    calendar: &dyn CivilCalendar,
    technician_ids: &[Uuid],
    day: NaiveDate,
    hour: u32,
    minute: u32,
    coordinates: Coordinates,
) -> ScheduledJob {
    ScheduledJob {
        property: Some(property_at(coordinates)),
        ..job_at(calendar, technician_ids, day, hour, minute)
    }
}

/// Point `km` kilometres due north of `origin`
pub fn north_of(origin: Coordinates, km: f64) -> Coordinates {
    Coordinates {
        lat: origin.lat + km / 111.195,
        lng: origin.lng,
    }
}

pub fn downtown_montreal() -> Coordinates {
    Coordinates::new(45.5017, -73.5673)
}
