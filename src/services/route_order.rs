//! Visiting order for a technician's day

use anyhow::Result;

use crate::services::geo::distance_km;
use crate::types::RouteStop;

/// Orders a fixed set of stops. Must return exactly the stops it was given.
pub trait RouteOrderer: Send + Sync {
    fn order_stops(&self, stops: Vec<RouteStop>) -> Result<Vec<RouteStop>>;

    fn name(&self) -> &'static str;
}

/// Greedy nearest-neighbor tour starting at the earliest booked stop.
/// Stops without coordinates end up last, in their original order.
pub struct NearestNeighborOrderer;

impl RouteOrderer for NearestNeighborOrderer {
    fn order_stops(&self, mut stops: Vec<RouteStop>) -> Result<Vec<RouteStop>> {
        stops.sort_by_key(|s| s.job.scheduled_at);
        let (mut pending, unresolved): (Vec<RouteStop>, Vec<RouteStop>) =
            stops.into_iter().partition(|s| s.coordinates.is_some());

        let mut order = Vec::with_capacity(pending.len() + unresolved.len());
        if !pending.is_empty() {
            order.push(pending.remove(0));
        }

        while !pending.is_empty() {
            let current = order.last().and_then(|s: &RouteStop| s.coordinates);
            let mut nearest = 0;
            let mut nearest_distance = f64::MAX;
            for (i, candidate) in pending.iter().enumerate() {
                let distance = distance_km(current.as_ref(), candidate.coordinates.as_ref());
                if distance < nearest_distance {
                    nearest = i;
                    nearest_distance = distance;
                }
            }
            order.push(pending.remove(nearest));
        }

        order.extend(unresolved);
        Ok(order)
    }

    fn name(&self) -> &'static str {
        "nearest-neighbor"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use uuid::Uuid;

    use crate::types::{Coordinates, JobStatus, ScheduledJob};

    fn stop(hour: u32, coordinates: Option<Coordinates>) -> RouteStop {
        RouteStop {
            job: ScheduledJob {
                id: Uuid::new_v4(),
                technician_ids: vec![],
                property: None,
                scheduled_at: Utc.with_ymd_and_hms(2026, 3, 2, hour, 0, 0).unwrap(),
                scheduled_end_at: None,
                status: JobStatus::Scheduled,
                actual_duration_minutes: None,
            },
            coordinates,
        }
    }

    #[test]
    fn test_visits_nearest_stop_next() {
        let first = stop(13, Some(Coordinates::new(45.50, -73.57)));
        let far = stop(14, Some(Coordinates::new(45.60, -73.80)));
        let near = stop(15, Some(Coordinates::new(45.51, -73.58)));
        let ids = [first.job.id, near.job.id, far.job.id];

        let ordered = NearestNeighborOrderer
            .order_stops(vec![far, near, first])
            .unwrap();

        let got: Vec<Uuid> = ordered.iter().map(|s| s.job.id).collect();
        assert_eq!(got, ids);
    }

    #[test]
    fn test_unresolved_stops_go_last() {
        let unresolved = stop(12, None);
        let resolved = stop(14, Some(Coordinates::new(45.50, -73.57)));
        let unresolved_id = unresolved.job.id;

        let ordered = NearestNeighborOrderer
            .order_stops(vec![unresolved, resolved])
            .unwrap();

        assert_eq!(ordered.len(), 2);
        assert_eq!(ordered[1].job.id, unresolved_id);
    }
}
