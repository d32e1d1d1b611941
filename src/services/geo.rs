//! Geographic calculations

use crate::types::Coordinates;

/// Earth radius in kilometers
const EARTH_RADIUS_KM: f64 = 6371.0;

/// Distance reported when a pairing cannot be measured
pub const UNKNOWN_DISTANCE_KM: f64 = 9999.0;

/// Calculate Haversine distance between two points in kilometers
pub fn haversine_distance(from: &Coordinates, to: &Coordinates) -> f64 {
    let d_lat = (to.lat - from.lat).to_radians();
    let d_lon = (to.lng - from.lng).to_radians();

    let lat1 = from.lat.to_radians();
    let lat2 = to.lat.to_radians();

    let a = (d_lat / 2.0).sin().powi(2)
        + lat1.cos() * lat2.cos() * (d_lon / 2.0).sin().powi(2);

    let c = 2.0 * a.sqrt().asin();

    EARTH_RADIUS_KM * c
}

/// Great-circle distance, or [`UNKNOWN_DISTANCE_KM`] when either side is
/// missing or carries a zero component (unset coordinates are stored as 0).
pub fn distance_km(from: Option<&Coordinates>, to: Option<&Coordinates>) -> f64 {
    match (from, to) {
        (Some(a), Some(b)) if is_known(a) && is_known(b) => haversine_distance(a, b),
        _ => UNKNOWN_DISTANCE_KM,
    }
}

/// False for the zero sentinel and for non-finite components
pub fn is_known(c: &Coordinates) -> bool {
    c.lat != 0.0 && c.lng != 0.0 && c.lat.is_finite() && c.lng.is_finite()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_haversine_montreal_quebec() {
        let montreal = Coordinates { lat: 45.5017, lng: -73.5673 };
        let quebec = Coordinates { lat: 46.8139, lng: -71.2080 };

        let distance = haversine_distance(&montreal, &quebec);

        // Montreal to Quebec City is approximately 233 km
        assert!((distance - 233.0).abs() < 5.0);
    }

    #[test]
    fn test_distance_same_point_is_zero() {
        let point = Coordinates { lat: 45.5, lng: -73.6 };
        assert!(distance_km(Some(&point), Some(&point)).abs() < 1e-9);
    }

    #[test]
    fn test_distance_is_symmetric() {
        let a = Coordinates { lat: 45.5017, lng: -73.5673 };
        let b = Coordinates { lat: 45.6066, lng: -73.7124 };

        let ab = distance_km(Some(&a), Some(&b));
        let ba = distance_km(Some(&b), Some(&a));
        assert!((ab - ba).abs() < 1e-9);
    }

    #[test]
    fn test_missing_coordinates_return_sentinel() {
        let a = Coordinates { lat: 45.5, lng: -73.6 };
        assert_eq!(distance_km(Some(&a), None), UNKNOWN_DISTANCE_KM);
        assert_eq!(distance_km(None, Some(&a)), UNKNOWN_DISTANCE_KM);
        assert_eq!(distance_km(None, None), UNKNOWN_DISTANCE_KM);
    }

    #[test]
    fn test_zero_component_is_treated_as_unset() {
        let a = Coordinates { lat: 45.5, lng: -73.6 };
        let unset = Coordinates { lat: 0.0, lng: -73.6 };
        assert_eq!(distance_km(Some(&a), Some(&unset)), UNKNOWN_DISTANCE_KM);
    }
}
