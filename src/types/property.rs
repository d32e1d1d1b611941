//! Property location types

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use crate::services::geo::is_known;

/// Coordinates
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Coordinates {
    pub lat: f64,
    pub lng: f64,
}

impl Coordinates {
    pub fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }
}

/// Location of a client property. Coordinates stay empty until geocoded.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct PropertyLocation {
    pub id: Uuid,
    pub lat: Option<f64>,
    pub lng: Option<f64>,
    /// Free-form address used when coordinates must be resolved
    pub address: Option<String>,
}

impl PropertyLocation {
    /// Resolved coordinates. A missing component or the stored zero
    /// sentinel means the property has not been located.
    pub fn coordinates(&self) -> Option<Coordinates> {
        match (self.lat, self.lng) {
            (Some(lat), Some(lng)) => Some(Coordinates { lat, lng }).filter(is_known),
            _ => None,
        }
    }

    pub fn set_coordinates(&mut self, coordinates: Coordinates) {
        self.lat = Some(coordinates.lat);
        self.lng = Some(coordinates.lng);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_coordinates_require_both_components() {
        let mut property = PropertyLocation {
            id: Uuid::nil(),
            lat: Some(45.5),
            lng: None,
            address: None,
        };
        assert!(property.coordinates().is_none());

        property.set_coordinates(Coordinates::new(45.5, -73.6));
        assert_eq!(property.coordinates(), Some(Coordinates::new(45.5, -73.6)));
    }

    #[test]
    fn test_zero_sentinel_is_not_a_location() {
        let mut property = PropertyLocation {
            id: Uuid::nil(),
            lat: Some(0.0),
            lng: Some(0.0),
            address: None,
        };
        assert!(property.coordinates().is_none());

        property.lat = Some(45.5);
        assert!(property.coordinates().is_none(), "zero longitude is still unset");

        property.lng = Some(f64::NAN);
        assert!(property.coordinates().is_none());
    }
}
