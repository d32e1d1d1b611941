//! Service definition types

use chrono::Duration;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use crate::defaults::{DEFAULT_MIN_TECHNICIANS, DEFAULT_SERVICE_DURATION_MINUTES};

/// A bookable service
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct ServiceDefinition {
    pub id: Uuid,
    pub duration_minutes: Option<i32>,
    /// Accepted but not enforced by the scorers
    pub min_technicians: Option<i32>,
}

impl ServiceDefinition {
    pub fn duration_minutes(&self) -> i64 {
        match self.duration_minutes {
            Some(minutes) if minutes > 0 => minutes as i64,
            _ => DEFAULT_SERVICE_DURATION_MINUTES,
        }
    }

    pub fn duration(&self) -> Duration {
        Duration::minutes(self.duration_minutes())
    }

    pub fn min_technician_count(&self) -> i32 {
        self.min_technicians.filter(|n| *n > 0).unwrap_or(DEFAULT_MIN_TECHNICIANS)
    }
}
