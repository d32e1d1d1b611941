//! Technician types

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// A technician who can be booked. Read-only to the scheduler.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Technician {
    pub id: Uuid,
    pub display_name: String,
    pub active: bool,
}

impl Technician {
    pub fn new(id: Uuid, display_name: impl Into<String>) -> Self {
        Self {
            id,
            display_name: display_name.into(),
            active: true,
        }
    }
}
