//! Slot search types

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Request for the 7-day grid search
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FindSlotsRequest {
    pub service_id: Uuid,
    /// Unknown for guest bookings
    #[serde(default)]
    pub property_id: Option<Uuid>,
    pub search_start_date: NaiveDate,
}

/// Request for the single-day gap search
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FindGapSlotsRequest {
    pub date: NaiveDate,
    pub target_lat: f64,
    pub target_lng: f64,
    pub duration_minutes: i64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CandidateKind {
    /// A real, bookable slot
    Slot,
    /// Synthetic entry explaining why nothing is bookable
    Placeholder,
}

/// How a result list's scores must be read.
///
/// The grid scorer produces goodness (higher is better) and the gap scorer
/// produces detour cost in km (lower is better). The two are not comparable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScorePolarity {
    HigherIsBetter,
    LowerIsBetter,
}

/// A hypothetical appointment, not yet committed
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SlotCandidate {
    pub kind: CandidateKind,
    pub date: NaiveDate,
    /// Local wall-clock label, `HH:MM`
    pub time: String,
    pub starts_at: Option<DateTime<Utc>>,
    pub technician_id: Option<Uuid>,
    pub technician_name: String,
    pub score: f64,
    pub reason: String,
}

impl SlotCandidate {
    pub fn is_placeholder(&self) -> bool {
        self.kind == CandidateKind::Placeholder
    }
}

/// Bookkeeping counters for one search
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchDiagnostics {
    pub evaluated: usize,
    pub rejected_past: usize,
    pub rejected_conflict: usize,
    pub emitted: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SlotSearchResult {
    pub slots: Vec<SlotCandidate>,
    pub polarity: ScorePolarity,
    pub diagnostics: SearchDiagnostics,
}
