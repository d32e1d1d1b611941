//! Result ordering and placeholder results

use chrono::NaiveDate;

use crate::types::{CandidateKind, ScorePolarity, SearchDiagnostics, SlotCandidate};

/// Best first according to `polarity`. Ties keep generation order.
pub fn rank(slots: &mut [SlotCandidate], polarity: ScorePolarity) {
    match polarity {
        ScorePolarity::HigherIsBetter => slots.sort_by(|a, b| b.score.total_cmp(&a.score)),
        ScorePolarity::LowerIsBetter => slots.sort_by(|a, b| a.score.total_cmp(&b.score)),
    }
}

fn placeholder(date: NaiveDate, reason: String) -> SlotCandidate {
    SlotCandidate {
        kind: CandidateKind::Placeholder,
        date,
        time: String::new(),
        starts_at: None,
        technician_id: None,
        technician_name: String::new(),
        score: 0.0,
        reason,
    }
}

pub fn no_technicians(date: NaiveDate) -> SlotCandidate {
    placeholder(
        date,
        "No active technicians are configured. Activate a technician to offer appointments.".to_string(),
    )
}

pub fn fully_booked(date: NaiveDate, days: u32, diagnostics: &SearchDiagnostics) -> SlotCandidate {
    let span = if days == 1 {
        format!("on {}", date)
    } else {
        format!("in the {} days from {}", days, date)
    };
    placeholder(
        date,
        format!(
            "Fully booked: no availability {} ({} time slots checked, {} already past, {} conflicting)",
            span, diagnostics.evaluated, diagnostics.rejected_past, diagnostics.rejected_conflict
        ),
    )
}
