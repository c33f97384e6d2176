// Contribution Entity - one dated monetary amount attributed to a Traveler
//
// Dates are calendar dates (NaiveDate) with no time-of-day semantics, so
// comparisons can never shift across a time zone.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Contribution {
    /// Stable identity (uuid) - never changes
    pub id: String,

    /// Owning trip.
    pub trip_id: String,

    /// Traveler this amount is attributed to. Must reference a traveler of
    /// the same trip; the store enforces this, the aggregation layer only
    /// tolerates dangling references (excluded, never a failure).
    pub traveler_id: String,

    /// Amount in the trip currency. Positive; enforced at the form boundary.
    pub amount: f64,

    /// Calendar date of the contribution.
    pub date: NaiveDate,

    /// Optional free-text note, e.g. "Pago cuota 1".
    pub note: Option<String>,
}

impl Contribution {
    pub fn new(
        trip_id: String,
        traveler_id: String,
        amount: f64,
        date: NaiveDate,
        note: Option<String>,
    ) -> Self {
        Contribution {
            id: uuid::Uuid::new_v4().to_string(),
            trip_id,
            traveler_id,
            amount,
            date,
            note,
        }
    }

    /// Content hash for duplicate detection on insert.
    /// NOTE: this is for DEDUPLICATION, not identity - identity is `id`.
    pub fn dedupe_hash(&self) -> String {
        let mut hasher = Sha256::new();
        hasher.update(format!(
            "{}{}{}{}{}",
            self.trip_id,
            self.traveler_id,
            self.amount,
            self.date,
            self.note.as_deref().unwrap_or("")
        ));
        format!("{:x}", hasher.finalize())
    }
}
