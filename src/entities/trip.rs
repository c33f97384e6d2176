// Trip Entity - the single savings goal being tracked
//
// Identity: uuid (never changes)
// Values: name, destination, currency, target, date (can change via update)

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// The savings goal entity. Exactly one Trip exists per deployment in the
/// admin flow; the public flow addresses a Trip by id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Trip {
    /// Stable identity (uuid) - never changes
    pub id: String,

    /// Display name, e.g. "Viaje a Cartagena 2025"
    pub name: String,

    /// Destination, e.g. "Cartagena, Colombia"
    pub destination: String,

    /// ISO-4217-like currency code. Free-form string; display formatting
    /// falls back to "<code> <amount>" for codes it does not recognize.
    pub currency: String,

    /// Savings goal in the trip currency. None means progress is tracked
    /// without a percentage goal.
    pub target_amount: Option<f64>,

    /// Planned travel date, if known.
    pub trip_date: Option<NaiveDate>,

    /// Insertion timestamp.
    pub created_at: DateTime<Utc>,
}

impl Trip {
    pub fn new(
        name: String,
        destination: String,
        currency: String,
        target_amount: Option<f64>,
        trip_date: Option<NaiveDate>,
    ) -> Self {
        Trip {
            id: uuid::Uuid::new_v4().to_string(),
            name,
            destination,
            currency,
            target_amount,
            trip_date,
            created_at: Utc::now(),
        }
    }

    /// Whether the trip has a usable savings goal (present and positive).
    pub fn has_target(&self) -> bool {
        matches!(self.target_amount, Some(t) if t > 0.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_trip_gets_identity() {
        let trip = Trip::new(
            "Viaje a Cartagena".to_string(),
            "Cartagena, Colombia".to_string(),
            "COP".to_string(),
            Some(5_000_000.0),
            None,
        );

        assert!(!trip.id.is_empty());
        assert!(trip.has_target());
    }

    #[test]
    fn test_has_target_rejects_absent_and_zero() {
        let mut trip = Trip::new(
            "Trip".to_string(),
            "Anywhere".to_string(),
            "USD".to_string(),
            None,
            None,
        );
        assert!(!trip.has_target());

        trip.target_amount = Some(0.0);
        assert!(!trip.has_target());
    }
}
