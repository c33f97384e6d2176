// Traveler Entity - a participant contributing toward a Trip's goal

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Traveler {
    /// Stable identity (uuid) - never changes
    pub id: String,

    /// Owning trip.
    pub trip_id: String,

    /// Display name. Non-empty; enforced at the form boundary.
    pub name: String,

    /// Insertion timestamp. Used only for stable listing order.
    pub created_at: DateTime<Utc>,
}

impl Traveler {
    pub fn new(trip_id: String, name: String) -> Self {
        Traveler {
            id: uuid::Uuid::new_v4().to_string(),
            trip_id,
            name,
            created_at: Utc::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_traveler_belongs_to_trip() {
        let traveler = Traveler::new("trip-1".to_string(), "Ana".to_string());

        assert!(!traveler.id.is_empty());
        assert_eq!(traveler.trip_id, "trip-1");
        assert_eq!(traveler.name, "Ana");
    }
}
