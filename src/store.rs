// Data Store Collaborator - the interface the views load records through
//
// The aggregation layer never touches a store; callers read snapshots here
// and pass them in. Reads report not-found as Ok(None) / empty, never as an
// error; errors are reserved for genuine store failures.

use crate::entities::{Contribution, Traveler, Trip};
use anyhow::{bail, Result};

pub trait TripStore {
    /// The single admin-flow trip, if one has been created.
    fn get_trip(&self) -> Result<Option<Trip>>;

    /// A trip by id (public share links address trips this way).
    fn get_trip_by_id(&self, trip_id: &str) -> Result<Option<Trip>>;

    fn insert_trip(&mut self, trip: &Trip) -> Result<()>;

    fn update_trip(&mut self, trip: &Trip) -> Result<()>;

    fn insert_traveler(&mut self, traveler: &Traveler) -> Result<()>;

    /// Travelers of a trip in created_at order (stable listing order).
    fn travelers_for_trip(&self, trip_id: &str) -> Result<Vec<Traveler>>;

    /// Returns false when an identical contribution already exists
    /// (content-hash duplicate), true when inserted.
    fn insert_contribution(&mut self, contribution: &Contribution) -> Result<bool>;

    fn update_contribution(&mut self, contribution: &Contribution) -> Result<()>;

    fn delete_contribution(&mut self, contribution_id: &str) -> Result<()>;

    /// Contributions of a trip, newest date first.
    fn contributions_for_trip(&self, trip_id: &str) -> Result<Vec<Contribution>>;
}

/// In-memory store for tests and for exercising callers without a database.
#[derive(Debug, Default)]
pub struct MemoryStore {
    trips: Vec<Trip>,
    travelers: Vec<Traveler>,
    contributions: Vec<Contribution>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl TripStore for MemoryStore {
    fn get_trip(&self) -> Result<Option<Trip>> {
        Ok(self.trips.first().cloned())
    }

    fn get_trip_by_id(&self, trip_id: &str) -> Result<Option<Trip>> {
        Ok(self.trips.iter().find(|t| t.id == trip_id).cloned())
    }

    fn insert_trip(&mut self, trip: &Trip) -> Result<()> {
        self.trips.push(trip.clone());
        Ok(())
    }

    fn update_trip(&mut self, trip: &Trip) -> Result<()> {
        match self.trips.iter_mut().find(|t| t.id == trip.id) {
            Some(existing) => {
                *existing = trip.clone();
                Ok(())
            }
            None => bail!("No trip with id '{}'", trip.id),
        }
    }

    fn insert_traveler(&mut self, traveler: &Traveler) -> Result<()> {
        self.travelers.push(traveler.clone());
        Ok(())
    }

    fn travelers_for_trip(&self, trip_id: &str) -> Result<Vec<Traveler>> {
        let mut travelers: Vec<Traveler> = self
            .travelers
            .iter()
            .filter(|t| t.trip_id == trip_id)
            .cloned()
            .collect();
        travelers.sort_by_key(|t| t.created_at);
        Ok(travelers)
    }

    fn insert_contribution(&mut self, contribution: &Contribution) -> Result<bool> {
        let hash = contribution.dedupe_hash();
        if self.contributions.iter().any(|c| c.dedupe_hash() == hash) {
            return Ok(false);
        }
        self.contributions.push(contribution.clone());
        Ok(true)
    }

    fn update_contribution(&mut self, contribution: &Contribution) -> Result<()> {
        match self
            .contributions
            .iter_mut()
            .find(|c| c.id == contribution.id)
        {
            Some(existing) => {
                *existing = contribution.clone();
                Ok(())
            }
            None => bail!("No contribution with id '{}'", contribution.id),
        }
    }

    fn delete_contribution(&mut self, contribution_id: &str) -> Result<()> {
        let before = self.contributions.len();
        self.contributions.retain(|c| c.id != contribution_id);
        if self.contributions.len() == before {
            bail!("No contribution with id '{}'", contribution_id);
        }
        Ok(())
    }

    fn contributions_for_trip(&self, trip_id: &str) -> Result<Vec<Contribution>> {
        let mut contributions: Vec<Contribution> = self
            .contributions
            .iter()
            .filter(|c| c.trip_id == trip_id)
            .cloned()
            .collect();
        contributions.sort_by(|a, b| b.date.cmp(&a.date));
        Ok(contributions)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn seed_trip(store: &mut MemoryStore) -> Trip {
        let trip = Trip::new(
            "Viaje".to_string(),
            "Cartagena".to_string(),
            "COP".to_string(),
            Some(1_000_000.0),
            None,
        );
        store.insert_trip(&trip).unwrap();
        trip
    }

    #[test]
    fn test_get_trip_not_found_is_none() {
        let store = MemoryStore::new();
        assert!(store.get_trip().unwrap().is_none());
        assert!(store.get_trip_by_id("missing").unwrap().is_none());
    }

    #[test]
    fn test_travelers_listed_in_insertion_order() {
        let mut store = MemoryStore::new();
        let trip = seed_trip(&mut store);

        for name in ["Ana", "Bruno", "Carla"] {
            store
                .insert_traveler(&Traveler::new(trip.id.clone(), name.to_string()))
                .unwrap();
        }

        let names: Vec<String> = store
            .travelers_for_trip(&trip.id)
            .unwrap()
            .into_iter()
            .map(|t| t.name)
            .collect();
        assert_eq!(names, vec!["Ana", "Bruno", "Carla"]);
    }

    #[test]
    fn test_duplicate_contribution_is_skipped() {
        let mut store = MemoryStore::new();
        let trip = seed_trip(&mut store);

        let c = Contribution::new(
            trip.id.clone(),
            "traveler-1".to_string(),
            200_000.0,
            date(2025, 3, 10),
            Some("cuota 1".to_string()),
        );
        assert!(store.insert_contribution(&c).unwrap());

        // Same content, fresh identity: still a duplicate
        let again = Contribution::new(
            trip.id.clone(),
            "traveler-1".to_string(),
            200_000.0,
            date(2025, 3, 10),
            Some("cuota 1".to_string()),
        );
        assert!(!store.insert_contribution(&again).unwrap());
        assert_eq!(store.contributions_for_trip(&trip.id).unwrap().len(), 1);
    }

    #[test]
    fn test_contributions_come_back_newest_first() {
        let mut store = MemoryStore::new();
        let trip = seed_trip(&mut store);

        for (amount, d) in [(1.0, date(2025, 1, 5)), (2.0, date(2025, 3, 1)), (3.0, date(2025, 2, 1))] {
            store
                .insert_contribution(&Contribution::new(
                    trip.id.clone(),
                    "traveler-1".to_string(),
                    amount,
                    d,
                    None,
                ))
                .unwrap();
        }

        let amounts: Vec<f64> = store
            .contributions_for_trip(&trip.id)
            .unwrap()
            .into_iter()
            .map(|c| c.amount)
            .collect();
        assert_eq!(amounts, vec![2.0, 3.0, 1.0]);
    }

    #[test]
    fn test_update_and_delete_missing_is_an_error() {
        let mut store = MemoryStore::new();
        let trip = seed_trip(&mut store);

        let mut orphan = Contribution::new(
            trip.id.clone(),
            "traveler-1".to_string(),
            100.0,
            date(2025, 1, 1),
            None,
        );
        orphan.id = "never-inserted".to_string();

        assert!(store.update_contribution(&orphan).is_err());
        assert!(store.delete_contribution("never-inserted").is_err());
    }
}
