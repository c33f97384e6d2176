// SQLite Store - rusqlite-backed TripStore
//
// WAL mode for crash recovery, parameterized statements throughout, and a
// content-hash unique column so re-inserting an identical contribution is
// skipped instead of doubled.

use crate::entities::{Contribution, Traveler, Trip};
use crate::store::TripStore;
use anyhow::{anyhow, bail, Context, Result};
use chrono::{DateTime, NaiveDate, Utc};
use rusqlite::{params, Connection};
use std::path::Path;

pub struct SqliteStore {
    conn: Connection,
}

impl SqliteStore {
    /// Open (or create) the database at `path` and ensure the schema exists.
    pub fn open(path: &Path) -> Result<Self> {
        let conn = Connection::open(path)
            .with_context(|| format!("Failed to open database at {:?}", path))?;
        setup_database(&conn)?;
        Ok(SqliteStore { conn })
    }

    /// Fresh in-memory database. Used by tests.
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory().context("Failed to open in-memory database")?;
        setup_database(&conn)?;
        Ok(SqliteStore { conn })
    }
}

pub fn setup_database(conn: &Connection) -> Result<()> {
    // WAL mode for crash recovery
    conn.pragma_update(None, "journal_mode", "WAL")?;
    conn.pragma_update(None, "foreign_keys", "ON")?;

    conn.execute(
        "CREATE TABLE IF NOT EXISTS trips (
            id TEXT PRIMARY KEY,
            name TEXT NOT NULL,
            destination TEXT NOT NULL,
            currency TEXT NOT NULL,
            target_amount REAL,
            trip_date TEXT,
            created_at TEXT NOT NULL
        )",
        [],
    )?;

    conn.execute(
        "CREATE TABLE IF NOT EXISTS travelers (
            id TEXT PRIMARY KEY,
            trip_id TEXT NOT NULL REFERENCES trips(id),
            name TEXT NOT NULL,
            created_at TEXT NOT NULL
        )",
        [],
    )?;

    conn.execute(
        "CREATE TABLE IF NOT EXISTS contributions (
            id TEXT PRIMARY KEY,
            dedupe_hash TEXT UNIQUE NOT NULL,
            trip_id TEXT NOT NULL REFERENCES trips(id),
            traveler_id TEXT NOT NULL,
            amount REAL NOT NULL,
            date TEXT NOT NULL,
            note TEXT
        )",
        [],
    )?;

    conn.execute(
        "CREATE INDEX IF NOT EXISTS idx_travelers_trip ON travelers(trip_id, created_at)",
        [],
    )?;

    conn.execute(
        "CREATE INDEX IF NOT EXISTS idx_contributions_trip ON contributions(trip_id)",
        [],
    )?;

    conn.execute(
        "CREATE INDEX IF NOT EXISTS idx_contributions_date ON contributions(date)",
        [],
    )?;

    Ok(())
}

fn parse_timestamp(raw: &str) -> Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| anyhow!("Bad timestamp '{}' in database: {}", raw, e))
}

fn parse_date(raw: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .map_err(|e| anyhow!("Bad date '{}' in database: {}", raw, e))
}

fn trip_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<(Trip, String, Option<String>)> {
    let trip = Trip {
        id: row.get(0)?,
        name: row.get(1)?,
        destination: row.get(2)?,
        currency: row.get(3)?,
        target_amount: row.get(4)?,
        trip_date: None,
        created_at: Utc::now(),
    };
    let created_at: String = row.get(6)?;
    let trip_date: Option<String> = row.get(5)?;
    Ok((trip, created_at, trip_date))
}

fn finish_trip(raw: (Trip, String, Option<String>)) -> Result<Trip> {
    let (mut trip, created_at, trip_date) = raw;
    trip.created_at = parse_timestamp(&created_at)?;
    trip.trip_date = trip_date.as_deref().map(parse_date).transpose()?;
    Ok(trip)
}

const TRIP_COLUMNS: &str = "id, name, destination, currency, target_amount, trip_date, created_at";

impl TripStore for SqliteStore {
    fn get_trip(&self) -> Result<Option<Trip>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {} FROM trips ORDER BY created_at LIMIT 1",
            TRIP_COLUMNS
        ))?;
        let mut rows = stmt.query_map([], trip_from_row)?;
        match rows.next() {
            Some(row) => Ok(Some(finish_trip(row?)?)),
            None => Ok(None),
        }
    }

    fn get_trip_by_id(&self, trip_id: &str) -> Result<Option<Trip>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {} FROM trips WHERE id = ?1",
            TRIP_COLUMNS
        ))?;
        let mut rows = stmt.query_map(params![trip_id], trip_from_row)?;
        match rows.next() {
            Some(row) => Ok(Some(finish_trip(row?)?)),
            None => Ok(None),
        }
    }

    fn insert_trip(&mut self, trip: &Trip) -> Result<()> {
        self.conn.execute(
            "INSERT INTO trips (id, name, destination, currency, target_amount, trip_date, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            params![
                trip.id,
                trip.name,
                trip.destination,
                trip.currency,
                trip.target_amount,
                trip.trip_date.map(|d| d.format("%Y-%m-%d").to_string()),
                trip.created_at.to_rfc3339(),
            ],
        )?;
        Ok(())
    }

    fn update_trip(&mut self, trip: &Trip) -> Result<()> {
        let affected = self.conn.execute(
            "UPDATE trips SET name = ?2, destination = ?3, currency = ?4,
                    target_amount = ?5, trip_date = ?6
             WHERE id = ?1",
            params![
                trip.id,
                trip.name,
                trip.destination,
                trip.currency,
                trip.target_amount,
                trip.trip_date.map(|d| d.format("%Y-%m-%d").to_string()),
            ],
        )?;
        if affected == 0 {
            bail!("No trip with id '{}'", trip.id);
        }
        Ok(())
    }

    fn insert_traveler(&mut self, traveler: &Traveler) -> Result<()> {
        self.conn.execute(
            "INSERT INTO travelers (id, trip_id, name, created_at) VALUES (?1, ?2, ?3, ?4)",
            params![
                traveler.id,
                traveler.trip_id,
                traveler.name,
                traveler.created_at.to_rfc3339(),
            ],
        )?;
        Ok(())
    }

    fn travelers_for_trip(&self, trip_id: &str) -> Result<Vec<Traveler>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, trip_id, name, created_at FROM travelers
             WHERE trip_id = ?1 ORDER BY created_at",
        )?;
        let rows = stmt.query_map(params![trip_id], |row| {
            Ok((
                Traveler {
                    id: row.get(0)?,
                    trip_id: row.get(1)?,
                    name: row.get(2)?,
                    created_at: Utc::now(),
                },
                row.get::<_, String>(3)?,
            ))
        })?;

        let mut travelers = Vec::new();
        for row in rows {
            let (mut traveler, created_at) = row?;
            traveler.created_at = parse_timestamp(&created_at)?;
            travelers.push(traveler);
        }
        Ok(travelers)
    }

    fn insert_contribution(&mut self, contribution: &Contribution) -> Result<bool> {
        let result = self.conn.execute(
            "INSERT INTO contributions (id, dedupe_hash, trip_id, traveler_id, amount, date, note)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            params![
                contribution.id,
                contribution.dedupe_hash(),
                contribution.trip_id,
                contribution.traveler_id,
                contribution.amount,
                contribution.date.format("%Y-%m-%d").to_string(),
                contribution.note,
            ],
        );

        match result {
            Ok(_) => Ok(true),
            Err(rusqlite::Error::SqliteFailure(err, _))
                if err.code == rusqlite::ErrorCode::ConstraintViolation =>
            {
                // Identical content already recorded
                Ok(false)
            }
            Err(e) => Err(e.into()),
        }
    }

    fn update_contribution(&mut self, contribution: &Contribution) -> Result<()> {
        let affected = self.conn.execute(
            "UPDATE contributions SET dedupe_hash = ?2, traveler_id = ?3, amount = ?4,
                    date = ?5, note = ?6
             WHERE id = ?1",
            params![
                contribution.id,
                contribution.dedupe_hash(),
                contribution.traveler_id,
                contribution.amount,
                contribution.date.format("%Y-%m-%d").to_string(),
                contribution.note,
            ],
        )?;
        if affected == 0 {
            bail!("No contribution with id '{}'", contribution.id);
        }
        Ok(())
    }

    fn delete_contribution(&mut self, contribution_id: &str) -> Result<()> {
        let affected = self.conn.execute(
            "DELETE FROM contributions WHERE id = ?1",
            params![contribution_id],
        )?;
        if affected == 0 {
            bail!("No contribution with id '{}'", contribution_id);
        }
        Ok(())
    }

    fn contributions_for_trip(&self, trip_id: &str) -> Result<Vec<Contribution>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, trip_id, traveler_id, amount, date, note FROM contributions
             WHERE trip_id = ?1 ORDER BY date DESC",
        )?;
        let rows = stmt.query_map(params![trip_id], |row| {
            Ok((
                Contribution {
                    id: row.get(0)?,
                    trip_id: row.get(1)?,
                    traveler_id: row.get(2)?,
                    amount: row.get(3)?,
                    date: NaiveDate::default(),
                    note: row.get(5)?,
                },
                row.get::<_, String>(4)?,
            ))
        })?;

        let mut contributions = Vec::new();
        for row in rows {
            let (mut contribution, date) = row?;
            contribution.date = parse_date(&date)?;
            contributions.push(contribution);
        }
        Ok(contributions)
    }
}
