// CSV Export - contribution history as a downloadable artifact
//
// Row construction is pure; serialization goes through the csv crate so
// names and notes containing commas, quotes, or newlines survive a
// round trip intact.

use crate::entities::{Contribution, Traveler, Trip};
use crate::format::amount_field;
use anyhow::{anyhow, Context, Result};
use std::collections::HashMap;

/// One export row: traveler, amount, date, note.
pub type ExportRow = [String; 4];

pub const EXPORT_HEADER: [&str; 4] = ["Traveler", "Amount", "Date", "Note"];

/// Header plus one row per contribution, in input order (callers typically
/// pass the date-descending history). A contribution whose traveler cannot
/// be resolved gets an empty name field rather than an error.
pub fn to_export_rows(travelers: &[Traveler], contributions: &[Contribution]) -> Vec<ExportRow> {
    let names: HashMap<&str, &str> = travelers
        .iter()
        .map(|t| (t.id.as_str(), t.name.as_str()))
        .collect();

    let mut rows = Vec::with_capacity(contributions.len() + 1);
    rows.push(EXPORT_HEADER.map(|h| h.to_string()));

    for c in contributions {
        rows.push([
            names
                .get(c.traveler_id.as_str())
                .map(|n| n.to_string())
                .unwrap_or_default(),
            amount_field(c.amount),
            c.date.format("%Y-%m-%d").to_string(),
            c.note.clone().unwrap_or_default(),
        ]);
    }

    rows
}

/// Serialize rows to CSV text (RFC 4180 quoting, UTF-8).
pub fn write_csv(rows: &[ExportRow]) -> Result<String> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    for row in rows {
        writer
            .write_record(row)
            .context("Failed to write CSV record")?;
    }
    let bytes = writer
        .into_inner()
        .map_err(|e| anyhow!("Failed to flush CSV writer: {}", e))?;
    String::from_utf8(bytes).context("CSV output was not valid UTF-8")
}

/// Download filename for a trip's export, e.g. "Viaje a Cartagena-contributions.csv".
pub fn export_file_name(trip: &Trip) -> String {
    format!("{}-contributions.csv", trip.name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn test_traveler(name: &str) -> Traveler {
        Traveler::new("trip-1".to_string(), name.to_string())
    }

    fn test_contribution(
        traveler_id: &str,
        amount: f64,
        d: NaiveDate,
        note: Option<&str>,
    ) -> Contribution {
        Contribution::new(
            "trip-1".to_string(),
            traveler_id.to_string(),
            amount,
            d,
            note.map(|n| n.to_string()),
        )
    }

    #[test]
    fn test_rows_header_and_order() {
        let travelers = vec![test_traveler("Ana"), test_traveler("Bruno")];
        let contributions = vec![
            test_contribution(&travelers[1].id, 250_000.0, date(2025, 2, 2), None),
            test_contribution(&travelers[0].id, 600_000.0, date(2025, 1, 5), Some("cuota 1")),
        ];

        let rows = to_export_rows(&travelers, &contributions);

        assert_eq!(rows.len(), 3);
        assert_eq!(rows[0], EXPORT_HEADER.map(|h| h.to_string()));
        // Input order preserved
        assert_eq!(rows[1], [
            "Bruno".to_string(),
            "250000".to_string(),
            "2025-02-02".to_string(),
            String::new(),
        ]);
        assert_eq!(rows[2][0], "Ana");
        assert_eq!(rows[2][3], "cuota 1");
    }

    #[test]
    fn test_unresolved_traveler_gets_empty_name() {
        let travelers = vec![test_traveler("Ana")];
        let contributions = vec![test_contribution("ghost", 100_000.0, date(2025, 1, 1), None)];

        let rows = to_export_rows(&travelers, &contributions);
        assert_eq!(rows[1][0], "");
        assert_eq!(rows[1][1], "100000");
    }

    #[test]
    fn test_csv_round_trip_with_commas_and_quotes() {
        let travelers = vec![test_traveler("Pérez, Ana \"Anita\"")];
        let contributions = vec![
            test_contribution(
                &travelers[0].id,
                600_000.0,
                date(2025, 1, 5),
                Some("cuota 1, la \"grande\""),
            ),
            test_contribution(&travelers[0].id, 1500.5, date(2025, 1, 6), None),
        ];

        let rows = to_export_rows(&travelers, &contributions);
        let csv_text = write_csv(&rows).unwrap();

        let mut reader = csv::ReaderBuilder::new()
            .has_headers(false)
            .from_reader(csv_text.as_bytes());
        let parsed: Vec<csv::StringRecord> =
            reader.records().collect::<Result<_, _>>().unwrap();

        assert_eq!(parsed.len(), rows.len());
        for (record, row) in parsed.iter().zip(rows.iter()) {
            for (field, expected) in record.iter().zip(row.iter()) {
                assert_eq!(field, expected);
            }
        }

        // Embedded comma and quotes recovered exactly
        assert_eq!(parsed[1].get(0).unwrap(), "Pérez, Ana \"Anita\"");
        assert_eq!(parsed[1].get(3).unwrap(), "cuota 1, la \"grande\"");
        assert_eq!(parsed[2].get(1).unwrap(), "1500.50");
    }

    #[test]
    fn test_export_file_name() {
        let trip = Trip::new(
            "Viaje a Cartagena".to_string(),
            "Cartagena".to_string(),
            "COP".to_string(),
            None,
            None,
        );
        assert_eq!(export_file_name(&trip), "Viaje a Cartagena-contributions.csv");
    }
}
