// Trip Savings Tracker - Core Library
// Exposes all modules for use in the CLI, API server, and tests

pub mod entities;
pub mod schema;     // Form boundary - parse and validate raw input once
pub mod aggregate;  // Contribution Aggregation & Progress Model
pub mod format;     // Currency and date display strings
pub mod export;     // CSV export rows and serialization
pub mod store;      // TripStore collaborator interface + MemoryStore
pub mod db;         // SqliteStore - rusqlite-backed TripStore
pub mod auth;       // AuthProvider collaborator interface + StaticAuth

// Re-export commonly used types
pub use entities::{Contribution, Traveler, Trip};
pub use schema::{
    ContributionFields, ContributionForm, TravelerForm, TripFields, TripForm,
    ValidationError, ValidationResult,
};
pub use aggregate::{
    bar_fill_percent, participation_share, progress_percent, sorted_by_date_desc,
    total_saved, traveler_totals, DashboardView, HistoryEntry, TravelerTotal,
    UNKNOWN_TRAVELER,
};
pub use format::{amount_field, format_currency, format_date};
pub use export::{export_file_name, to_export_rows, write_csv, ExportRow, EXPORT_HEADER};
pub use store::{MemoryStore, TripStore};
pub use db::{setup_database, SqliteStore};
pub use auth::{AuthProvider, Session, StaticAuth};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
