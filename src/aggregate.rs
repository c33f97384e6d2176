// Contribution Aggregation & Progress Model
//
// Pure derivation of savings-progress state from immutable snapshots of a
// trip, its travelers, and its contributions. No I/O, no shared state,
// reentrant; callers fetch records first and render the result afterward.

use crate::entities::{Contribution, Traveler, Trip};
use crate::format::{format_currency, format_date};
use serde::Serialize;
use std::collections::HashMap;

/// Display sentinel for contributions whose traveler cannot be resolved.
pub const UNKNOWN_TRAVELER: &str = "Unknown";

/// Sum of all contribution amounts. Empty input sums to 0.
/// Dangling traveler references still count here; exclusion only applies
/// to per-traveler totals.
pub fn total_saved(contributions: &[Contribution]) -> f64 {
    contributions.iter().map(|c| c.amount).sum()
}

/// Percent of the savings goal reached. 0 when there is no usable goal
/// (absent or non-positive target). Deliberately unclamped - overshooting
/// the goal reads as more than 100.
pub fn progress_percent(total_saved: f64, target_amount: Option<f64>) -> f64 {
    match target_amount {
        Some(target) if target > 0.0 => (total_saved / target) * 100.0,
        _ => 0.0,
    }
}

/// A traveler's share of the total saved. 0 when nothing has been saved.
pub fn participation_share(traveler_total: f64, total_saved: f64) -> f64 {
    if total_saved > 0.0 {
        (traveler_total / total_saved) * 100.0
    } else {
        0.0
    }
}

/// Visual progress-bar fill. This is the only place progress is clamped;
/// the numeric percent shown next to the bar stays unclamped.
pub fn bar_fill_percent(progress: f64) -> f64 {
    progress.clamp(0.0, 100.0)
}

/// One row of the participant ranking.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TravelerTotal {
    pub traveler: Traveler,
    pub total: f64,
    pub share_percent: f64,
}

/// Per-traveler contribution totals, ranked descending. Every traveler
/// appears, zero-contributors included. Ties keep the travelers' input
/// order (stable sort). Contributions referencing an unknown traveler_id
/// are excluded from every row without error.
pub fn traveler_totals(
    travelers: &[Traveler],
    contributions: &[Contribution],
) -> Vec<TravelerTotal> {
    let mut sums: HashMap<&str, f64> = HashMap::new();
    for c in contributions {
        *sums.entry(c.traveler_id.as_str()).or_insert(0.0) += c.amount;
    }

    let total = total_saved(contributions);

    let mut rows: Vec<TravelerTotal> = travelers
        .iter()
        .map(|t| {
            let sum = sums.get(t.id.as_str()).copied().unwrap_or(0.0);
            TravelerTotal {
                traveler: t.clone(),
                total: sum,
                share_percent: participation_share(sum, total),
            }
        })
        .collect();

    // sort_by is stable: equal totals keep input order
    rows.sort_by(|a, b| b.total.total_cmp(&a.total));
    rows
}

/// Contributions newest-first. Stable: same-date entries keep input order.
/// Dates are compared as calendar dates, so ordering can never change
/// under a time-zone conversion.
pub fn sorted_by_date_desc(contributions: &[Contribution]) -> Vec<Contribution> {
    let mut sorted = contributions.to_vec();
    sorted.sort_by(|a, b| b.date.cmp(&a.date));
    sorted
}

/// One entry of the contribution history, ready to render.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HistoryEntry {
    pub contribution: Contribution,
    /// Resolved traveler name; None when the reference dangles.
    pub traveler_name: Option<String>,
    pub amount_display: String,
    pub date_display: String,
}

impl HistoryEntry {
    pub fn display_name(&self) -> &str {
        self.traveler_name.as_deref().unwrap_or(UNKNOWN_TRAVELER)
    }
}

/// Everything the admin and public views render, derived in one pass.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DashboardView {
    pub total_saved: f64,
    pub total_saved_display: String,
    /// Unclamped - 120.0 means the goal was overshot by 20%.
    pub progress_percent: f64,
    /// Clamped to [0, 100]; drives bar width only.
    pub bar_fill_percent: f64,
    pub goal_reached: bool,
    pub target_display: Option<String>,
    pub trip_date_display: Option<String>,
    pub traveler_totals: Vec<TravelerTotal>,
    pub history: Vec<HistoryEntry>,
}

impl DashboardView {
    pub fn build(trip: &Trip, travelers: &[Traveler], contributions: &[Contribution]) -> Self {
        let total = total_saved(contributions);
        let percent = progress_percent(total, trip.target_amount);

        let names: HashMap<&str, &str> = travelers
            .iter()
            .map(|t| (t.id.as_str(), t.name.as_str()))
            .collect();

        let history = sorted_by_date_desc(contributions)
            .into_iter()
            .map(|c| HistoryEntry {
                traveler_name: names.get(c.traveler_id.as_str()).map(|n| n.to_string()),
                amount_display: format_currency(c.amount, &trip.currency),
                date_display: format_date(c.date),
                contribution: c,
            })
            .collect();

        DashboardView {
            total_saved: total,
            total_saved_display: format_currency(total, &trip.currency),
            progress_percent: percent,
            bar_fill_percent: bar_fill_percent(percent),
            goal_reached: trip.has_target() && percent >= 100.0,
            target_display: trip
                .target_amount
                .filter(|t| *t > 0.0)
                .map(|t| format_currency(t, &trip.currency)),
            trip_date_display: trip.trip_date.map(format_date),
            traveler_totals: traveler_totals(travelers, contributions),
            history,
        }
    }
}

// ============================================================================
// TESTS
// ============================================================================
