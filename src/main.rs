use anyhow::{anyhow, bail, Result};
use std::env;
use std::fs;
use std::path::PathBuf;

use trip_savings::{
    export_file_name, to_export_rows, write_csv, ContributionForm, DashboardView, SqliteStore,
    TravelerForm, TripForm, TripStore, ValidationError,
};

fn main() -> Result<()> {
    let args: Vec<String> = env::args().collect();
    let command = args.get(1).map(|s| s.as_str()).unwrap_or("show");

    match command {
        "init" => run_init(&args[2..]),
        "add-traveler" => run_add_traveler(&args[2..]),
        "add-contribution" => run_add_contribution(&args[2..]),
        "show" => run_show(),
        "export" => run_export(args.get(2).map(PathBuf::from)),
        other => {
            eprintln!("Unknown command: {}", other);
            eprintln!();
            eprintln!("Usage:");
            eprintln!("  trip-savings init <name> <destination> [currency] [target] [date]");
            eprintln!("  trip-savings add-traveler <name>");
            eprintln!("  trip-savings add-contribution <traveler> <amount> <date> [note]");
            eprintln!("  trip-savings show");
            eprintln!("  trip-savings export [path]");
            std::process::exit(2);
        }
    }
}

fn db_path() -> PathBuf {
    env::var("TRIP_DB")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("trip-savings.db"))
}

fn open_store() -> Result<SqliteStore> {
    SqliteStore::open(&db_path())
}

fn report_validation(errors: Vec<ValidationError>) -> anyhow::Error {
    for error in &errors {
        eprintln!("  ✗ {}", error);
    }
    anyhow!("Invalid input ({} problem(s))", errors.len())
}

fn run_init(args: &[String]) -> Result<()> {
    if args.len() < 2 {
        bail!("Usage: trip-savings init <name> <destination> [currency] [target] [date]");
    }

    let mut store = open_store()?;
    if store.get_trip()?.is_some() {
        bail!("A trip already exists; this tracker holds exactly one");
    }

    let form = TripForm {
        name: args[0].clone(),
        destination: args[1].clone(),
        currency: args.get(2).cloned().unwrap_or_else(|| "COP".to_string()),
        target_amount: args.get(3).cloned().unwrap_or_default(),
        trip_date: args.get(4).cloned().unwrap_or_default(),
    };

    let trip = form.build().map_err(report_validation)?;
    store.insert_trip(&trip)?;

    println!("✓ Trip created: {} → {}", trip.name, trip.destination);
    println!("  id: {}", trip.id);
    Ok(())
}

fn run_add_traveler(args: &[String]) -> Result<()> {
    if args.is_empty() {
        bail!("Usage: trip-savings add-traveler <name>");
    }

    let mut store = open_store()?;
    let trip = store
        .get_trip()?
        .ok_or_else(|| anyhow!("No trip yet; run `trip-savings init` first"))?;

    let form = TravelerForm {
        name: args[0].clone(),
    };
    let traveler = form.build(&trip.id).map_err(report_validation)?;
    store.insert_traveler(&traveler)?;

    println!("✓ Traveler added: {}", traveler.name);
    Ok(())
}

fn run_add_contribution(args: &[String]) -> Result<()> {
    if args.len() < 3 {
        bail!("Usage: trip-savings add-contribution <traveler> <amount> <date> [note]");
    }

    let mut store = open_store()?;
    let trip = store
        .get_trip()?
        .ok_or_else(|| anyhow!("No trip yet; run `trip-savings init` first"))?;
    let travelers = store.travelers_for_trip(&trip.id)?;

    let traveler = travelers
        .iter()
        .find(|t| t.name == args[0])
        .ok_or_else(|| anyhow!("No traveler named '{}' on this trip", args[0]))?;

    let form = ContributionForm {
        traveler_id: traveler.id.clone(),
        amount: args[1].clone(),
        date: args[2].clone(),
        note: args.get(3).cloned().unwrap_or_default(),
    };

    let contribution = form.build(&trip.id, &travelers).map_err(report_validation)?;
    if store.insert_contribution(&contribution)? {
        println!(
            "✓ Contribution recorded: {} on {}",
            trip_savings::format_currency(contribution.amount, &trip.currency),
            contribution.date
        );
    } else {
        println!("✓ Skipped: an identical contribution is already recorded");
    }
    Ok(())
}

fn run_show() -> Result<()> {
    let store = open_store()?;
    let trip = store
        .get_trip()?
        .ok_or_else(|| anyhow!("No trip yet; run `trip-savings init` first"))?;
    let travelers = store.travelers_for_trip(&trip.id)?;
    let contributions = store.contributions_for_trip(&trip.id)?;

    let view = DashboardView::build(&trip, &travelers, &contributions);

    println!("{} — {}", trip.name, trip.destination);
    if let Some(date) = &view.trip_date_display {
        println!("Trip date: {}", date);
    }
    println!();
    println!("Total saved: {}", view.total_saved_display);
    if let Some(target) = &view.target_display {
        println!("Goal:        {}", target);
        println!("Progress:    {:.1}%", view.progress_percent);
        if view.goal_reached {
            println!("Goal reached!");
        }
    }

    println!();
    println!("Travelers");
    if view.traveler_totals.is_empty() {
        println!("  (none yet)");
    }
    for row in &view.traveler_totals {
        println!(
            "  {:<20} {:>15}  {:>5.1}%",
            row.traveler.name,
            trip_savings::format_currency(row.total, &trip.currency),
            row.share_percent
        );
    }

    println!();
    println!("History");
    if view.history.is_empty() {
        println!("  (none yet)");
    }
    for entry in &view.history {
        let note = entry
            .contribution
            .note
            .as_deref()
            .map(|n| format!("  ({})", n))
            .unwrap_or_default();
        println!(
            "  {}  {:<20} +{}{}",
            entry.date_display,
            entry.display_name(),
            entry.amount_display,
            note
        );
    }

    Ok(())
}

fn run_export(out_path: Option<PathBuf>) -> Result<()> {
    let store = open_store()?;
    let trip = store
        .get_trip()?
        .ok_or_else(|| anyhow!("No trip yet; run `trip-savings init` first"))?;
    let travelers = store.travelers_for_trip(&trip.id)?;
    let contributions = store.contributions_for_trip(&trip.id)?;

    let rows = to_export_rows(&travelers, &contributions);
    let csv_text = write_csv(&rows)?;

    let path = out_path.unwrap_or_else(|| PathBuf::from(export_file_name(&trip)));
    fs::write(&path, csv_text)?;

    println!("✓ Exported {} contribution(s) to {:?}", contributions.len(), path);
    Ok(())
}
