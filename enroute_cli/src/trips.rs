use std::path::PathBuf;

use clap::Args;
use enroute_trips::{JsonFileStore, Role, Trip, TripLedger};

use crate::parsers;

#[derive(Args)]
pub struct TripsArgs {
    /// Folder holding the persisted values
    #[arg(short, long)]
    store: PathBuf,

    /// Only list trips taken in this role (driver or rider)
    #[arg(short, long, value_parser = parsers::parse_role)]
    role: Option<Role>,

    /// Print the trips as JSON
    #[arg(long)]
    json: bool,
}

pub fn run(args: TripsArgs) -> Result<(), anyhow::Error> {
    let store = JsonFileStore::open(&args.store)?;
    let ledger = TripLedger::open(store)?;
    let history = ledger.history();

    let trips: Vec<&Trip> = match args.role {
        Some(role) => history.by_role(role).collect(),
        None => history.iter().collect(),
    };

    if args.json {
        println!("{}", serde_json::to_string_pretty(&trips)?);
        return Ok(());
    }

    for trip in &trips {
        println!(
            "{} {} {:>6} {:>7.2} km {:>4} min  {} -> {}",
            trip.date,
            trip.start_time.strftime("%H:%M"),
            role_label(trip.role),
            trip.distance_km,
            trip.duration_min,
            trip.start_location,
            trip.end_location,
        );
    }

    let distance_km: f64 = trips.iter().map(|trip| trip.distance_km).sum();
    let duration_min: u64 = trips.iter().map(|trip| u64::from(trip.duration_min)).sum();
    println!(
        "{} trips, {:.2} km, {} min",
        trips.len(),
        distance_km,
        duration_min
    );

    Ok(())
}

fn role_label(role: Role) -> &'static str {
    match role {
        Role::Driver => "driver",
        Role::Rider => "rider",
    }
}
