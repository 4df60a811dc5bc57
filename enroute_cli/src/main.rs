use std::time::Duration;

use clap::{Parser, Subcommand};
use enroute_geo::{Coordinate, INTER_CITY_SPEED_KMH, distance_km, eta_minutes};
use enroute_routing::{RouteProviderChain, RouteResult, RoutingConfig, config::parse_duration};
use enroute_trips::Rendezvous;
use serde::Serialize;
use tracing::info;

use crate::trips::TripsArgs;

mod parsers;
mod trips;

#[derive(Parser)]
#[clap(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    #[arg(short, long)]
    debug: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Route from the driver to the rider, falling back to an offline estimate
    Route {
        /// Driver position as "lat,lon" (defaults to the Kenitra demo driver)
        #[arg(long, value_parser = parsers::parse_coordinate)]
        from: Option<Coordinate>,

        /// Rider position as "lat,lon" (defaults to the Kenitra demo rider)
        #[arg(long, value_parser = parsers::parse_coordinate)]
        to: Option<Coordinate>,

        /// Per-provider timeout (e.g., "5s", "PT8S"), overrides the environment
        #[arg(long, value_parser = parse_duration)]
        timeout: Option<Duration>,
    },
    /// Straight-line ETA from the driver to the rider
    Eta {
        #[arg(long, value_parser = parsers::parse_coordinate)]
        from: Option<Coordinate>,

        #[arg(long, value_parser = parsers::parse_coordinate)]
        to: Option<Coordinate>,

        /// Average speed in km/h
        #[arg(long, default_value_t = INTER_CITY_SPEED_KMH, value_parser = parsers::parse_speed)]
        speed: f64,
    },
    /// List persisted trips
    Trips {
        #[command(flatten)]
        args: TripsArgs,
    },
}

#[derive(Serialize)]
struct RouteOutput {
    route: RouteResult,
    rendezvous: Rendezvous,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct EtaOutput {
    distance_km: f64,
    speed_kmh: f64,
    eta_minutes: u32,
}

#[tokio::main]
async fn main() -> Result<(), anyhow::Error> {
    dotenvy::from_filename("./.env.local").ok();

    let cli = Cli::parse();
    tracing_subscriber::fmt()
        .with_max_level(if cli.debug {
            tracing::Level::DEBUG
        } else {
            tracing::Level::INFO
        })
        .init();

    match cli.command {
        Some(Commands::Route { from, to, timeout }) => {
            let mut config = RoutingConfig::from_env();
            if let Some(timeout) = timeout {
                config.request_timeout = timeout;
            }

            let mut rendezvous = rendezvous(from, to);
            let (driver, rider) = endpoints(&rendezvous)?;
            info!(
                "straight-line estimate: {:?} min",
                rendezvous.estimated_minutes()
            );

            let chain = RouteProviderChain::from_config(&config)?;
            let route = chain.get_route(driver, rider).await;
            info!(
                "{:?} route: {:.2} km, {} min",
                route.source_tag, route.distance_km, route.duration_min
            );
            rendezvous.set_estimated_minutes(route.duration_min);

            let output = RouteOutput { route, rendezvous };
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
        Some(Commands::Eta { from, to, speed }) => {
            let (from, to) = endpoints(&rendezvous(from, to))?;
            let distance_km = distance_km(from, to);
            let output = EtaOutput {
                distance_km,
                speed_kmh: speed,
                eta_minutes: eta_minutes(distance_km, speed)?,
            };

            println!("{}", serde_json::to_string_pretty(&output)?);
        }
        Some(Commands::Trips { args }) => trips::run(args)?,
        None => {
            info!("nothing to do, see --help");
        }
    }

    Ok(())
}

/// The Kenitra demo pair, with either end replaced by the position given on the command line.
fn rendezvous(driver: Option<Coordinate>, rider: Option<Coordinate>) -> Rendezvous {
    let mut rendezvous = Rendezvous::kenitra();
    if let Some(driver) = driver {
        rendezvous.update_driver(driver);
    }
    if let Some(rider) = rider {
        rendezvous.update_rider(rider);
    }
    rendezvous
}

fn endpoints(rendezvous: &Rendezvous) -> Result<(Coordinate, Coordinate), anyhow::Error> {
    rendezvous
        .endpoints()
        .ok_or_else(|| anyhow::anyhow!("driver and rider positions are both required"))
}
