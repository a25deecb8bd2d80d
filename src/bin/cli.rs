//! ridematch CLI - Debug tool for route matching
//!
//! Usage:
//!   ridematch-cli decode <polyline>
//!   ridematch-cli match <polyline> --pickup <lat,lng> --dropoff <lat,lng> [--trip-km <km>]
//!
//! Prints the decoded route, or the match decision and passenger segment, as
//! JSON so a stored driver route can be checked against a reported request.

use std::io::Write;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use ridematch::{polyline, GeoPoint, MatchConfig, RideMatcher, RideOffer, RideRequest};
use serde_json::json;

#[derive(Parser)]
#[command(name = "ridematch-cli")]
#[command(about = "Debug tool for ride route matching", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose debug output
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Decode a polyline and print its points
    Decode {
        /// Encoded polyline
        encoded: String,
    },

    /// Match a pickup/dropoff request against a driver polyline
    Match {
        /// Encoded driver route
        encoded: String,

        /// Pickup as "lat,lng"
        #[arg(long, value_parser = parse_point, allow_hyphen_values = true)]
        pickup: GeoPoint,

        /// Dropoff as "lat,lng"
        #[arg(long, value_parser = parse_point, allow_hyphen_values = true)]
        dropoff: GeoPoint,

        /// Trip distance in km (defaults to the straight-line distance)
        #[arg(long)]
        trip_km: Option<f64>,

        /// Fixed acceptance threshold in meters
        #[arg(long)]
        threshold: Option<f64>,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .format(|buf, record| writeln!(buf, "[{:5}] {}", record.level(), record.args()))
        .init();

    let output = match cli.command {
        Commands::Decode { encoded } => {
            let points = polyline::decode(&encoded);
            json!({ "count": points.len(), "points": points })
        }
        Commands::Match {
            encoded,
            pickup,
            dropoff,
            trip_km,
            threshold,
        } => {
            let matcher = RideMatcher::with_config(MatchConfig {
                threshold_override_meters: threshold,
                ..MatchConfig::default()
            });

            let mut request = RideRequest::direct(pickup, dropoff);
            if let Some(km) = trip_km {
                request.trip_distance_km = km;
            }
            let offer = RideOffer {
                ride_id: "cli".to_string(),
                polyline: encoded,
            };

            match matcher.evaluate(&request, &offer) {
                Some(found) => json!({
                    "matched": true,
                    "threshold": matcher.config().threshold_for(request.trip_distance_km),
                    "result": found.result,
                    "segment": found.segment,
                    "segment_polyline": found.segment.encoded(),
                }),
                None => json!({
                    "matched": false,
                    "threshold": matcher.config().threshold_for(request.trip_distance_km),
                }),
            }
        }
    };

    match serde_json::to_string_pretty(&output) {
        Ok(text) => {
            println!("{}", text);
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("Error encoding output: {}", e);
            ExitCode::FAILURE
        }
    }
}

/// Parse a "lat,lng" pair.
fn parse_point(s: &str) -> Result<GeoPoint, String> {
    let (lat, lng) = s
        .split_once(',')
        .ok_or_else(|| format!("expected \"lat,lng\", got \"{}\"", s))?;
    let lat: f64 = lat.trim().parse().map_err(|e| format!("bad latitude: {}", e))?;
    let lng: f64 = lng.trim().parse().map_err(|e| format!("bad longitude: {}", e))?;
    let point = GeoPoint::new(lat, lng);
    if point.is_valid() {
        Ok(point)
    } else {
        Err(format!("coordinate out of range: {}", s))
    }
}
