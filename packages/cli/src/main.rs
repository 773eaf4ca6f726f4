#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! CLI entry point for the tourist safety monitor.
//!
//! Evaluates single positions against a scenario's zones and route, prints
//! trip progress, exports map layers as `GeoJSON`, and replays a simulated
//! trip with optional LLM advisories.

mod simulate;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tourist_safety_geofence::{Coordinate, evaluate, format_eta, trip_status};
use tourist_safety_scenario::registry::{DEFAULT_SCENARIO_ID, all_scenarios, find_scenario};
use tourist_safety_scenario::{Scenario, ScenarioError, export, load_scenario_file};

#[derive(Parser)]
#[command(name = "tourist_safety", about = "Geofencing and route-deviation monitor")]
struct Cli {
    /// Built-in scenario id
    #[arg(long, global = true, conflicts_with = "scenario_file")]
    scenario: Option<String>,
    /// Load the scenario from a TOML file instead
    #[arg(long, global = true)]
    scenario_file: Option<PathBuf>,
    /// Override the scenario's deviation threshold, in meters
    #[arg(long, global = true)]
    threshold_m: Option<f64>,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List the built-in scenarios
    Scenarios,
    /// Classify one position and report its safety state
    Evaluate {
        #[arg(long, allow_hyphen_values = true)]
        lat: f64,
        #[arg(long, allow_hyphen_values = true)]
        lng: f64,
        /// Print the snapshot as JSON
        #[arg(long)]
        json: bool,
    },
    /// Show the next waypoint and estimated time to reach it
    Trip {
        #[arg(long, allow_hyphen_values = true)]
        lat: f64,
        #[arg(long, allow_hyphen_values = true)]
        lng: f64,
    },
    /// Export zones and route as a `GeoJSON` feature collection
    Geojson {
        /// Write to this file instead of stdout
        #[arg(long)]
        output: Option<PathBuf>,
    },
    /// Replay a simulated trip along the route
    Simulate(simulate::SimulateArgs),
}

impl Cli {
    fn load_scenario(&self) -> Result<Scenario, ScenarioError> {
        let scenario = match (&self.scenario_file, &self.scenario) {
            (Some(path), _) => load_scenario_file(path)?,
            (None, Some(id)) => find_scenario(id)?,
            (None, None) => find_scenario(DEFAULT_SCENARIO_ID)?,
        };
        match self.threshold_m {
            Some(threshold_m) => scenario.with_deviation_threshold(threshold_m),
            None => Ok(scenario),
        }
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    pretty_env_logger::init_custom_env("RUST_LOG");
    let cli = Cli::parse();

    match &cli.command {
        Commands::Scenarios => {
            println!("{:<20} {:<6} NAME", "ID", "ZONES");
            println!("{}", "-".repeat(60));
            for definition in all_scenarios() {
                println!(
                    "{:<20} {:<6} {}",
                    definition.id,
                    definition.zones.len(),
                    definition.name
                );
            }
        }
        Commands::Evaluate { lat, lng, json } => {
            let scenario = cli.load_scenario()?;
            let position = Coordinate::new(*lat, *lng);
            let state = evaluate(
                position,
                scenario.zones(),
                scenario.route(),
                scenario.deviation_threshold_m(),
            );

            if *json {
                println!("{}", serde_json::to_string_pretty(&state.snapshot())?);
            } else {
                println!("Position:       {position}");
                match state.zone {
                    Some(zone) => println!(
                        "Zone:           {} [{}] ({} risk)",
                        zone.name, zone.id, zone.risk_level
                    ),
                    None => println!("Zone:           none"),
                }
                println!("Safety score:   {}/10", state.score);
                println!(
                    "Route distance: {:.2} km (segment {})",
                    state.distance_to_route_m() / 1000.0,
                    state.nearest.segment_index
                );
                println!(
                    "Deviation:      {}",
                    if state.deviated { "YES" } else { "no" }
                );
            }
        }
        Commands::Trip { lat, lng } => {
            let scenario = cli.load_scenario()?;
            let position = Coordinate::new(*lat, *lng);
            let status = trip_status(position, scenario.route(), scenario.average_speed_kmh());
            let name = scenario
                .waypoint_name(status.next_waypoint_index)
                .unwrap_or("?");

            println!(
                "Next waypoint: {name} ({} of {}){}",
                status.next_waypoint_index + 1,
                scenario.route().points().len(),
                if status.final_leg { ", destination" } else { "" }
            );
            println!("Distance:      {:.1} km", status.distance_to_next_m / 1000.0);
            match status.eta_minutes {
                Some(minutes) => println!("ETA:           {}", format_eta(minutes)),
                None => println!("ETA:           unknown"),
            }
        }
        Commands::Geojson { output } => {
            let scenario = cli.load_scenario()?;
            let collection = export::to_feature_collection(&scenario);
            let json = serde_json::to_string_pretty(&collection)?;
            match output {
                Some(path) => {
                    std::fs::write(path, json)?;
                    log::info!("Wrote {}", path.display());
                }
                None => println!("{json}"),
            }
        }
        Commands::Simulate(args) => {
            let scenario = cli.load_scenario()?;
            simulate::run(scenario, args).await?;
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_negative_coordinates() {
        let cli = Cli::try_parse_from([
            "tourist_safety",
            "evaluate",
            "--lat",
            "-33.86",
            "--lng",
            "151.2",
        ])
        .unwrap();
        assert!(matches!(
            cli.command,
            Commands::Evaluate { lat, .. } if (lat + 33.86).abs() < f64::EPSILON
        ));
    }

    #[test]
    fn scenario_flags_conflict() {
        assert!(
            Cli::try_parse_from([
                "tourist_safety",
                "--scenario",
                "northeast_india",
                "--scenario-file",
                "trip.toml",
                "scenarios",
            ])
            .is_err()
        );
    }

    #[test]
    fn check_in_confirmation_needs_an_interval() {
        assert!(
            Cli::try_parse_from(["tourist_safety", "simulate", "--check-in-every", "3"]).is_err()
        );
        let cli = Cli::try_parse_from([
            "tourist_safety",
            "simulate",
            "--check-in-min",
            "2",
            "--check-in-every",
            "3",
            "--sos-at",
            "10",
        ])
        .unwrap();
        assert!(matches!(cli.command, Commands::Simulate(_)));
    }

    #[test]
    fn default_scenario_with_threshold_override() {
        let cli = Cli::try_parse_from(["tourist_safety", "geojson", "--threshold-m", "500"]).unwrap();
        let scenario = cli.load_scenario().unwrap();
        assert_eq!(scenario.id(), DEFAULT_SCENARIO_ID);
        assert!((scenario.deviation_threshold_m() - 500.0).abs() < f64::EPSILON);
    }
}
