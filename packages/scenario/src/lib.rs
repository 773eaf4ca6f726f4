#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Scenario configuration: planned routes and geofenced risk zones.
//!
//! A scenario is a TOML document naming the route waypoints, the zones to
//! monitor (in priority order), and the thresholds used when evaluating
//! positions. Definitions are validated when loaded so that a malformed
//! zone or route stops the program at startup instead of surfacing on the
//! first position update.

pub mod export;
pub mod registry;

use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tourist_safety_geofence::{
    DEFAULT_AVERAGE_SPEED_KMH, DEFAULT_DEVIATION_THRESHOLD_M, GeofenceError, Route, ZoneSet,
};
use tourist_safety_geofence_models::{Coordinate, Zone};

/// Errors that can occur while loading a scenario.
#[derive(Debug, Error)]
pub enum ScenarioError {
    /// Reading the scenario file failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The TOML document is malformed or missing required fields.
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    /// A zone or the route violates its shape contract.
    #[error("Geofence configuration error: {0}")]
    Geofence(#[from] GeofenceError),

    /// A numeric setting is out of range.
    #[error("Invalid scenario setting: {message}")]
    InvalidSetting {
        /// Description of the bad setting.
        message: String,
    },

    /// No built-in scenario has the requested id.
    #[error("Unknown scenario: {id}")]
    UnknownScenario {
        /// The requested id.
        id: String,
    },
}

/// A named stop on the planned route.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Waypoint {
    /// Display name (e.g. `"Kaziranga"`).
    pub name: String,
    /// Location.
    pub position: Coordinate,
}

const fn default_deviation_threshold_m() -> f64 {
    DEFAULT_DEVIATION_THRESHOLD_M
}

const fn default_average_speed_kmh() -> f64 {
    DEFAULT_AVERAGE_SPEED_KMH
}

/// A scenario exactly as written in TOML, before validation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScenarioDefinition {
    /// Unique identifier (e.g. `"northeast_india"`).
    pub id: String,
    /// Human-readable name.
    pub name: String,
    /// Distance from the route, in meters, beyond which a position counts
    /// as a deviation.
    #[serde(default = "default_deviation_threshold_m")]
    pub deviation_threshold_m: f64,
    /// Average travel speed used for arrival estimates.
    #[serde(default = "default_average_speed_kmh")]
    pub average_speed_kmh: f64,
    /// Planned route in travel order.
    pub waypoints: Vec<Waypoint>,
    /// Zones in priority order.
    #[serde(default)]
    pub zones: Vec<Zone>,
}

/// A validated scenario ready for evaluation.
#[derive(Debug)]
pub struct Scenario {
    id: String,
    name: String,
    deviation_threshold_m: f64,
    average_speed_kmh: f64,
    waypoint_names: Vec<String>,
    route: Route,
    zones: ZoneSet,
}

impl Scenario {
    /// Validates a definition.
    ///
    /// # Errors
    ///
    /// * [`ScenarioError::Geofence`] if the route has fewer than 2
    ///   waypoints, any zone shape is degenerate, or zone ids repeat.
    /// * [`ScenarioError::InvalidSetting`] if the deviation threshold is
    ///   negative or not a number.
    pub fn from_definition(definition: ScenarioDefinition) -> Result<Self, ScenarioError> {
        validate_threshold(definition.deviation_threshold_m)?;

        let (waypoint_names, points): (Vec<String>, Vec<Coordinate>) = definition
            .waypoints
            .into_iter()
            .map(|w| (w.name, w.position))
            .unzip();
        let route = Route::new(points)?;
        let zones = ZoneSet::new(definition.zones)?;

        log::info!(
            "Loaded scenario '{}': {} waypoints, {} zones",
            definition.id,
            waypoint_names.len(),
            zones.len()
        );

        Ok(Self {
            id: definition.id,
            name: definition.name,
            deviation_threshold_m: definition.deviation_threshold_m,
            average_speed_kmh: definition.average_speed_kmh,
            waypoint_names,
            route,
            zones,
        })
    }

    /// Replaces the deviation threshold.
    ///
    /// # Errors
    ///
    /// Returns [`ScenarioError::InvalidSetting`] if `threshold_m` is
    /// negative or not a number.
    pub fn with_deviation_threshold(mut self, threshold_m: f64) -> Result<Self, ScenarioError> {
        validate_threshold(threshold_m)?;
        self.deviation_threshold_m = threshold_m;
        Ok(self)
    }

    /// Scenario id.
    #[must_use]
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Scenario display name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Deviation threshold in meters.
    #[must_use]
    pub const fn deviation_threshold_m(&self) -> f64 {
        self.deviation_threshold_m
    }

    /// Average travel speed in km/h.
    #[must_use]
    pub const fn average_speed_kmh(&self) -> f64 {
        self.average_speed_kmh
    }

    /// The planned route.
    #[must_use]
    pub const fn route(&self) -> &Route {
        &self.route
    }

    /// The zones in priority order.
    #[must_use]
    pub const fn zones(&self) -> &ZoneSet {
        &self.zones
    }

    /// Name of the waypoint at `index`.
    #[must_use]
    pub fn waypoint_name(&self, index: usize) -> Option<&str> {
        self.waypoint_names.get(index).map(String::as_str)
    }

    /// Waypoint names in travel order.
    #[must_use]
    pub fn waypoint_names(&self) -> &[String] {
        &self.waypoint_names
    }
}

fn validate_threshold(threshold_m: f64) -> Result<(), ScenarioError> {
    if threshold_m.is_nan() || threshold_m < 0.0 {
        return Err(ScenarioError::InvalidSetting {
            message: format!("deviation threshold must be a non-negative distance, got {threshold_m}"),
        });
    }
    Ok(())
}

/// Parses a [`ScenarioDefinition`] from a TOML string.
///
/// # Errors
///
/// Returns [`ScenarioError::Toml`] if the TOML is malformed or missing
/// required fields.
pub fn parse_scenario_toml(toml_str: &str) -> Result<ScenarioDefinition, ScenarioError> {
    Ok(toml::from_str(toml_str)?)
}

/// Reads, parses, and validates a scenario file.
///
/// # Errors
///
/// Returns [`ScenarioError`] if the file cannot be read, does not parse,
/// or fails validation.
pub fn load_scenario_file(path: &Path) -> Result<Scenario, ScenarioError> {
    log::debug!("Reading scenario from {}", path.display());
    let contents = std::fs::read_to_string(path)?;
    Scenario::from_definition(parse_scenario_toml(&contents)?)
}
