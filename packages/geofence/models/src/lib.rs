#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Coordinate, zone, and safety-state types for the geofencing engine.
//!
//! These are plain data types shared by the geofencing core, the scenario
//! loader, and the monitoring layer. They carry no validation of their own;
//! validated wrappers (`Route`, `ZoneSet`) live in the core crate.

use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumString};

/// Safety score reported when a position lies outside every defined zone.
///
/// Sits between [`RiskLevel::Safe`] and [`RiskLevel::Low`] so that "in
/// transit" implies neither.
pub const NO_ZONE_SCORE: u8 = 8;

/// A position in decimal degrees on a spherical earth.
///
/// Serialized as a `[lat, lng]` pair.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(from = "(f64, f64)", into = "(f64, f64)")]
pub struct Coordinate {
    /// Latitude in decimal degrees.
    pub lat: f64,
    /// Longitude in decimal degrees.
    pub lng: f64,
}

impl Coordinate {
    /// Creates a coordinate from latitude and longitude in degrees.
    #[must_use]
    pub const fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }
}

impl From<(f64, f64)> for Coordinate {
    fn from((lat, lng): (f64, f64)) -> Self {
        Self { lat, lng }
    }
}

impl From<Coordinate> for (f64, f64) {
    fn from(value: Coordinate) -> Self {
        (value.lat, value.lng)
    }
}

impl std::fmt::Display for Coordinate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:.4}, {:.4}", self.lat, self.lng)
    }
}

/// Severity attached to a zone, ordered `Safe < Low < Moderate < High`.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum RiskLevel {
    /// Designated safe area (city centres, checkpoints).
    Safe,
    /// Minor hazards such as accident-prone road stretches.
    Low,
    /// Forest boundaries and similar areas needing caution.
    Moderate,
    /// Restricted or dangerous areas.
    High,
}

impl RiskLevel {
    /// Returns the safety score (0-10) displayed for a position in a zone of
    /// this risk level.
    #[must_use]
    pub const fn score(self) -> u8 {
        match self {
            Self::Safe => 10,
            Self::Low => 7,
            Self::Moderate => 5,
            Self::High => 2,
        }
    }

    /// Returns all variants in ascending severity.
    #[must_use]
    pub const fn all() -> &'static [Self] {
        &[Self::Safe, Self::Low, Self::Moderate, Self::High]
    }
}

/// Map color used when rendering a zone. Not consulted by any safety logic.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum ZoneColor {
    /// Restricted areas.
    Red,
    /// Road hazards.
    Orange,
    /// Areas needing caution.
    Yellow,
    /// Safe areas.
    Green,
}

/// Geometry of a zone.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ZoneShape {
    /// Implicitly closed polygon; needs at least 3 vertices.
    Polygon {
        /// Vertices in order. The last vertex connects back to the first.
        vertices: Vec<Coordinate>,
    },
    /// Circle around a center; radius must be positive.
    Circle {
        /// Circle center.
        center: Coordinate,
        /// Radius in meters.
        radius_m: f64,
    },
}

/// A static geofenced region with an associated risk level.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Zone {
    /// Unique identifier (e.g. `"forest-kaziranga"`).
    pub id: String,
    /// Display name (e.g. `"Kaziranga National Park Boundary"`).
    pub name: String,
    /// Free-form semantic tag (`"forest"`, `"tribal"`, `"highway"`, `"safe"`).
    #[serde(rename = "type")]
    pub zone_type: String,
    /// Severity of the zone.
    pub risk_level: RiskLevel,
    /// Zone geometry.
    pub shape: ZoneShape,
    /// Map color.
    pub color: ZoneColor,
}

/// Closest location on a route to some query point.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NearestPoint {
    /// Great-circle distance in meters from the query point to `point`.
    pub distance_m: f64,
    /// The projected location on the route.
    pub point: Coordinate,
    /// Index of the route segment `point` lies on (segment `i` joins
    /// waypoints `i` and `i + 1`).
    pub segment_index: usize,
}

/// Identifying fields of the zone a position was classified into.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ZoneSummary {
    /// Zone id.
    pub id: String,
    /// Zone display name.
    pub name: String,
    /// Zone semantic tag.
    pub zone_type: String,
    /// Zone risk level.
    pub risk_level: RiskLevel,
}

impl From<&Zone> for ZoneSummary {
    fn from(zone: &Zone) -> Self {
        Self {
            id: zone.id.clone(),
            name: zone.name.clone(),
            zone_type: zone.zone_type.clone(),
            risk_level: zone.risk_level,
        }
    }
}

/// Owned copy of one safety evaluation, kept by callers between position
/// updates so the next evaluation can be diffed against it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SafetySnapshot {
    /// Zone containing the position, if any.
    pub zone: Option<ZoneSummary>,
    /// Safety score, 0-10.
    pub score: u8,
    /// Whether the position is farther from the route than the threshold.
    pub deviated: bool,
    /// Nearest point on the planned route.
    pub nearest: NearestPoint,
}

impl SafetySnapshot {
    /// Id of the containing zone, if any.
    #[must_use]
    pub fn zone_id(&self) -> Option<&str> {
        self.zone.as_ref().map(|z| z.id.as_str())
    }

    /// Distance in meters to the planned route.
    #[must_use]
    pub const fn distance_to_route_m(&self) -> f64 {
        self.nearest.distance_m
    }
}

/// A change between two consecutive safety evaluations.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum SafetyTransition {
    /// The position left a zone.
    ZoneExited {
        /// The zone that was left.
        zone: ZoneSummary,
    },
    /// The position entered a zone.
    ZoneEntered {
        /// The zone that was entered.
        zone: ZoneSummary,
    },
    /// Distance to the route rose above the threshold.
    #[serde(rename_all = "camelCase")]
    DeviationStarted {
        /// Distance to the route in meters.
        distance_m: f64,
    },
    /// Distance to the route fell back within the threshold.
    #[serde(rename_all = "camelCase")]
    DeviationCleared {
        /// Distance to the route in meters.
        distance_m: f64,
    },
}
