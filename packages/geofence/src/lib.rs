#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Geofencing and route-deviation engine.
//!
//! Decides, for a single position update, which configured zone (if any)
//! contains the position, how far the position is from the planned route,
//! and what safety score and deviation flag follow from that. Every
//! operation is a pure function over immutable inputs: nothing here owns a
//! clock, performs I/O, or keeps state between calls, so the same
//! [`ZoneSet`] and [`Route`] can be shared across threads freely.
//!
//! Callers retain the previous [`SafetySnapshot`] and diff it against the
//! next evaluation ([`diff`]) to decide when to alert.

pub mod evaluate;
pub mod geometry;
pub mod route;
pub mod transitions;
pub mod trip;
pub mod zones;

pub use evaluate::{DEFAULT_DEVIATION_THRESHOLD_M, SafetyState, evaluate, score_for};
pub use geometry::{EARTH_RADIUS_M, distance, point_in_circle, point_in_polygon};
pub use route::{Route, nearest_point_on_route};
pub use tourist_safety_geofence_models::{
    Coordinate, NO_ZONE_SCORE, NearestPoint, RiskLevel, SafetySnapshot, SafetyTransition, Zone,
    ZoneColor, ZoneShape, ZoneSummary,
};
pub use transitions::diff;
pub use trip::{DEFAULT_AVERAGE_SPEED_KMH, TripStatus, format_eta, trip_status};
pub use zones::{ZoneSet, classify, validate_zone};

use thiserror::Error;

/// Contract violations in static zone or route configuration.
///
/// These are raised when configuration is loaded and are never retried.
/// A point that falls in no zone is not an error.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GeofenceError {
    /// Polygon with fewer than 3 vertices, or circle with a non-positive
    /// radius.
    #[error("Invalid shape: {message}")]
    InvalidShape {
        /// Description of what is wrong with the shape.
        message: String,
    },

    /// Route with fewer than 2 points.
    #[error("Invalid route: {message}")]
    InvalidRoute {
        /// Description of what is wrong with the route.
        message: String,
    },

    /// Two zones in the same set share an id.
    #[error("Duplicate zone id: {id}")]
    DuplicateZone {
        /// The repeated id.
        id: String,
    },
}
