//! Nearest-point projection onto a planned route.
//!
//! Projection is planar-parametric: each segment is treated as a straight
//! line in (longitude, latitude) degree space, the query point is projected
//! onto it with the parameter clamped to `[0, 1]`, and the reported
//! distance is the great-circle distance from the query point to that
//! projected location. Because the projected location always lies on the
//! (degree-space) segment, the reported distance is never below the true
//! minimum distance to the segment under that metric. Accuracy degrades
//! for long segments and at high latitudes, which is acceptable for
//! regional road trips.

use tourist_safety_geofence_models::{Coordinate, NearestPoint};

use crate::GeofenceError;
use crate::geometry::distance;

/// An ordered planned path with at least two waypoints.
///
/// Segment `i` joins waypoints `i` and `i + 1`; the last waypoint is the
/// destination.
#[derive(Debug, Clone, PartialEq)]
pub struct Route {
    points: Vec<Coordinate>,
}

impl Route {
    /// Validates and wraps a list of waypoints.
    ///
    /// # Errors
    ///
    /// Returns [`GeofenceError::InvalidRoute`] if fewer than 2 points are
    /// given, since no segment would exist.
    pub fn new(points: Vec<Coordinate>) -> Result<Self, GeofenceError> {
        validate_route(&points)?;
        Ok(Self { points })
    }

    /// The waypoints in travel order.
    #[must_use]
    pub fn points(&self) -> &[Coordinate] {
        &self.points
    }

    /// Number of segments (one less than the number of waypoints).
    #[must_use]
    pub fn segment_count(&self) -> usize {
        self.points.len() - 1
    }

    /// The final waypoint.
    #[must_use]
    pub fn destination(&self) -> Coordinate {
        self.points[self.points.len() - 1]
    }

    /// Total length in meters, summing great-circle segment lengths.
    #[must_use]
    pub fn length_m(&self) -> f64 {
        self.points.windows(2).map(|w| distance(w[0], w[1])).sum()
    }

    /// Nearest point on this route to `point`.
    #[must_use]
    pub fn nearest_point(&self, point: Coordinate) -> NearestPoint {
        nearest_on_segments(point, &self.points)
    }
}

/// Finds the point on `route` closest to `point`, the distance to it, and
/// the segment it lies on.
///
/// Ties resolve to the lowest segment index.
///
/// # Errors
///
/// Returns [`GeofenceError::InvalidRoute`] if `route` has fewer than 2
/// points.
pub fn nearest_point_on_route(
    point: Coordinate,
    route: &[Coordinate],
) -> Result<NearestPoint, GeofenceError> {
    validate_route(route)?;
    Ok(nearest_on_segments(point, route))
}

fn validate_route(points: &[Coordinate]) -> Result<(), GeofenceError> {
    if points.len() < 2 {
        return Err(GeofenceError::InvalidRoute {
            message: format!("route needs at least 2 points, got {}", points.len()),
        });
    }
    Ok(())
}

/// Caller guarantees `points.len() >= 2`.
fn nearest_on_segments(point: Coordinate, points: &[Coordinate]) -> NearestPoint {
    let mut best = NearestPoint {
        distance_m: f64::INFINITY,
        point: points[0],
        segment_index: 0,
    };

    for (segment_index, pair) in points.windows(2).enumerate() {
        let projected = project_onto_segment(point, pair[0], pair[1]);
        let distance_m = distance(point, projected);
        if distance_m < best.distance_m {
            best = NearestPoint {
                distance_m,
                point: projected,
                segment_index,
            };
        }
    }

    best
}

/// Planar projection of `point` onto segment `a`-`b`, clamped to the
/// segment. A zero-length segment projects onto `a`.
fn project_onto_segment(point: Coordinate, a: Coordinate, b: Coordinate) -> Coordinate {
    let dx = b.lng - a.lng;
    let dy = b.lat - a.lat;
    let length_sq = dx.mul_add(dx, dy * dy);
    if length_sq == 0.0 {
        return a;
    }

    let t = (point.lng - a.lng)
        .mul_add(dx, (point.lat - a.lat) * dy)
        / length_sq;
    let t = t.clamp(0.0, 1.0);

    Coordinate::new(t.mul_add(dy, a.lat), t.mul_add(dx, a.lng))
}
