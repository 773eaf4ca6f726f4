//! Spherical distance and shape containment primitives.
//!
//! Polygon containment is planar in degree space (x = longitude,
//! y = latitude), follows the even-odd rule, and excludes the boundary: a
//! point on an edge or exactly on a vertex is outside. Regions a
//! self-intersecting ring covers an even number of times are outside. Circle containment is likewise strict, so a
//! point exactly `radius` meters from the center is outside.

use geo::{Intersects, LineString, Point};
use tourist_safety_geofence_models::Coordinate;

use crate::GeofenceError;

/// Radius of the spherical earth model, in meters.
pub const EARTH_RADIUS_M: f64 = 6_371_000.0;

/// Great-circle distance in meters between two coordinates (haversine).
#[must_use]
pub fn distance(a: Coordinate, b: Coordinate) -> f64 {
    let phi1 = a.lat.to_radians();
    let phi2 = b.lat.to_radians();
    let delta_phi = (b.lat - a.lat).to_radians();
    let delta_lambda = (b.lng - a.lng).to_radians();

    let hav = (delta_phi / 2.0).sin().powi(2)
        + phi1.cos() * phi2.cos() * (delta_lambda / 2.0).sin().powi(2);
    // Rounding can push `hav` a hair past 1 for antipodal points.
    let hav = hav.clamp(0.0, 1.0);

    2.0 * EARTH_RADIUS_M * hav.sqrt().atan2((1.0 - hav).sqrt())
}

/// Whether `point` lies strictly inside the polygon described by `vertices`.
///
/// The polygon is implicitly closed (the last vertex joins the first).
///
/// # Errors
///
/// Returns [`GeofenceError::InvalidShape`] if fewer than 3 vertices are
/// given.
pub fn point_in_polygon(point: Coordinate, vertices: &[Coordinate]) -> Result<bool, GeofenceError> {
    validate_polygon(vertices)?;
    Ok(ring_contains(&to_ring(vertices), point))
}

/// Whether `point` is strictly less than `radius_m` meters from `center`.
///
/// # Errors
///
/// Returns [`GeofenceError::InvalidShape`] if `radius_m` is not positive.
pub fn point_in_circle(
    point: Coordinate,
    center: Coordinate,
    radius_m: f64,
) -> Result<bool, GeofenceError> {
    validate_circle(radius_m)?;
    Ok(circle_contains(center, radius_m, point))
}

pub(crate) fn validate_polygon(vertices: &[Coordinate]) -> Result<(), GeofenceError> {
    if vertices.len() < 3 {
        return Err(GeofenceError::InvalidShape {
            message: format!("polygon needs at least 3 vertices, got {}", vertices.len()),
        });
    }
    Ok(())
}

pub(crate) fn validate_circle(radius_m: f64) -> Result<(), GeofenceError> {
    if radius_m.is_nan() || radius_m <= 0.0 {
        return Err(GeofenceError::InvalidShape {
            message: format!("circle radius must be positive, got {radius_m}"),
        });
    }
    Ok(())
}

/// Closed ring in `(lng, lat)` order.
pub(crate) fn to_ring(vertices: &[Coordinate]) -> LineString<f64> {
    let mut ring: LineString<f64> = vertices.iter().map(|c| (c.lng, c.lat)).collect();
    ring.close();
    ring
}

/// Even-odd crossing test against a closed ring, boundary excluded.
pub(crate) fn ring_contains(ring: &LineString<f64>, point: Coordinate) -> bool {
    if ring.intersects(&Point::new(point.lng, point.lat)) {
        return false;
    }

    let (x, y) = (point.lng, point.lat);
    let mut inside = false;
    for edge in ring.lines() {
        let (a, b) = (edge.start, edge.end);
        if (a.y > y) != (b.y > y) {
            let x_cross = (b.x - a.x).mul_add((y - a.y) / (b.y - a.y), a.x);
            if x < x_cross {
                inside = !inside;
            }
        }
    }
    inside
}

pub(crate) fn circle_contains(center: Coordinate, radius_m: f64, point: Coordinate) -> bool {
    distance(point, center) < radius_m
}
