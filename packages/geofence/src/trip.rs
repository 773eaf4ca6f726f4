//! Progress along the planned route: next waypoint and time to reach it.

use tourist_safety_geofence_models::Coordinate;

use crate::geometry::distance;
use crate::route::Route;

/// Average travel speed assumed when estimating arrival times.
pub const DEFAULT_AVERAGE_SPEED_KMH: f64 = 40.0;

/// Where the traveller is headed next.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TripStatus {
    /// Index into the route's waypoints of the next stop.
    pub next_waypoint_index: usize,
    /// Great-circle distance in meters to the next stop.
    pub distance_to_next_m: f64,
    /// Estimated minutes to the next stop, or `None` if the average speed
    /// is not positive.
    pub eta_minutes: Option<u64>,
    /// Whether the next stop is the destination.
    pub final_leg: bool,
}

/// Works out the next waypoint from the nearest route segment: on segment
/// `i` the traveller is heading to waypoint `i + 1`.
#[must_use]
pub fn trip_status(point: Coordinate, route: &Route, average_speed_kmh: f64) -> TripStatus {
    let nearest = route.nearest_point(point);
    let next_waypoint_index = nearest.segment_index + 1;
    let distance_to_next_m = distance(point, route.points()[next_waypoint_index]);

    TripStatus {
        next_waypoint_index,
        distance_to_next_m,
        eta_minutes: eta_minutes(distance_to_next_m, average_speed_kmh),
        final_leg: next_waypoint_index == route.points().len() - 1,
    }
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn eta_minutes(distance_m: f64, average_speed_kmh: f64) -> Option<u64> {
    if average_speed_kmh.is_nan() || average_speed_kmh <= 0.0 {
        return None;
    }
    let hours = distance_m / 1000.0 / average_speed_kmh;
    Some((hours * 60.0).round().max(0.0) as u64)
}

/// Formats minutes as `"2h 5m"`, or `"45m"` under an hour.
#[must_use]
pub fn format_eta(minutes: u64) -> String {
    let hours = minutes / 60;
    let minutes = minutes % 60;
    if hours > 0 {
        format!("{hours}h {minutes}m")
    } else {
        format!("{minutes}m")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn route() -> Route {
        Route::new(vec![
            Coordinate::new(26.1445, 91.7362),
            Coordinate::new(26.5786, 93.1709),
            Coordinate::new(25.5788, 91.8933),
        ])
        .unwrap()
    }

    #[test]
    fn heads_to_second_waypoint_on_first_leg() {
        let route = route();
        let status = trip_status(route.points()[0], &route, DEFAULT_AVERAGE_SPEED_KMH);
        assert_eq!(status.next_waypoint_index, 1);
        assert!(!status.final_leg);
        let expected = distance(route.points()[0], route.points()[1]);
        assert!((status.distance_to_next_m - expected).abs() < 1e-6);
    }

    #[test]
    fn last_leg_targets_destination() {
        let route = route();
        let status = trip_status(Coordinate::new(25.60, 91.95), &route, DEFAULT_AVERAGE_SPEED_KMH);
        assert_eq!(status.next_waypoint_index, 2);
        assert!(status.final_leg);
    }

    #[test]
    fn eta_uses_average_speed() {
        assert_eq!(eta_minutes(40_000.0, 40.0), Some(60));
        assert_eq!(eta_minutes(10_000.0, 40.0), Some(15));
        assert_eq!(eta_minutes(10_000.0, 0.0), None);
        assert_eq!(eta_minutes(10_000.0, f64::NAN), None);
    }

    #[test]
    fn formats_eta() {
        assert_eq!(format_eta(45), "45m");
        assert_eq!(format_eta(60), "1h 0m");
        assert_eq!(format_eta(125), "2h 5m");
    }
}
