//! Per-update safety evaluation.

use tourist_safety_geofence_models::{
    Coordinate, NO_ZONE_SCORE, NearestPoint, SafetySnapshot, SafetyTransition, Zone, ZoneSummary,
};

use crate::route::Route;
use crate::transitions::diff;
use crate::zones::ZoneSet;

/// Deviation threshold used when a scenario does not configure one.
pub const DEFAULT_DEVIATION_THRESHOLD_M: f64 = 2000.0;

/// The safety picture for one position.
///
/// Borrows the zone it was classified into from the [`ZoneSet`]. Use
/// [`SafetyState::snapshot`] to keep an owned copy across updates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SafetyState<'a> {
    /// Zone containing the position, if any.
    pub zone: Option<&'a Zone>,
    /// Safety score, 0-10.
    pub score: u8,
    /// Whether the distance to the route strictly exceeds the threshold.
    pub deviated: bool,
    /// Nearest point on the route.
    pub nearest: NearestPoint,
}

impl SafetyState<'_> {
    /// Distance in meters to the planned route.
    #[must_use]
    pub const fn distance_to_route_m(&self) -> f64 {
        self.nearest.distance_m
    }

    /// Owned copy of this state.
    #[must_use]
    pub fn snapshot(&self) -> SafetySnapshot {
        SafetySnapshot {
            zone: self.zone.map(ZoneSummary::from),
            score: self.score,
            deviated: self.deviated,
            nearest: self.nearest,
        }
    }

    /// Changes relative to `previous`. See [`diff`].
    #[must_use]
    pub fn transitions_from(&self, previous: Option<&SafetySnapshot>) -> Vec<SafetyTransition> {
        diff(previous, &self.snapshot())
    }
}

/// Safety score for a position in `zone`, or [`NO_ZONE_SCORE`] outside all
/// zones.
#[must_use]
pub fn score_for(zone: Option<&Zone>) -> u8 {
    zone.map_or(NO_ZONE_SCORE, |z| z.risk_level.score())
}

/// Evaluates one position against the zones and planned route.
///
/// Pure: performs no I/O and fires no notifications.
#[must_use]
pub fn evaluate<'a>(
    point: Coordinate,
    zones: &'a ZoneSet,
    route: &Route,
    deviation_threshold_m: f64,
) -> SafetyState<'a> {
    let zone = zones.classify(point);
    let nearest = route.nearest_point(point);

    SafetyState {
        zone,
        score: score_for(zone),
        deviated: nearest.distance_m > deviation_threshold_m,
        nearest,
    }
}

#[cfg(test)]
mod tests {
    use tourist_safety_geofence_models::{RiskLevel, ZoneColor, ZoneShape};

    use super::*;
    use crate::geometry::EARTH_RADIUS_M;

    fn degrees(meters: f64) -> f64 {
        (meters / EARTH_RADIUS_M).to_degrees()
    }

    fn zone(id: &str, risk_level: RiskLevel, center: (f64, f64), radius_m: f64) -> Zone {
        Zone {
            id: id.to_string(),
            name: id.to_string(),
            zone_type: "tribal".to_string(),
            risk_level,
            shape: ZoneShape::Circle {
                center: center.into(),
                radius_m,
            },
            color: ZoneColor::Red,
        }
    }

    fn equator_route() -> Route {
        Route::new(vec![Coordinate::new(0.0, 0.0), Coordinate::new(0.0, 1.0)]).unwrap()
    }

    #[test]
    fn deviation_follows_threshold() {
        let zones = ZoneSet::new(vec![]).unwrap();
        let route = equator_route();

        let far = Coordinate::new(degrees(3000.0), 0.5);
        let state = evaluate(far, &zones, &route, DEFAULT_DEVIATION_THRESHOLD_M);
        assert!(state.deviated);
        assert!((state.distance_to_route_m() - 3000.0).abs() < 1.0);

        let near = Coordinate::new(degrees(1000.0), 0.5);
        let state = evaluate(near, &zones, &route, DEFAULT_DEVIATION_THRESHOLD_M);
        assert!(!state.deviated);
    }

    #[test]
    fn distance_equal_to_threshold_is_not_deviation() {
        let zones = ZoneSet::new(vec![]).unwrap();
        let route = equator_route();
        let point = Coordinate::new(degrees(1500.0), 0.5);
        let exact = route.nearest_point(point).distance_m;
        assert!(!evaluate(point, &zones, &route, exact).deviated);
    }

    #[test]
    fn score_follows_zone_risk() {
        let zones = ZoneSet::new(vec![
            zone("high", RiskLevel::High, (0.0, 0.2), 5000.0),
            zone("moderate", RiskLevel::Moderate, (0.0, 0.4), 5000.0),
            zone("low", RiskLevel::Low, (0.0, 0.6), 5000.0),
            zone("safe", RiskLevel::Safe, (0.0, 0.8), 5000.0),
        ])
        .unwrap();
        let route = equator_route();

        let cases = [
            (0.2, Some("high"), 2),
            (0.4, Some("moderate"), 5),
            (0.6, Some("low"), 7),
            (0.8, Some("safe"), 10),
            (0.5, None, 8),
        ];
        for (lng, expected_zone, expected_score) in cases {
            let state = evaluate(Coordinate::new(0.0, lng), &zones, &route, 2000.0);
            assert_eq!(state.zone.map(|z| z.id.as_str()), expected_zone, "{lng}");
            assert_eq!(state.score, expected_score, "{lng}");
            assert!(!state.deviated);
        }
    }

    #[test]
    fn snapshot_copies_zone_fields() {
        let zones = ZoneSet::new(vec![zone("high", RiskLevel::High, (0.0, 0.2), 5000.0)]).unwrap();
        let state = evaluate(Coordinate::new(0.0, 0.2), &zones, &equator_route(), 2000.0);
        let snapshot = state.snapshot();
        assert_eq!(snapshot.zone_id(), Some("high"));
        assert_eq!(snapshot.score, 2);
        assert_eq!(snapshot.zone.unwrap().risk_level, RiskLevel::High);
    }

    #[test]
    fn score_for_no_zone() {
        assert_eq!(score_for(None), NO_ZONE_SCORE);
    }
}
