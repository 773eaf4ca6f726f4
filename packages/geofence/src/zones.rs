//! Validated zone sets and first-match classification.
//!
//! Zones may overlap (a high-risk pocket inside a larger moderate boundary).
//! Priority is the caller's list order: [`ZoneSet::classify`] returns the
//! first zone in the list whose shape contains the point and never
//! re-ranks by severity.
//!
//! An R-tree over zone envelopes narrows the candidates; the winner is the
//! candidate with the lowest list index, so the result is identical to a
//! linear scan.

use std::collections::BTreeSet;

use geo::LineString;
use rstar::{AABB, RTree, RTreeObject};
use tourist_safety_geofence_models::{Coordinate, Zone, ZoneShape};

use crate::GeofenceError;
use crate::geometry::{
    EARTH_RADIUS_M, circle_contains, ring_contains, to_ring, validate_circle, validate_polygon,
};

/// Relative padding applied to circle envelopes to absorb rounding.
const ENVELOPE_PADDING: f64 = 1e-6;

/// A zone's list position stored in the R-tree with its bounding box.
struct ZoneEntry {
    index: usize,
    envelope: AABB<[f64; 2]>,
}

impl RTreeObject for ZoneEntry {
    type Envelope = AABB<[f64; 2]>;

    fn envelope(&self) -> Self::Envelope {
        self.envelope
    }
}

/// Shape prepared for repeated containment tests.
enum PreparedShape {
    Polygon(LineString<f64>),
    Circle { center: Coordinate, radius_m: f64 },
}

impl PreparedShape {
    fn contains(&self, point: Coordinate) -> bool {
        match self {
            Self::Polygon(ring) => ring_contains(ring, point),
            Self::Circle { center, radius_m } => circle_contains(*center, *radius_m, point),
        }
    }
}

/// An ordered, validated list of zones.
///
/// Built once from static configuration and never mutated. Every shape has
/// been checked and every id is unique.
pub struct ZoneSet {
    zones: Vec<Zone>,
    shapes: Vec<PreparedShape>,
    index: RTree<ZoneEntry>,
}

impl std::fmt::Debug for ZoneSet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ZoneSet").field("zones", &self.zones).finish()
    }
}

impl ZoneSet {
    /// Validates `zones` and builds the lookup index.
    ///
    /// # Errors
    ///
    /// * [`GeofenceError::InvalidShape`] if any polygon has fewer than 3
    ///   vertices or any circle has a non-positive radius.
    /// * [`GeofenceError::DuplicateZone`] if two zones share an id.
    pub fn new(zones: Vec<Zone>) -> Result<Self, GeofenceError> {
        let mut seen = BTreeSet::new();
        let mut shapes = Vec::with_capacity(zones.len());
        let mut entries = Vec::with_capacity(zones.len());

        for (index, zone) in zones.iter().enumerate() {
            if !seen.insert(zone.id.as_str()) {
                return Err(GeofenceError::DuplicateZone {
                    id: zone.id.clone(),
                });
            }
            validate_zone(zone)?;

            let (shape, envelope) = match &zone.shape {
                ZoneShape::Polygon { vertices } => (
                    PreparedShape::Polygon(to_ring(vertices)),
                    polygon_envelope(vertices),
                ),
                ZoneShape::Circle { center, radius_m } => (
                    PreparedShape::Circle {
                        center: *center,
                        radius_m: *radius_m,
                    },
                    circle_envelope(*center, *radius_m),
                ),
            };
            shapes.push(shape);
            entries.push(ZoneEntry { index, envelope });
        }

        log::debug!("Built zone set with {} zones", zones.len());

        Ok(Self {
            zones,
            shapes,
            index: RTree::bulk_load(entries),
        })
    }

    /// The zones in priority order.
    #[must_use]
    pub fn zones(&self) -> &[Zone] {
        &self.zones
    }

    /// Number of zones.
    #[must_use]
    pub fn len(&self) -> usize {
        self.zones.len()
    }

    /// Whether the set has no zones.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.zones.is_empty()
    }

    /// Looks up a zone by id.
    #[must_use]
    pub fn get(&self, id: &str) -> Option<&Zone> {
        self.zones.iter().find(|z| z.id == id)
    }

    /// Returns the first zone, in list order, whose shape contains `point`.
    ///
    /// `None` means "not in any defined zone", which is distinct from a zone
    /// with [`RiskLevel::Safe`](tourist_safety_geofence_models::RiskLevel::Safe).
    #[must_use]
    pub fn classify(&self, point: Coordinate) -> Option<&Zone> {
        let in_range = (-90.0..=90.0).contains(&point.lat) && (-180.0..=180.0).contains(&point.lng);
        if !in_range {
            // Envelopes assume normalized coordinates.
            return self.classify_linear(point);
        }

        let query = AABB::from_point([point.lng, point.lat]);
        self.index
            .locate_in_envelope_intersecting(&query)
            .filter(|entry| self.shapes[entry.index].contains(point))
            .map(|entry| entry.index)
            .min()
            .map(|index| &self.zones[index])
    }

    fn classify_linear(&self, point: Coordinate) -> Option<&Zone> {
        self.shapes
            .iter()
            .position(|shape| shape.contains(point))
            .map(|index| &self.zones[index])
    }
}

/// Returns the first zone in `zones` containing `point`.
#[must_use]
pub fn classify(point: Coordinate, zones: &ZoneSet) -> Option<&Zone> {
    zones.classify(point)
}

/// Checks a single zone's shape.
///
/// # Errors
///
/// Returns [`GeofenceError::InvalidShape`] naming the zone if its shape is
/// degenerate.
pub fn validate_zone(zone: &Zone) -> Result<(), GeofenceError> {
    let result = match &zone.shape {
        ZoneShape::Polygon { vertices } => validate_polygon(vertices),
        ZoneShape::Circle { radius_m, .. } => validate_circle(*radius_m),
    };
    result.map_err(|e| match e {
        GeofenceError::InvalidShape { message } => GeofenceError::InvalidShape {
            message: format!("zone '{}': {message}", zone.id),
        },
        other => other,
    })
}

fn polygon_envelope(vertices: &[Coordinate]) -> AABB<[f64; 2]> {
    let points: Vec<[f64; 2]> = vertices.iter().map(|c| [c.lng, c.lat]).collect();
    AABB::from_points(points.iter())
}

/// Lat/lng box guaranteed to hold every point within `radius_m` of
/// `center`. Falls back to the whole globe when the circle reaches a pole
/// or crosses the antimeridian.
fn circle_envelope(center: Coordinate, radius_m: f64) -> AABB<[f64; 2]> {
    let whole_globe = AABB::from_corners([-180.0, -90.0], [180.0, 90.0]);

    let angular = radius_m / EARTH_RADIUS_M;
    if angular >= std::f64::consts::FRAC_PI_2 {
        return whole_globe;
    }

    let padding = 1.0 + ENVELOPE_PADDING;
    let delta_lat = angular.to_degrees() * padding;
    let min_lat = center.lat - delta_lat;
    let max_lat = center.lat + delta_lat;
    if min_lat <= -90.0 || max_lat >= 90.0 {
        return whole_globe;
    }

    let ratio = angular.sin() / center.lat.to_radians().cos();
    if ratio >= 1.0 {
        return whole_globe;
    }
    let delta_lng = ratio.asin().to_degrees() * padding;
    let min_lng = center.lng - delta_lng;
    let max_lng = center.lng + delta_lng;
    if min_lng < -180.0 || max_lng > 180.0 {
        return whole_globe;
    }

    AABB::from_corners([min_lng, min_lat], [max_lng, max_lat])
}

#[cfg(test)]
mod tests {
    use tourist_safety_geofence_models::{RiskLevel, ZoneColor};

    use super::*;
    use crate::geometry::distance;

    fn polygon_zone(id: &str, risk_level: RiskLevel, vertices: &[(f64, f64)]) -> Zone {
        Zone {
            id: id.to_string(),
            name: format!("{id} name"),
            zone_type: "forest".to_string(),
            risk_level,
            shape: ZoneShape::Polygon {
                vertices: vertices.iter().copied().map(Coordinate::from).collect(),
            },
            color: ZoneColor::Yellow,
        }
    }

    fn circle_zone(id: &str, risk_level: RiskLevel, center: (f64, f64), radius_m: f64) -> Zone {
        Zone {
            id: id.to_string(),
            name: format!("{id} name"),
            zone_type: "safe".to_string(),
            risk_level,
            shape: ZoneShape::Circle {
                center: center.into(),
                radius_m,
            },
            color: ZoneColor::Green,
        }
    }

    const SQUARE: &[(f64, f64)] = &[(0.0, 0.0), (0.0, 10.0), (10.0, 10.0), (10.0, 0.0)];

    #[test]
    fn first_match_wins_regardless_of_severity() {
        let zones = ZoneSet::new(vec![
            polygon_zone("a", RiskLevel::Low, SQUARE),
            polygon_zone("b", RiskLevel::High, SQUARE),
        ])
        .unwrap();
        let zone = classify(Coordinate::new(5.0, 5.0), &zones).unwrap();
        assert_eq!(zone.id, "a");

        let reversed = ZoneSet::new(vec![
            polygon_zone("b", RiskLevel::High, SQUARE),
            polygon_zone("a", RiskLevel::Low, SQUARE),
        ])
        .unwrap();
        assert_eq!(reversed.classify(Coordinate::new(5.0, 5.0)).unwrap().id, "b");
    }

    #[test]
    fn nested_pocket_listed_first_takes_priority() {
        let zones = ZoneSet::new(vec![
            circle_zone("pocket", RiskLevel::High, (5.0, 5.0), 10_000.0),
            polygon_zone("boundary", RiskLevel::Moderate, SQUARE),
        ])
        .unwrap();
        assert_eq!(zones.classify(Coordinate::new(5.0, 5.0)).unwrap().id, "pocket");
        assert_eq!(
            zones.classify(Coordinate::new(2.0, 2.0)).unwrap().id,
            "boundary"
        );
    }

    #[test]
    fn no_match_is_none() {
        let zones = ZoneSet::new(vec![polygon_zone("a", RiskLevel::High, SQUARE)]).unwrap();
        assert!(zones.classify(Coordinate::new(20.0, 20.0)).is_none());
        assert!(ZoneSet::new(vec![]).unwrap().classify(Coordinate::new(0.0, 0.0)).is_none());
    }

    #[test]
    fn circle_zone_edge_matches_strict_containment() {
        let center = (26.1445, 91.7362);
        let zones =
            ZoneSet::new(vec![circle_zone("safe", RiskLevel::Safe, center, 10_000.0)]).unwrap();
        // 0.089 degrees of latitude is ~9.9 km, 0.091 is ~10.1 km.
        assert!(zones.classify(Coordinate::new(center.0 + 0.089, center.1)).is_some());
        assert!(zones.classify(Coordinate::new(center.0 + 0.091, center.1)).is_none());
        // East-west extent is wider in degrees than north-south.
        let east = Coordinate::new(center.0, center.1 + 0.099);
        assert!(distance(east, center.into()) < 10_000.0);
        assert!(zones.classify(east).is_some());
    }

    #[test]
    fn index_agrees_with_linear_scan() {
        let zones = ZoneSet::new(vec![
            circle_zone("c1", RiskLevel::Safe, (26.1445, 91.7362), 10_000.0),
            polygon_zone(
                "p1",
                RiskLevel::High,
                &[(26.3, 93.0), (26.4, 93.3), (26.2, 93.4), (26.1, 93.2)],
            ),
            circle_zone("c2", RiskLevel::Low, (25.8, 92.5), 5_000.0),
            circle_zone("polar", RiskLevel::Moderate, (89.5, 0.0), 200_000.0),
            circle_zone("dateline", RiskLevel::Low, (0.0, 179.99), 5_000.0),
        ])
        .unwrap();

        let mut lat = -89.0;
        while lat <= 89.5 {
            let mut lng = -179.995;
            while lng <= 180.0 {
                let p = Coordinate::new(lat, lng);
                assert_eq!(
                    zones.classify(p).map(|z| &z.id),
                    zones.classify_linear(p).map(|z| &z.id),
                    "{p}"
                );
                lng += 0.37;
            }
            lat += 0.53;
        }

        for p in [
            Coordinate::new(26.2, 93.25),
            Coordinate::new(26.15, 91.74),
            Coordinate::new(25.81, 92.51),
            Coordinate::new(89.9, 120.0),
            Coordinate::new(0.0, -179.999),
        ] {
            assert_eq!(
                zones.classify(p).map(|z| &z.id),
                zones.classify_linear(p).map(|z| &z.id),
                "{p}"
            );
        }
    }

    #[test]
    fn unnormalized_longitude_falls_back_to_linear_scan() {
        let zones = ZoneSet::new(vec![
            polygon_zone("a", RiskLevel::High, SQUARE),
            circle_zone("dateline", RiskLevel::Low, (0.0, 179.99), 5_000.0),
        ])
        .unwrap();

        // 180.02 is the same meridian as -179.98, about 3.3 km from the center.
        let wrapped = Coordinate::new(0.0, 180.02);
        assert_eq!(zones.classify(wrapped).map(|z| z.id.as_str()), Some("dateline"));
        assert_eq!(
            zones.classify(Coordinate::new(0.0, -179.98)).map(|z| z.id.as_str()),
            Some("dateline")
        );

        assert!(zones.classify(Coordinate::new(0.0, 200.0)).is_none());
        assert!(zones.classify(Coordinate::new(95.0, 5.0)).is_none());
    }

    #[test]
    fn self_intersecting_zone_uses_even_odd() {
        let star: Vec<(f64, f64)> = [0_u32, 2, 4, 1, 3]
            .iter()
            .map(|k| {
                let angle = (90.0 + 72.0 * f64::from(*k)).to_radians();
                (angle.sin(), angle.cos())
            })
            .collect();
        let zones = ZoneSet::new(vec![
            polygon_zone("star", RiskLevel::High, &star),
            circle_zone("around", RiskLevel::Safe, (0.0, 0.0), 500_000.0),
        ])
        .unwrap();

        assert_eq!(zones.classify(Coordinate::new(0.0, 0.0)).unwrap().id, "around");
        assert_eq!(zones.classify(Coordinate::new(0.8, 0.0)).unwrap().id, "star");
    }

    #[test]
    fn rejects_degenerate_shapes() {
        let err = ZoneSet::new(vec![polygon_zone(
            "thin",
            RiskLevel::Low,
            &[(0.0, 0.0), (1.0, 1.0)],
        )])
        .unwrap_err();
        assert!(matches!(err, GeofenceError::InvalidShape { ref message } if message.contains("thin")));

        let err =
            ZoneSet::new(vec![circle_zone("dot", RiskLevel::Low, (0.0, 0.0), 0.0)]).unwrap_err();
        assert!(matches!(err, GeofenceError::InvalidShape { .. }));
    }

    #[test]
    fn rejects_duplicate_ids() {
        let err = ZoneSet::new(vec![
            polygon_zone("a", RiskLevel::Low, SQUARE),
            circle_zone("a", RiskLevel::Safe, (0.0, 0.0), 10.0),
        ])
        .unwrap_err();
        assert_eq!(err, GeofenceError::DuplicateZone { id: "a".to_string() });
    }

    #[test]
    fn lookup_by_id() {
        let zones = ZoneSet::new(vec![polygon_zone("a", RiskLevel::Low, SQUARE)]).unwrap();
        assert_eq!(zones.len(), 1);
        assert!(!zones.is_empty());
        assert_eq!(zones.get("a").unwrap().risk_level, RiskLevel::Low);
        assert!(zones.get("missing").is_none());
    }
}
