//! `GeoJSON` rendering of a scenario for map layers.
//!
//! Polygons become `Polygon` features, circles become `Point` features with
//! a `radiusM` property (`GeoJSON` has no circle primitive), and the route
//! becomes a single `LineString` feature. Coordinates are written in
//! `GeoJSON` order, longitude first.

use geojson::feature::Id;
use geojson::{Feature, FeatureCollection, Geometry, JsonObject, Value};
use serde_json::json;
use tourist_safety_geofence_models::{Coordinate, Zone, ZoneShape};

use crate::Scenario;

/// Builds a feature collection with one feature per zone followed by the
/// route.
#[must_use]
pub fn to_feature_collection(scenario: &Scenario) -> FeatureCollection {
    let mut features: Vec<Feature> = scenario.zones().zones().iter().map(zone_feature).collect();
    features.push(route_feature(scenario));

    FeatureCollection {
        bbox: None,
        features,
        foreign_members: None,
    }
}

fn zone_feature(zone: &Zone) -> Feature {
    let mut properties = JsonObject::new();
    properties.insert("feature".to_string(), json!("zone"));
    properties.insert("name".to_string(), json!(zone.name));
    properties.insert("type".to_string(), json!(zone.zone_type));
    properties.insert("riskLevel".to_string(), json!(zone.risk_level.as_ref()));
    properties.insert("color".to_string(), json!(zone.color.as_ref()));

    let value = match &zone.shape {
        ZoneShape::Polygon { vertices } => {
            let exterior: geo::LineString<f64> = vertices.iter().copied().map(to_xy).collect();
            Value::from(&geo::Polygon::new(exterior, vec![]))
        }
        ZoneShape::Circle { center, radius_m } => {
            properties.insert("radiusM".to_string(), json!(radius_m));
            Value::from(&geo::Point::from(to_xy(*center)))
        }
    };

    Feature {
        bbox: None,
        geometry: Some(Geometry::new(value)),
        id: Some(Id::String(zone.id.clone())),
        properties: Some(properties),
        foreign_members: None,
    }
}

fn route_feature(scenario: &Scenario) -> Feature {
    let line: geo::LineString<f64> = scenario.route().points().iter().copied().map(to_xy).collect();

    let mut properties = JsonObject::new();
    properties.insert("feature".to_string(), json!("route"));
    properties.insert("waypoints".to_string(), json!(scenario.waypoint_names()));

    Feature {
        bbox: None,
        geometry: Some(Geometry::new(Value::from(&line))),
        id: Some(Id::String(format!("{}-route", scenario.id()))),
        properties: Some(properties),
        foreign_members: None,
    }
}

const fn to_xy(c: Coordinate) -> (f64, f64) {
    (c.lng, c.lat)
}
