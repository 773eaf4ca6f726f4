//! Edge detection between consecutive safety evaluations.

use tourist_safety_geofence_models::{SafetySnapshot, SafetyTransition};

/// Lists what changed from `previous` to `current`.
///
/// Zone changes are keyed on zone id and produce an exit (if a zone was
/// left) followed by an entry (if one was entered). Deviation changes
/// follow. With no previous snapshot the prior state is taken to be
/// "outside every zone, on route", so a first fix inside a zone reports an
/// entry.
#[must_use]
pub fn diff(previous: Option<&SafetySnapshot>, current: &SafetySnapshot) -> Vec<SafetyTransition> {
    let mut transitions = Vec::new();

    let previous_zone = previous.and_then(|p| p.zone.as_ref());
    let previous_id = previous_zone.map(|z| z.id.as_str());

    if previous_id != current.zone_id() {
        if let Some(left) = previous_zone {
            transitions.push(SafetyTransition::ZoneExited { zone: left.clone() });
        }
        if let Some(entered) = &current.zone {
            transitions.push(SafetyTransition::ZoneEntered {
                zone: entered.clone(),
            });
        }
    }

    let was_deviated = previous.is_some_and(|p| p.deviated);
    match (was_deviated, current.deviated) {
        (false, true) => transitions.push(SafetyTransition::DeviationStarted {
            distance_m: current.distance_to_route_m(),
        }),
        (true, false) => transitions.push(SafetyTransition::DeviationCleared {
            distance_m: current.distance_to_route_m(),
        }),
        _ => {}
    }

    transitions
}

#[cfg(test)]
mod tests {
    use tourist_safety_geofence_models::{Coordinate, NearestPoint, RiskLevel, ZoneSummary};

    use super::*;

    fn summary(id: &str, risk_level: RiskLevel) -> ZoneSummary {
        ZoneSummary {
            id: id.to_string(),
            name: id.to_string(),
            zone_type: "forest".to_string(),
            risk_level,
        }
    }

    fn snapshot(zone: Option<ZoneSummary>, deviated: bool, distance_m: f64) -> SafetySnapshot {
        let score = zone.as_ref().map_or(8, |z| z.risk_level.score());
        SafetySnapshot {
            zone,
            score,
            deviated,
            nearest: NearestPoint {
                distance_m,
                point: Coordinate::new(0.0, 0.0),
                segment_index: 0,
            },
        }
    }

    #[test]
    fn first_fix_inside_zone_is_an_entry() {
        let current = snapshot(Some(summary("forest", RiskLevel::Moderate)), false, 10.0);
        assert_eq!(
            diff(None, &current),
            vec![SafetyTransition::ZoneEntered {
                zone: summary("forest", RiskLevel::Moderate)
            }]
        );
    }

    #[test]
    fn first_fix_outside_everything_is_quiet() {
        assert!(diff(None, &snapshot(None, false, 10.0)).is_empty());
    }

    #[test]
    fn unchanged_zone_is_quiet() {
        let a = snapshot(Some(summary("forest", RiskLevel::Moderate)), false, 10.0);
        let b = snapshot(Some(summary("forest", RiskLevel::Moderate)), false, 50.0);
        assert!(diff(Some(&a), &b).is_empty());
    }

    #[test]
    fn zone_change_is_exit_then_entry() {
        let a = snapshot(Some(summary("safe-city", RiskLevel::Safe)), false, 0.0);
        let b = snapshot(Some(summary("tribal", RiskLevel::High)), false, 0.0);
        assert_eq!(
            diff(Some(&a), &b),
            vec![
                SafetyTransition::ZoneExited {
                    zone: summary("safe-city", RiskLevel::Safe)
                },
                SafetyTransition::ZoneEntered {
                    zone: summary("tribal", RiskLevel::High)
                },
            ]
        );
    }

    #[test]
    fn leaving_into_open_country_is_exit_only() {
        let a = snapshot(Some(summary("tribal", RiskLevel::High)), false, 0.0);
        let b = snapshot(None, false, 0.0);
        assert_eq!(
            diff(Some(&a), &b),
            vec![SafetyTransition::ZoneExited {
                zone: summary("tribal", RiskLevel::High)
            }]
        );
    }

    #[test]
    fn deviation_edges() {
        let on_route = snapshot(None, false, 100.0);
        let off_route = snapshot(None, true, 3000.0);

        assert_eq!(
            diff(Some(&on_route), &off_route),
            vec![SafetyTransition::DeviationStarted { distance_m: 3000.0 }]
        );
        assert!(diff(Some(&off_route), &off_route).is_empty());
        assert_eq!(
            diff(Some(&off_route), &on_route),
            vec![SafetyTransition::DeviationCleared { distance_m: 100.0 }]
        );
        assert_eq!(
            diff(None, &off_route),
            vec![SafetyTransition::DeviationStarted { distance_m: 3000.0 }]
        );
    }
}
