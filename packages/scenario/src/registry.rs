//! Scenario registry — built-in scenarios embedded from TOML configs.
//!
//! Each `.toml` file in `packages/scenario/scenarios/` is baked into the
//! binary at compile time via [`include_str!`]. Adding a scenario means
//! adding a file and an entry below.

use crate::{Scenario, ScenarioDefinition, ScenarioError, parse_scenario_toml};

/// TOML configs embedded at compile time.
const SCENARIO_TOMLS: &[(&str, &str)] = &[(
    "northeast_india",
    include_str!("../scenarios/northeast_india.toml"),
)];

/// Id of the scenario used when none is requested.
pub const DEFAULT_SCENARIO_ID: &str = "northeast_india";

/// Returns all built-in scenario definitions, parsed from embedded TOML.
///
/// # Panics
///
/// Panics if any embedded TOML config is malformed (the configs ship with
/// the binary, so this is caught by the tests below).
#[must_use]
pub fn all_scenarios() -> Vec<ScenarioDefinition> {
    SCENARIO_TOMLS
        .iter()
        .map(|(name, toml)| {
            parse_scenario_toml(toml).unwrap_or_else(|e| panic!("Failed to parse {name}.toml: {e}"))
        })
        .collect()
}

/// Loads and validates the built-in scenario with the given id.
///
/// # Errors
///
/// * [`ScenarioError::UnknownScenario`] if no built-in scenario has `id`.
/// * Any validation error from [`Scenario::from_definition`].
pub fn find_scenario(id: &str) -> Result<Scenario, ScenarioError> {
    let definition = all_scenarios()
        .into_iter()
        .find(|s| s.id == id)
        .ok_or_else(|| ScenarioError::UnknownScenario { id: id.to_string() })?;
    Scenario::from_definition(definition)
}

#[cfg(test)]
mod tests {
    use tourist_safety_geofence::{Coordinate, RiskLevel, evaluate};

    use super::*;

    #[test]
    fn all_builtin_scenarios_validate() {
        let scenarios = all_scenarios();
        assert_eq!(scenarios.len(), SCENARIO_TOMLS.len());
        for definition in scenarios {
            let id = definition.id.clone();
            Scenario::from_definition(definition)
                .unwrap_or_else(|e| panic!("scenario {id} failed validation: {e}"));
        }
    }

    #[test]
    fn scenario_ids_are_unique() {
        let scenarios = all_scenarios();
        let mut ids: Vec<&str> = scenarios.iter().map(|s| s.id.as_str()).collect();
        ids.sort_unstable();
        ids.dedup();
        assert_eq!(ids.len(), SCENARIO_TOMLS.len());
    }

    #[test]
    fn default_scenario_exists() {
        let scenario = find_scenario(DEFAULT_SCENARIO_ID).unwrap();
        assert_eq!(scenario.waypoint_names(), ["Guwahati", "Kaziranga", "Shillong"]);
        assert_eq!(scenario.zones().len(), 5);
    }

    #[test]
    fn unknown_scenario_is_reported() {
        assert!(matches!(
            find_scenario("atlantis"),
            Err(ScenarioError::UnknownScenario { .. })
        ));
    }

    #[test]
    fn northeast_india_zones_classify_as_configured() {
        let scenario = find_scenario(DEFAULT_SCENARIO_ID).unwrap();
        let cases = [
            (Coordinate::new(26.25, 93.2), Some("tribal-area-1"), RiskLevel::High),
            (Coordinate::new(26.6, 93.3), Some("forest-kaziranga"), RiskLevel::Moderate),
            (Coordinate::new(25.8, 92.5), Some("highway-spot-1"), RiskLevel::Low),
            (Coordinate::new(26.1445, 91.7362), Some("safe-guwahati"), RiskLevel::Safe),
        ];
        for (point, expected_id, expected_risk) in cases {
            let state = evaluate(
                point,
                scenario.zones(),
                scenario.route(),
                scenario.deviation_threshold_m(),
            );
            let zone = state.zone.unwrap();
            assert_eq!(Some(zone.id.as_str()), expected_id, "{point}");
            assert_eq!(zone.risk_level, expected_risk);
            assert_eq!(state.score, expected_risk.score());
        }

        // Open country between Guwahati and Kaziranga, on the route.
        let state = evaluate(
            Coordinate::new(26.36, 92.45),
            scenario.zones(),
            scenario.route(),
            scenario.deviation_threshold_m(),
        );
        assert!(state.zone.is_none());
        assert_eq!(state.score, 8);
    }
}
