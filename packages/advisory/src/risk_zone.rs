//! Alert text and recommended actions for a traveller entering a risk zone.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::AdvisoryError;
use crate::providers::LlmProvider;
use crate::response::request_json;

const SYSTEM_PROMPT: &str = "You are an assistant that provides safety advice to tourists. \
Respond with a single JSON object and nothing else.";

/// What the model is told about the zone being entered.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RiskZoneAlertInput {
    /// Kind of zone, e.g. `"restricted tribal area"` or `"forest"`.
    pub zone_type: String,
    /// Current position, e.g. `"26.3000, 93.2000"`.
    pub location: String,
    /// `"high"`, `"moderate"`, or `"low"`.
    pub risk_level: String,
    /// Named area, e.g. `"Kaziranga National Park"`.
    pub region: String,
}

/// Advice to show the traveller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RiskZoneAlertOutput {
    /// A detailed message describing the risk.
    pub alert_message: String,
    /// Specific steps the traveller should take.
    #[serde(default)]
    pub recommended_actions: Vec<String>,
}

fn build_prompt(input: &RiskZoneAlertInput) -> String {
    format!(
        "A tourist is entering a risk zone. Based on the zone type, location, risk level, \
and region, generate an alert message and a list of recommended actions.

Zone Type: {zone_type}
Location: {location}
Risk Level: {risk_level}
Region: {region}

Reply with JSON of the form:
{{\"alertMessage\": \"<detailed message describing the specific risks of the zone>\", \
\"recommendedActions\": [\"<specific, actionable step>\", ...]}}",
        zone_type = input.zone_type,
        location = input.location,
        risk_level = input.risk_level,
        region = input.region,
    )
}

/// Asks the model for an alert message and recommended actions.
///
/// # Errors
///
/// * [`AdvisoryError::Timeout`] if no reply arrives within `timeout`
/// * [`AdvisoryError::Parse`] if the reply is not the expected JSON shape
/// * any transport or provider error from `provider`
pub async fn generate_risk_zone_alert(
    provider: &dyn LlmProvider,
    input: &RiskZoneAlertInput,
    timeout: Duration,
) -> Result<RiskZoneAlertOutput, AdvisoryError> {
    log::debug!(
        "Requesting risk-zone alert for {} ({} risk)",
        input.region,
        input.risk_level
    );
    request_json(provider, SYSTEM_PROMPT, &build_prompt(input), timeout).await
}
