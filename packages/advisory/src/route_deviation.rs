//! Planned-versus-actual route comparison for the monitoring side.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::AdvisoryError;
use crate::providers::LlmProvider;
use crate::response::request_json;

const SYSTEM_PROMPT: &str = "You are an assistant specializing in analyzing tourist routes \
and identifying deviations from planned itineraries. Respond with a single JSON object and \
nothing else.";

/// Route summaries handed to the model.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RouteDeviationInput {
    /// The planned itinerary with locations.
    pub planned_route: String,
    /// Where the traveller has actually been, with timestamps.
    pub actual_route: String,
    /// Identifier of the traveller.
    pub tourist_id: String,
}

/// The model's assessment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RouteDeviationOutput {
    /// Whether the traveller left the planned route.
    pub is_deviation: bool,
    /// Where and when the deviation happened.
    #[serde(default)]
    pub deviation_details: String,
    /// Potential risks of the deviation.
    #[serde(default)]
    pub risk_assessment: String,
}

fn build_prompt(input: &RouteDeviationInput) -> String {
    format!(
        "Determine whether the tourist has deviated from their planned route. If they have, \
describe the deviation, including its location and time, and assess the potential risks.

Planned Route: {planned}
Actual Route: {actual}
Tourist ID: {tourist}

Reply with JSON of the form:
{{\"isDeviation\": <true|false>, \"deviationDetails\": \"<details>\", \
\"riskAssessment\": \"<assessment>\"}}",
        planned = input.planned_route,
        actual = input.actual_route,
        tourist = input.tourist_id,
    )
}

/// Asks the model whether the actual route deviates from the plan.
///
/// # Errors
///
/// * [`AdvisoryError::Timeout`] if no reply arrives within `timeout`
/// * [`AdvisoryError::Parse`] if the reply is not the expected JSON shape
/// * any transport or provider error from `provider`
pub async fn analyze_route_deviation(
    provider: &dyn LlmProvider,
    input: &RouteDeviationInput,
    timeout: Duration,
) -> Result<RouteDeviationOutput, AdvisoryError> {
    log::debug!("Requesting route-deviation analysis for {}", input.tourist_id);
    request_json(provider, SYSTEM_PROMPT, &build_prompt(input), timeout).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::providers::{LlmResponse, StopReason};

    struct FixedProvider(Result<&'static str, &'static str>);

    #[async_trait::async_trait]
    impl LlmProvider for FixedProvider {
        async fn complete(
            &self,
            _system_prompt: &str,
            _prompt: &str,
        ) -> Result<LlmResponse, AdvisoryError> {
            match self.0 {
                Ok(text) => Ok(LlmResponse {
                    text: text.to_string(),
                    stop_reason: StopReason::EndTurn,
                }),
                Err(message) => Err(AdvisoryError::Provider {
                    message: message.to_string(),
                }),
            }
        }
    }

    fn input() -> RouteDeviationInput {
        RouteDeviationInput {
            planned_route: "Guwahati -> Kaziranga -> Shillong".to_string(),
            actual_route: "10:00 26.1445, 91.7362; 11:00 26.9000, 92.4000".to_string(),
            tourist_id: "T-001".to_string(),
        }
    }

    #[test]
    fn prompt_names_the_tourist() {
        let prompt = build_prompt(&input());
        assert!(prompt.contains("Tourist ID: T-001"));
        assert!(prompt.contains("Planned Route: Guwahati -> Kaziranga -> Shillong"));
    }

    #[tokio::test]
    async fn parses_assessment() {
        let provider = FixedProvider(Ok(
            r#"{"isDeviation": true, "deviationDetails": "Headed north at 11:00", "riskAssessment": "Enters a restricted area"}"#,
        ));
        let output = analyze_route_deviation(&provider, &input(), Duration::from_secs(5))
            .await
            .unwrap();
        assert!(output.is_deviation);
        assert_eq!(output.deviation_details, "Headed north at 11:00");
    }

    #[tokio::test]
    async fn no_deviation_may_omit_details() {
        let provider = FixedProvider(Ok(r#"{"isDeviation": false}"#));
        let output = analyze_route_deviation(&provider, &input(), Duration::from_secs(5))
            .await
            .unwrap();
        assert!(!output.is_deviation);
        assert!(output.deviation_details.is_empty());
    }

    #[tokio::test]
    async fn provider_errors_pass_through() {
        let provider = FixedProvider(Err("overloaded"));
        let err = analyze_route_deviation(&provider, &input(), Duration::from_secs(5))
            .await
            .unwrap_err();
        assert!(matches!(err, AdvisoryError::Provider { message } if message == "overloaded"));
    }
}
