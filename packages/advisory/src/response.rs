//! Getting a typed JSON answer out of a free-text model reply.

use std::time::Duration;

use serde::de::DeserializeOwned;

use crate::AdvisoryError;
use crate::providers::{LlmProvider, StopReason};

/// Sends one prompt, bounded by `timeout`, and parses the reply as `T`.
pub(crate) async fn request_json<T: DeserializeOwned>(
    provider: &dyn LlmProvider,
    system_prompt: &str,
    prompt: &str,
    timeout: Duration,
) -> Result<T, AdvisoryError> {
    let response = tokio::time::timeout(timeout, provider.complete(system_prompt, prompt))
        .await
        .map_err(|_| AdvisoryError::Timeout { timeout })??;

    if response.stop_reason == StopReason::MaxTokens {
        log::debug!("Model reply hit the token limit; attempting to parse anyway");
    }

    parse_reply(&response.text)
}

/// Parses the first JSON object found in `text`.
///
/// Models often wrap the object in a Markdown code fence or a sentence of
/// prose; everything outside the outermost braces is ignored.
pub(crate) fn parse_reply<T: DeserializeOwned>(text: &str) -> Result<T, AdvisoryError> {
    let json = extract_json_object(text).ok_or_else(|| AdvisoryError::Parse {
        message: format!("no JSON object in reply: {}", preview(text)),
    })?;

    serde_json::from_str(json).map_err(|e| AdvisoryError::Parse {
        message: format!("{e} in reply: {}", preview(text)),
    })
}

fn extract_json_object(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let end = text.rfind('}')?;
    (end > start).then(|| &text[start..=end])
}

fn preview(text: &str) -> String {
    const MAX_CHARS: usize = 120;
    let trimmed = text.trim();
    if trimmed.chars().count() > MAX_CHARS {
        let head: String = trimmed.chars().take(MAX_CHARS).collect();
        format!("{head}...")
    } else {
        trimmed.to_string()
    }
}
