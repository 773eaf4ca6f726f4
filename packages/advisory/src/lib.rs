#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! LLM-backed safety advisories.
//!
//! Turns a risk-zone entry into a human-readable alert with recommended
//! actions, and a planned-versus-actual route summary into a deviation
//! assessment. Supports Anthropic Claude and `OpenAI` (or any
//! `OpenAI`-compatible local/self-hosted server via `AI_BASE_URL`).
//!
//! Every request is bounded by a caller-supplied timeout and is never
//! retried; dropping the returned future cancels it. Deciding *when* to ask
//! for an advisory, and suppressing duplicates, is up to the caller.

pub mod providers;
mod response;
pub mod risk_zone;
pub mod route_deviation;

use std::time::Duration;

use thiserror::Error;

pub use risk_zone::{RiskZoneAlertInput, RiskZoneAlertOutput, generate_risk_zone_alert};
pub use route_deviation::{RouteDeviationInput, RouteDeviationOutput, analyze_route_deviation};

/// Timeout applied by callers that have no better figure.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Errors that can occur while generating an advisory.
#[derive(Debug, Error)]
pub enum AdvisoryError {
    /// HTTP request to LLM provider failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON serialization/deserialization failed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Provider-specific error.
    #[error("Provider error: {message}")]
    Provider {
        /// Description of what went wrong.
        message: String,
    },

    /// Configuration error.
    #[error("Configuration error: {message}")]
    Config {
        /// Description.
        message: String,
    },

    /// The model answered but not in the requested shape.
    #[error("Could not parse model output: {message}")]
    Parse {
        /// Description.
        message: String,
    },

    /// The provider did not answer within the allotted time.
    #[error("Advisory request timed out after {timeout:?}")]
    Timeout {
        /// The timeout that elapsed.
        timeout: Duration,
    },
}
