//! Bounded, newest-first history of user-facing alerts.

use std::collections::VecDeque;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumString};
use tourist_safety_geofence::RiskLevel;
use uuid::Uuid;

/// Number of alerts kept when no capacity is given.
pub const DEFAULT_ALERT_CAPACITY: usize = 50;

/// What raised an alert.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
pub enum AlertKind {
    /// The traveller asked for help.
    #[serde(rename = "SOS")]
    #[strum(serialize = "SOS")]
    Sos,
    /// A check-in deadline passed without confirmation.
    #[serde(rename = "Check-in Failure")]
    #[strum(serialize = "Check-in Failure")]
    CheckInFailure,
    /// The position moved beyond the deviation threshold.
    #[serde(rename = "Route Deviation")]
    #[strum(serialize = "Route Deviation")]
    RouteDeviation,
    /// The traveller was reported missing.
    #[serde(rename = "Missing")]
    #[strum(serialize = "Missing")]
    Missing,
    /// Entry into a zone whose risk level is above safe.
    #[serde(rename = "Risk Zone Entered")]
    #[strum(serialize = "Risk Zone Entered")]
    RiskZoneEntered,
}

impl AlertKind {
    /// Tier an alert of this kind is raised at.
    ///
    /// Zone entries depend on the zone, see [`AlertTier::for_risk_level`];
    /// this returns their ceiling.
    #[must_use]
    pub const fn tier(self) -> AlertTier {
        match self {
            Self::Sos => AlertTier::Critical,
            Self::CheckInFailure | Self::RiskZoneEntered => AlertTier::High,
            Self::RouteDeviation => AlertTier::Medium,
            Self::Missing => AlertTier::Info,
        }
    }
}

/// Urgency of an alert, ordered `Info < Medium < High < Critical`.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
#[serde(rename_all = "UPPERCASE")]
#[strum(serialize_all = "UPPERCASE")]
pub enum AlertTier {
    /// For the record; no action expected.
    Info,
    /// Worth a look when convenient.
    Medium,
    /// Needs prompt attention.
    High,
    /// Needs immediate response.
    Critical,
}

impl AlertTier {
    /// Tier for entering a zone of `risk_level`. Safe zones are not alerted
    /// but map to [`AlertTier::Info`].
    #[must_use]
    pub const fn for_risk_level(risk_level: RiskLevel) -> Self {
        match risk_level {
            RiskLevel::Safe | RiskLevel::Low => Self::Info,
            RiskLevel::Moderate => Self::Medium,
            RiskLevel::High => Self::High,
        }
    }
}

/// A single logged alert.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Alert {
    /// Unique per alert, including alerts recorded in the same instant.
    pub id: Uuid,
    /// Caller-supplied time the alert was raised.
    pub timestamp: DateTime<Utc>,
    /// What raised the alert.
    #[serde(rename = "type")]
    pub kind: AlertKind,
    /// Urgency at the time it was raised.
    pub tier: AlertTier,
    /// Text shown to the user or operator.
    pub message: String,
    /// Zone that raised the alert, for zone entries.
    pub zone_id: Option<String>,
}

impl Alert {
    /// Creates an alert with a fresh id.
    #[must_use]
    pub fn new(
        timestamp: DateTime<Utc>,
        kind: AlertKind,
        tier: AlertTier,
        message: String,
        zone_id: Option<String>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            timestamp,
            kind,
            tier,
            message,
            zone_id,
        }
    }
}

/// Alerts kept newest first, evicting the oldest beyond a fixed capacity.
#[derive(Debug, Clone)]
pub struct AlertLog {
    entries: VecDeque<Alert>,
    capacity: usize,
}

impl Default for AlertLog {
    fn default() -> Self {
        Self::with_capacity(DEFAULT_ALERT_CAPACITY)
    }
}

impl AlertLog {
    /// Creates an empty log that keeps at most `capacity` alerts (at least
    /// one).
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            entries: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// Records an alert, evicting the oldest once full, and returns it.
    pub fn record(
        &mut self,
        timestamp: DateTime<Utc>,
        kind: AlertKind,
        tier: AlertTier,
        message: String,
        zone_id: Option<String>,
    ) -> &Alert {
        if self.entries.len() == self.capacity {
            self.entries.pop_back();
        }
        self.entries
            .push_front(Alert::new(timestamp, kind, tier, message, zone_id));
        &self.entries[0]
    }

    /// Alerts, newest first.
    pub fn iter(&self) -> impl Iterator<Item = &Alert> {
        self.entries.iter()
    }

    /// Most recently recorded alert.
    #[must_use]
    pub fn latest(&self) -> Option<&Alert> {
        self.entries.front()
    }

    /// Number of alerts currently kept.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether nothing has been recorded yet.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
