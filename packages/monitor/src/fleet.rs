//! Operator view over many monitored travellers.
//!
//! Each traveller has their own [`SafetyMonitor`] and a status the operator
//! sees. Alerts raised by any monitor are copied into one fleet-wide feed,
//! newest first, with a headline naming the traveller.

use std::collections::{BTreeMap, VecDeque};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumString};
use tourist_safety_geofence::Coordinate;

use crate::{
    Alert, AlertKind, DEFAULT_ALERT_CAPACITY, MonitorError, SafetyMonitor, TickOutcome,
};

/// Where a traveller stands from the operator's point of view.
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
pub enum TouristStatus {
    /// Travelling normally.
    #[default]
    Active,
    /// Reported missing and not yet heard from.
    Missing,
    /// Asked for help and not yet resolved.
    #[serde(rename = "In-Distress")]
    #[strum(serialize = "In-Distress")]
    InDistress,
}

/// An alert in the fleet feed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FleetAlert {
    /// Traveller the alert belongs to.
    pub tourist_id: String,
    /// Operator-facing text naming the traveller.
    pub headline: String,
    /// The alert as the traveller's monitor recorded it.
    pub alert: Alert,
}

impl FleetAlert {
    fn new(tourist_id: &str, name: &str, alert: Alert) -> Self {
        let headline = match alert.kind {
            AlertKind::Sos => format!("{name} triggered an SOS!"),
            AlertKind::CheckInFailure => format!("{name} missed a safety check-in."),
            AlertKind::RouteDeviation => format!("{name} deviated from planned route."),
            AlertKind::Missing => format!("{name} reported as missing."),
            AlertKind::RiskZoneEntered => format!("{name}: {}", alert.message),
        };
        Self {
            tourist_id: tourist_id.to_string(),
            headline,
            alert,
        }
    }
}

/// A registered traveller.
#[derive(Debug)]
pub struct TrackedTourist {
    name: String,
    status: TouristStatus,
    monitor: SafetyMonitor,
}

impl TrackedTourist {
    /// Display name used in headlines.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Current operator-facing status.
    #[must_use]
    pub const fn status(&self) -> TouristStatus {
        self.status
    }

    /// The traveller's own monitor.
    #[must_use]
    pub const fn monitor(&self) -> &SafetyMonitor {
        &self.monitor
    }
}

/// Monitors keyed by tourist id, plus the combined alert feed.
#[derive(Debug)]
pub struct Fleet {
    tourists: BTreeMap<String, TrackedTourist>,
    feed: VecDeque<FleetAlert>,
    feed_capacity: usize,
}

impl Default for Fleet {
    fn default() -> Self {
        Self::with_feed_capacity(DEFAULT_ALERT_CAPACITY)
    }
}

impl Fleet {
    /// Creates an empty fleet with the default feed capacity.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an empty fleet whose feed keeps at most `capacity` alerts (at
    /// least one).
    #[must_use]
    pub fn with_feed_capacity(capacity: usize) -> Self {
        let feed_capacity = capacity.max(1);
        Self {
            tourists: BTreeMap::new(),
            feed: VecDeque::with_capacity(feed_capacity),
            feed_capacity,
        }
    }

    /// Adds a traveller with status [`TouristStatus::Active`].
    ///
    /// # Errors
    ///
    /// Returns [`MonitorError::DuplicateTourist`] if `id` is taken.
    pub fn register(
        &mut self,
        id: impl Into<String>,
        name: impl Into<String>,
        monitor: SafetyMonitor,
    ) -> Result<(), MonitorError> {
        let id = id.into();
        if self.tourists.contains_key(&id) {
            return Err(MonitorError::DuplicateTourist { id });
        }
        let name = name.into();
        log::info!("Registered tourist '{id}' ({name})");
        self.tourists.insert(
            id,
            TrackedTourist {
                name,
                status: TouristStatus::Active,
                monitor,
            },
        );
        Ok(())
    }

    /// Removes a traveller, returning their state.
    pub fn remove(&mut self, id: &str) -> Option<TrackedTourist> {
        self.tourists.remove(id)
    }

    /// Looks up a traveller by id.
    #[must_use]
    pub fn get(&self, id: &str) -> Option<&TrackedTourist> {
        self.tourists.get(id)
    }

    /// Status of a traveller, if registered.
    #[must_use]
    pub fn status(&self, id: &str) -> Option<TouristStatus> {
        self.tourists.get(id).map(TrackedTourist::status)
    }

    /// Travellers in id order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &TrackedTourist)> {
        self.tourists.iter().map(|(id, t)| (id.as_str(), t))
    }

    /// Number of travellers currently in `status`.
    #[must_use]
    pub fn count_with_status(&self, status: TouristStatus) -> usize {
        self.tourists.values().filter(|t| t.status == status).count()
    }

    /// Number of registered travellers.
    #[must_use]
    pub fn len(&self) -> usize {
        self.tourists.len()
    }

    /// Whether nobody is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tourists.is_empty()
    }

    /// The combined feed, newest first.
    pub fn alerts(&self) -> impl Iterator<Item = &FleetAlert> {
        self.feed.iter()
    }

    /// Runs [`SafetyMonitor::update`] for one traveller and copies its alerts
    /// into the feed.
    ///
    /// # Errors
    ///
    /// Returns [`MonitorError::UnknownTourist`] if `id` is not registered.
    pub fn update(
        &mut self,
        id: &str,
        position: Coordinate,
        now: DateTime<Utc>,
    ) -> Result<TickOutcome, MonitorError> {
        let tourist = self.tourist_mut(id)?;
        let outcome = tourist.monitor.update(position, now);
        let name = tourist.name.clone();
        for alert in &outcome.alerts {
            self.publish(FleetAlert::new(id, &name, alert.clone()));
        }
        Ok(outcome)
    }

    /// Records an SOS for the traveller and marks them in distress.
    ///
    /// # Errors
    ///
    /// Returns [`MonitorError::UnknownTourist`] if `id` is not registered.
    pub fn trigger_sos(
        &mut self,
        id: &str,
        now: DateTime<Utc>,
    ) -> Result<&FleetAlert, MonitorError> {
        let tourist = self.tourist_mut(id)?;
        tourist.status = TouristStatus::InDistress;
        let alert = tourist.monitor.trigger_sos(now).clone();
        let entry = FleetAlert::new(id, &tourist.name, alert);
        Ok(self.publish(entry))
    }

    /// Confirms a check-in. A traveller reported missing is active again.
    ///
    /// # Errors
    ///
    /// Returns [`MonitorError::UnknownTourist`] if `id` is not registered.
    pub fn check_in(&mut self, id: &str, now: DateTime<Utc>) -> Result<(), MonitorError> {
        let tourist = self.tourist_mut(id)?;
        tourist.monitor.check_in(now);
        if tourist.status == TouristStatus::Missing {
            log::info!("Tourist '{id}' checked in after being reported missing");
            tourist.status = TouristStatus::Active;
        }
        Ok(())
    }

    /// Polls every traveller's check-in deadline and returns the failures
    /// newly recorded at `now`, in id order.
    pub fn poll_check_ins(&mut self, now: DateTime<Utc>) -> Vec<FleetAlert> {
        let missed: Vec<FleetAlert> = self
            .tourists
            .iter_mut()
            .filter_map(|(id, t)| {
                t.monitor
                    .poll_check_in(now)
                    .map(|alert| FleetAlert::new(id, &t.name, alert))
            })
            .collect();
        for entry in &missed {
            self.publish(entry.clone());
        }
        missed
    }

    /// Marks the traveller missing and records it in the feed.
    ///
    /// # Errors
    ///
    /// Returns [`MonitorError::UnknownTourist`] if `id` is not registered.
    pub fn report_missing(
        &mut self,
        id: &str,
        now: DateTime<Utc>,
    ) -> Result<&FleetAlert, MonitorError> {
        let tourist = self.tourist_mut(id)?;
        tourist.status = TouristStatus::Missing;
        let alert = Alert::new(
            now,
            AlertKind::Missing,
            AlertKind::Missing.tier(),
            "Reported as missing.".to_string(),
            None,
        );
        let entry = FleetAlert::new(id, &tourist.name, alert);
        Ok(self.publish(entry))
    }

    /// Returns the traveller to [`TouristStatus::Active`].
    ///
    /// # Errors
    ///
    /// Returns [`MonitorError::UnknownTourist`] if `id` is not registered.
    pub fn resolve(&mut self, id: &str) -> Result<(), MonitorError> {
        let tourist = self.tourist_mut(id)?;
        log::info!("Tourist '{id}' resolved from {}", tourist.status);
        tourist.status = TouristStatus::Active;
        Ok(())
    }

    /// Releases the advisory gate for `zone_id` on the traveller's monitor.
    ///
    /// # Errors
    ///
    /// Returns [`MonitorError::UnknownTourist`] if `id` is not registered.
    pub fn advisory_finished(&mut self, id: &str, zone_id: &str) -> Result<(), MonitorError> {
        self.tourist_mut(id)?.monitor.advisory_finished(zone_id);
        Ok(())
    }

    /// Mutable access to one traveller's monitor, e.g. to enable check-ins.
    ///
    /// # Errors
    ///
    /// Returns [`MonitorError::UnknownTourist`] if `id` is not registered.
    pub fn monitor_mut(&mut self, id: &str) -> Result<&mut SafetyMonitor, MonitorError> {
        Ok(&mut self.tourist_mut(id)?.monitor)
    }

    fn tourist_mut(&mut self, id: &str) -> Result<&mut TrackedTourist, MonitorError> {
        self.tourists
            .get_mut(id)
            .ok_or_else(|| MonitorError::UnknownTourist { id: id.to_string() })
    }

    fn publish(&mut self, entry: FleetAlert) -> &FleetAlert {
        log::info!("[{}] {}", entry.alert.tier, entry.headline);
        if self.feed.len() == self.feed_capacity {
            self.feed.pop_back();
        }
        self.feed.push_front(entry);
        &self.feed[0]
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;
    use tourist_safety_scenario::registry::{DEFAULT_SCENARIO_ID, find_scenario};

    use super::*;
    use crate::{AlertTier, DEFAULT_CHECK_IN_INTERVAL};

    const GUWAHATI: Coordinate = Coordinate {
        lat: 26.1445,
        lng: 91.7362,
    };
    const NORTH_OF_ROUTE: Coordinate = Coordinate {
        lat: 26.9,
        lng: 92.4,
    };

    fn at(minute: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 3, 1, 9, minute, 0).unwrap()
    }

    fn monitor() -> SafetyMonitor {
        SafetyMonitor::new(find_scenario(DEFAULT_SCENARIO_ID).unwrap())
    }

    fn fleet() -> Fleet {
        let mut fleet = Fleet::new();
        fleet.register("T-001", "Asha", monitor()).unwrap();
        fleet.register("T-002", "Ben", monitor()).unwrap();
        fleet
    }

    fn headlines(fleet: &Fleet) -> Vec<&str> {
        fleet.alerts().map(|a| a.headline.as_str()).collect()
    }

    #[test]
    fn rejects_duplicate_and_unknown_ids() {
        let mut fleet = fleet();
        assert!(matches!(
            fleet.register("T-001", "Again", monitor()),
            Err(MonitorError::DuplicateTourist { id }) if id == "T-001"
        ));
        assert!(matches!(
            fleet.update("T-404", GUWAHATI, at(0)),
            Err(MonitorError::UnknownTourist { id }) if id == "T-404"
        ));
        assert!(fleet.trigger_sos("T-404", at(0)).is_err());
        assert_eq!(fleet.len(), 2);

        let ids: Vec<&str> = fleet.iter().map(|(id, _)| id).collect();
        assert_eq!(ids, vec!["T-001", "T-002"]);

        assert_eq!(fleet.remove("T-002").unwrap().name(), "Ben");
        assert!(fleet.status("T-002").is_none());
        fleet.remove("T-001");
        assert!(fleet.is_empty());
    }

    #[test]
    fn travellers_are_monitored_independently() {
        let mut fleet = fleet();
        fleet.update("T-001", GUWAHATI, at(0)).unwrap();
        fleet.update("T-002", GUWAHATI, at(0)).unwrap();

        let outcome = fleet.update("T-002", NORTH_OF_ROUTE, at(1)).unwrap();
        assert!(outcome.snapshot.deviated);

        assert!(fleet.get("T-001").unwrap().monitor().alerts().is_empty());
        assert_eq!(fleet.get("T-002").unwrap().monitor().alerts().len(), 1);
        assert_eq!(headlines(&fleet), vec!["Ben deviated from planned route."]);
        assert_eq!(fleet.alerts().next().unwrap().tourist_id, "T-002");
    }

    #[test]
    fn sos_marks_in_distress_until_resolved() {
        let mut fleet = fleet();
        let entry = fleet.trigger_sos("T-001", at(0)).unwrap();
        assert_eq!(entry.headline, "Asha triggered an SOS!");
        assert_eq!(entry.alert.tier, AlertTier::Critical);

        assert_eq!(fleet.status("T-001"), Some(TouristStatus::InDistress));
        assert_eq!(fleet.count_with_status(TouristStatus::Active), 1);

        // A check-in does not clear distress.
        fleet.check_in("T-001", at(1)).unwrap();
        assert_eq!(fleet.status("T-001"), Some(TouristStatus::InDistress));

        fleet.resolve("T-001").unwrap();
        assert_eq!(fleet.status("T-001"), Some(TouristStatus::Active));
    }

    #[test]
    fn missing_cleared_by_check_in() {
        let mut fleet = fleet();
        let entry = fleet.report_missing("T-002", at(0)).unwrap();
        assert_eq!(entry.headline, "Ben reported as missing.");
        assert_eq!(entry.alert.tier, AlertTier::Info);
        assert_eq!(fleet.count_with_status(TouristStatus::Missing), 1);

        fleet.check_in("T-002", at(1)).unwrap();
        assert_eq!(fleet.status("T-002"), Some(TouristStatus::Active));
    }

    #[test]
    fn poll_reports_only_overdue_travellers() {
        let mut fleet = fleet();
        for id in ["T-001", "T-002"] {
            fleet
                .monitor_mut(id)
                .unwrap()
                .enable_check_ins(DEFAULT_CHECK_IN_INTERVAL, at(0))
                .unwrap();
        }
        fleet.check_in("T-001", at(2)).unwrap();

        let missed = fleet.poll_check_ins(at(3));
        assert_eq!(missed.len(), 1);
        assert_eq!(missed[0].tourist_id, "T-002");
        assert_eq!(missed[0].headline, "Ben missed a safety check-in.");
        assert_eq!(missed[0].alert.tier, AlertTier::High);

        assert!(fleet.poll_check_ins(at(4)).is_empty());
        assert_eq!(fleet.alerts().count(), 1);
    }

    #[test]
    fn feed_is_bounded_newest_first() {
        let mut fleet = Fleet::with_feed_capacity(2);
        fleet.register("T-001", "Asha", monitor()).unwrap();
        for minute in 0..3 {
            fleet.trigger_sos("T-001", at(minute)).unwrap();
        }
        let times: Vec<DateTime<Utc>> = fleet.alerts().map(|a| a.alert.timestamp).collect();
        assert_eq!(times, vec![at(2), at(1)]);
    }

    #[test]
    fn status_names() {
        assert_eq!(TouristStatus::InDistress.to_string(), "In-Distress");
        assert_eq!(
            serde_json::to_value(TouristStatus::InDistress).unwrap(),
            "In-Distress"
        );
        assert_eq!(
            "Missing".parse::<TouristStatus>().unwrap(),
            TouristStatus::Missing
        );
    }
}
