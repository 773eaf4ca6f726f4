#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]
#![warn(missing_docs)]

//! Stateful wrapper around the geofence engine for monitored travellers.
//!
//! [`SafetyMonitor`] keeps what the pure evaluation functions do not: the
//! previous snapshot, a log of alerts shown to the user, a short track of
//! recent positions, the check-in schedule, and which zones already have an
//! advisory request outstanding. Advisory requests are returned to the caller
//! rather than executed, so the monitor itself never blocks or performs I/O.
//! Every time-dependent call takes `now` from the caller.
//!
//! [`Fleet`] holds one monitor per traveller for an operator view.

pub mod alerts;
pub mod checkin;
pub mod fleet;
pub mod gate;
pub mod simulator;

use std::collections::VecDeque;

use chrono::{DateTime, TimeDelta, Utc};
use thiserror::Error;
use tourist_safety_advisory::{RiskZoneAlertInput, RouteDeviationInput};
use tourist_safety_geofence::{
    Coordinate, RiskLevel, SafetySnapshot, SafetyTransition, TripStatus, ZoneSummary, diff,
    evaluate, trip_status,
};
use tourist_safety_scenario::Scenario;

pub use alerts::{Alert, AlertKind, AlertLog, AlertTier, DEFAULT_ALERT_CAPACITY};
pub use checkin::{CheckInSchedule, DEFAULT_CHECK_IN_INTERVAL};
pub use fleet::{Fleet, FleetAlert, TouristStatus, TrackedTourist};
pub use gate::AdvisoryGate;
pub use simulator::{Bounds, PositionSimulator, SimulatorConfig};

/// Number of recent positions kept when no capacity is given.
pub const DEFAULT_TRACK_CAPACITY: usize = 100;

const DEVIATION_MESSAGE: &str = "You have deviated from the planned route.";
const CHECK_IN_MISSED_MESSAGE: &str = "Missed a safety check-in.";

/// Errors from configuring or addressing monitors.
#[derive(Debug, Error)]
pub enum MonitorError {
    /// Simulator settings are out of range.
    #[error("Invalid simulator configuration: {message}")]
    InvalidSimulator {
        /// Description of the bad setting.
        message: String,
    },

    /// Check-in settings are out of range.
    #[error("Invalid check-in configuration: {message}")]
    InvalidCheckIn {
        /// Description of the bad setting.
        message: String,
    },

    /// No traveller is registered under this id.
    #[error("Unknown tourist '{id}'")]
    UnknownTourist {
        /// The id that was looked up.
        id: String,
    },

    /// A traveller is already registered under this id.
    #[error("Tourist '{id}' is already registered")]
    DuplicateTourist {
        /// The id that was registered twice.
        id: String,
    },
}

/// A position with the time it was observed.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrackPoint {
    /// Caller-supplied observation time.
    pub timestamp: DateTime<Utc>,
    /// Where the traveller was.
    pub position: Coordinate,
}

/// A risk-zone advisory the caller should request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdvisoryRequest {
    /// Zone the request is for; pass to [`SafetyMonitor::advisory_finished`]
    /// once the request completes.
    pub zone_id: String,
    /// Prompt input describing the zone and where it was entered.
    pub input: RiskZoneAlertInput,
}

/// Everything that resulted from one position update.
#[derive(Debug, Clone, PartialEq)]
pub struct TickOutcome {
    /// Safety state at the new position.
    pub snapshot: SafetySnapshot,
    /// Edges between the previous snapshot and this one.
    pub transitions: Vec<SafetyTransition>,
    /// Advisories the gate admitted during this update.
    pub advisory_requests: Vec<AdvisoryRequest>,
    /// Alerts recorded during this update, oldest first.
    pub alerts: Vec<Alert>,
}

/// Monitoring state for one traveller on one scenario.
///
/// Feed it positions with [`SafetyMonitor::update`]. Check-ins are off until
/// [`SafetyMonitor::enable_check_ins`] is called.
#[derive(Debug)]
pub struct SafetyMonitor {
    scenario: Scenario,
    previous: Option<SafetySnapshot>,
    alerts: AlertLog,
    track: VecDeque<TrackPoint>,
    track_capacity: usize,
    gate: AdvisoryGate,
    check_ins: Option<CheckInSchedule>,
}

impl SafetyMonitor {
    /// Creates a monitor with the default alert and track capacities.
    #[must_use]
    pub fn new(scenario: Scenario) -> Self {
        Self::with_capacities(scenario, DEFAULT_ALERT_CAPACITY, DEFAULT_TRACK_CAPACITY)
    }

    /// Creates a monitor keeping at most `alert_capacity` alerts and
    /// `track_capacity` recent positions (each at least one).
    #[must_use]
    pub fn with_capacities(
        scenario: Scenario,
        alert_capacity: usize,
        track_capacity: usize,
    ) -> Self {
        let track_capacity = track_capacity.max(1);
        Self {
            scenario,
            previous: None,
            alerts: AlertLog::with_capacity(alert_capacity),
            track: VecDeque::with_capacity(track_capacity),
            track_capacity,
            gate: AdvisoryGate::new(),
            check_ins: None,
        }
    }

    /// Evaluates `position`, records alerts for what changed, and returns
    /// the advisory requests the gate admitted.
    ///
    /// Alerts are raised on entry into any zone above safe and when a
    /// deviation starts. Leaving a zone or returning to the route is
    /// reported in the transitions but not alerted. A check-in deadline that
    /// has passed by `now` is alerted as well.
    pub fn update(&mut self, position: Coordinate, now: DateTime<Utc>) -> TickOutcome {
        let state = evaluate(
            position,
            self.scenario.zones(),
            self.scenario.route(),
            self.scenario.deviation_threshold_m(),
        );
        let snapshot = state.snapshot();
        let transitions = diff(self.previous.as_ref(), &snapshot);

        log::debug!(
            "{position}: zone={:?} score={} route_distance={:.0}m",
            snapshot.zone_id(),
            snapshot.score,
            snapshot.distance_to_route_m()
        );

        let mut advisory_requests = Vec::new();
        let mut alerts = Vec::new();
        for transition in &transitions {
            match transition {
                SafetyTransition::ZoneEntered { zone } => {
                    log::info!("Entered zone '{}' ({} risk)", zone.id, zone.risk_level);
                    if zone.risk_level != RiskLevel::Safe {
                        let (alert, request) = self.risk_zone_entered(zone, position, now);
                        alerts.push(alert);
                        advisory_requests.extend(request);
                    }
                }
                SafetyTransition::ZoneExited { zone } => {
                    log::info!("Left zone '{}'", zone.id);
                }
                SafetyTransition::DeviationStarted { distance_m } => {
                    log::info!("Deviation started: {distance_m:.0}m from route");
                    let alert = self.alerts.record(
                        now,
                        AlertKind::RouteDeviation,
                        AlertKind::RouteDeviation.tier(),
                        DEVIATION_MESSAGE.to_string(),
                        None,
                    );
                    alerts.push(alert.clone());
                }
                SafetyTransition::DeviationCleared { distance_m } => {
                    log::info!("Back on route: {distance_m:.0}m from route");
                }
            }
        }

        if self.track.len() == self.track_capacity {
            self.track.pop_front();
        }
        self.track.push_back(TrackPoint {
            timestamp: now,
            position,
        });
        self.previous = Some(snapshot.clone());
        alerts.extend(self.poll_check_in(now));

        TickOutcome {
            snapshot,
            transitions,
            advisory_requests,
            alerts,
        }
    }

    fn risk_zone_entered(
        &mut self,
        zone: &ZoneSummary,
        position: Coordinate,
        now: DateTime<Utc>,
    ) -> (Alert, Option<AdvisoryRequest>) {
        let alert = self
            .alerts
            .record(
                now,
                AlertKind::RiskZoneEntered,
                AlertTier::for_risk_level(zone.risk_level),
                format!("Entered {} ({} risk).", zone.name, zone.risk_level),
                Some(zone.id.clone()),
            )
            .clone();

        let request = self.gate.try_begin(&zone.id).then(|| AdvisoryRequest {
            zone_id: zone.id.clone(),
            input: RiskZoneAlertInput {
                zone_type: zone.zone_type.clone(),
                location: position.to_string(),
                risk_level: zone.risk_level.to_string(),
                region: zone.name.clone(),
            },
        });
        (alert, request)
    }

    /// Records a critical SOS alert at the last known position.
    pub fn trigger_sos(&mut self, now: DateTime<Utc>) -> &Alert {
        let message = match self.last_position() {
            Some(position) => format!("SOS triggered at {position}."),
            None => "SOS triggered, location unknown.".to_string(),
        };
        log::warn!("{message}");
        self.alerts
            .record(now, AlertKind::Sos, AlertKind::Sos.tier(), message, None)
    }

    /// Starts expecting a check-in every `interval`, the first one due
    /// `interval` after `now`. Replaces any existing schedule.
    ///
    /// # Errors
    ///
    /// Returns [`MonitorError::InvalidCheckIn`] if `interval` is not positive.
    pub fn enable_check_ins(
        &mut self,
        interval: TimeDelta,
        now: DateTime<Utc>,
    ) -> Result<(), MonitorError> {
        self.check_ins = Some(CheckInSchedule::new(interval, now)?);
        Ok(())
    }

    /// Confirms the traveller is safe. Returns `false` if check-ins are off.
    pub fn check_in(&mut self, now: DateTime<Utc>) -> bool {
        match self.check_ins.as_mut() {
            Some(schedule) => {
                schedule.confirm(now);
                true
            }
            None => false,
        }
    }

    /// Records a check-in failure if the deadline has passed by `now` and
    /// was not already reported.
    pub fn poll_check_in(&mut self, now: DateTime<Utc>) -> Option<Alert> {
        let schedule = self.check_ins.as_mut()?;
        if !schedule.poll(now) {
            return None;
        }
        log::warn!("Check-in was due at {}", schedule.due_at());
        Some(
            self.alerts
                .record(
                    now,
                    AlertKind::CheckInFailure,
                    AlertKind::CheckInFailure.tier(),
                    CHECK_IN_MISSED_MESSAGE.to_string(),
                    None,
                )
                .clone(),
        )
    }

    /// The active check-in schedule, if any.
    #[must_use]
    pub const fn check_ins(&self) -> Option<&CheckInSchedule> {
        self.check_ins.as_ref()
    }

    /// Releases the advisory gate for `zone_id` after its request finished,
    /// successfully or not.
    pub fn advisory_finished(&mut self, zone_id: &str) {
        self.gate.finish(zone_id);
    }

    /// Progress toward the next waypoint from `position`.
    #[must_use]
    pub fn trip_status(&self, position: Coordinate) -> TripStatus {
        trip_status(
            position,
            self.scenario.route(),
            self.scenario.average_speed_kmh(),
        )
    }

    /// Summarizes the planned waypoints and the recent track for a
    /// route-deviation analysis.
    #[must_use]
    pub fn route_deviation_input(&self, tourist_id: &str) -> RouteDeviationInput {
        let planned_route = self
            .scenario
            .waypoint_names()
            .iter()
            .zip(self.scenario.route().points())
            .map(|(name, point)| format!("{name} ({point})"))
            .collect::<Vec<_>>()
            .join(" -> ");

        let actual_route = if self.track.is_empty() {
            "no positions recorded".to_string()
        } else {
            self.track
                .iter()
                .map(|p| format!("{} {}", p.timestamp.format("%H:%M:%S"), p.position))
                .collect::<Vec<_>>()
                .join("; ")
        };

        RouteDeviationInput {
            planned_route,
            actual_route,
            tourist_id: tourist_id.to_string(),
        }
    }

    /// The scenario being monitored.
    #[must_use]
    pub const fn scenario(&self) -> &Scenario {
        &self.scenario
    }

    /// Most recent position passed to [`SafetyMonitor::update`].
    #[must_use]
    pub fn last_position(&self) -> Option<Coordinate> {
        self.track.back().map(|p| p.position)
    }

    /// Snapshot from the most recent update.
    #[must_use]
    pub const fn last_snapshot(&self) -> Option<&SafetySnapshot> {
        self.previous.as_ref()
    }

    /// Alerts shown to the traveller, newest first.
    #[must_use]
    pub const fn alerts(&self) -> &AlertLog {
        &self.alerts
    }

    /// Recent positions, oldest first.
    pub fn track(&self) -> impl Iterator<Item = &TrackPoint> {
        self.track.iter()
    }

    /// Zones with an advisory request outstanding.
    #[must_use]
    pub const fn gate(&self) -> &AdvisoryGate {
        &self.gate
    }
}
