//! Periodic safety check-ins.
//!
//! The traveller is expected to confirm they are safe at least once per
//! interval. A deadline that passes unconfirmed is reported exactly once;
//! the next confirmation starts a fresh interval. Time always comes from the
//! caller.

use chrono::{DateTime, TimeDelta, Utc};

use crate::MonitorError;

/// Interval between check-ins when none is configured.
pub const DEFAULT_CHECK_IN_INTERVAL: TimeDelta = TimeDelta::minutes(2);

/// Deadline tracking for one traveller's check-ins.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CheckInSchedule {
    interval: TimeDelta,
    last_confirmed: DateTime<Utc>,
    missed_reported: bool,
}

impl CheckInSchedule {
    /// Starts a schedule whose first deadline is `interval` after
    /// `started_at`.
    ///
    /// # Errors
    ///
    /// Returns [`MonitorError::InvalidCheckIn`] if `interval` is not positive.
    pub fn new(interval: TimeDelta, started_at: DateTime<Utc>) -> Result<Self, MonitorError> {
        if interval <= TimeDelta::zero() {
            return Err(MonitorError::InvalidCheckIn {
                message: format!("interval must be positive, got {interval}"),
            });
        }
        Ok(Self {
            interval,
            last_confirmed: started_at,
            missed_reported: false,
        })
    }

    /// Time allowed between confirmations.
    #[must_use]
    pub const fn interval(&self) -> TimeDelta {
        self.interval
    }

    /// When the next confirmation is due.
    #[must_use]
    pub fn due_at(&self) -> DateTime<Utc> {
        self.last_confirmed + self.interval
    }

    /// Whether the current deadline has passed unconfirmed.
    #[must_use]
    pub fn is_overdue(&self, now: DateTime<Utc>) -> bool {
        now > self.due_at()
    }

    /// Records a confirmation at `now`.
    pub fn confirm(&mut self, now: DateTime<Utc>) {
        self.last_confirmed = now;
        self.missed_reported = false;
    }

    /// Returns `true` the first time the deadline is seen to have passed.
    pub fn poll(&mut self, now: DateTime<Utc>) -> bool {
        if self.missed_reported || !self.is_overdue(now) {
            return false;
        }
        self.missed_reported = true;
        true
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    fn at(minute: u32, second: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 3, 1, 9, minute, second).unwrap()
    }

    #[test]
    fn deadline_follows_last_confirmation() {
        let mut schedule = CheckInSchedule::new(DEFAULT_CHECK_IN_INTERVAL, at(0, 0)).unwrap();
        assert_eq!(schedule.due_at(), at(2, 0));

        schedule.confirm(at(1, 30));
        assert_eq!(schedule.due_at(), at(3, 30));
    }

    #[test]
    fn exactly_at_deadline_is_not_overdue() {
        let schedule = CheckInSchedule::new(DEFAULT_CHECK_IN_INTERVAL, at(0, 0)).unwrap();
        assert!(!schedule.is_overdue(at(2, 0)));
        assert!(schedule.is_overdue(at(2, 1)));
    }

    #[test]
    fn missed_deadline_reported_once_until_confirmed() {
        let mut schedule = CheckInSchedule::new(DEFAULT_CHECK_IN_INTERVAL, at(0, 0)).unwrap();
        assert!(!schedule.poll(at(1, 0)));
        assert!(schedule.poll(at(2, 1)));
        assert!(!schedule.poll(at(5, 0)));

        schedule.confirm(at(6, 0));
        assert!(!schedule.poll(at(7, 0)));
        assert!(schedule.poll(at(8, 1)));
    }

    #[test]
    fn rejects_non_positive_interval() {
        assert!(matches!(
            CheckInSchedule::new(TimeDelta::zero(), at(0, 0)),
            Err(MonitorError::InvalidCheckIn { .. })
        ));
        assert!(CheckInSchedule::new(TimeDelta::seconds(-5), at(0, 0)).is_err());
    }
}
