//! Suppression of duplicate advisory requests.

use std::collections::BTreeSet;

/// Tracks which zones have an advisory request in flight.
///
/// A zone is admitted again only after [`AdvisoryGate::finish`] is called
/// for it, whether the request succeeded, failed, or timed out.
#[derive(Debug, Clone, Default)]
pub struct AdvisoryGate {
    in_flight: BTreeSet<String>,
}

impl AdvisoryGate {
    /// Creates a gate with nothing in flight.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Marks `zone_id` in flight. Returns `false` if it already was.
    pub fn try_begin(&mut self, zone_id: &str) -> bool {
        if self.in_flight.contains(zone_id) {
            log::debug!("Advisory for zone '{zone_id}' already in flight");
            return false;
        }
        self.in_flight.insert(zone_id.to_string())
    }

    /// Releases `zone_id`. Unknown ids are ignored.
    pub fn finish(&mut self, zone_id: &str) {
        self.in_flight.remove(zone_id);
    }

    /// Whether a request for `zone_id` is outstanding.
    #[must_use]
    pub fn is_in_flight(&self, zone_id: &str) -> bool {
        self.in_flight.contains(zone_id)
    }

    /// Number of zones with a request outstanding.
    #[must_use]
    pub fn in_flight_count(&self) -> usize {
        self.in_flight.len()
    }
}
