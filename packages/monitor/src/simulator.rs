//! Synthetic position feed for demos and soak runs.
//!
//! The walker advances a fixed distance along the planned route on every
//! call and then perturbs the result by a uniform random offset, so with a
//! large enough jitter it wanders into zones and off route. Seeded, so a run
//! is reproducible. It owns no clock; the caller decides the cadence.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tourist_safety_geofence::{Coordinate, Route, distance};

use crate::MonitorError;

/// Latitude/longitude box positions are clamped into.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds {
    /// Southern edge, degrees.
    pub min_lat: f64,
    /// Northern edge, degrees.
    pub max_lat: f64,
    /// Western edge, degrees.
    pub min_lng: f64,
    /// Eastern edge, degrees.
    pub max_lng: f64,
}

impl Bounds {
    /// The monitored region of the north-eastern states.
    pub const NORTHEAST_INDIA: Self = Self {
        min_lat: 26.0,
        max_lat: 28.2,
        min_lng: 91.5,
        max_lng: 94.5,
    };

    /// Moves `point` to the nearest position inside the box.
    #[must_use]
    pub fn clamp(&self, point: Coordinate) -> Coordinate {
        Coordinate {
            lat: point.lat.clamp(self.min_lat, self.max_lat),
            lng: point.lng.clamp(self.min_lng, self.max_lng),
        }
    }

    fn is_valid(&self) -> bool {
        self.min_lat <= self.max_lat && self.min_lng <= self.max_lng
    }
}

/// Step size, noise, and optional clamping for a [`PositionSimulator`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SimulatorConfig {
    /// Distance advanced along the route per step, in meters.
    pub step_m: f64,
    /// Maximum random offset per axis, in degrees.
    pub jitter_deg: f64,
    /// Box every emitted position is clamped into, if any.
    pub bounds: Option<Bounds>,
}

impl Default for SimulatorConfig {
    fn default() -> Self {
        Self {
            step_m: 1000.0,
            jitter_deg: 0.0,
            bounds: None,
        }
    }
}

/// Seeded walker along a route's waypoints.
#[derive(Debug, Clone)]
pub struct PositionSimulator {
    waypoints: Vec<Coordinate>,
    leg: usize,
    along_leg_m: f64,
    config: SimulatorConfig,
    rng: StdRng,
}

impl PositionSimulator {
    /// Starts a walker at the first waypoint of `route`.
    ///
    /// # Errors
    ///
    /// Returns [`MonitorError::InvalidSimulator`] if the step is not a
    /// positive finite distance, the jitter is negative or not finite, or the
    /// bounds are inverted.
    pub fn new(route: &Route, config: SimulatorConfig, seed: u64) -> Result<Self, MonitorError> {
        if !config.step_m.is_finite() || config.step_m <= 0.0 {
            return Err(MonitorError::InvalidSimulator {
                message: format!("step must be a positive distance, got {}", config.step_m),
            });
        }
        if !config.jitter_deg.is_finite() || config.jitter_deg < 0.0 {
            return Err(MonitorError::InvalidSimulator {
                message: format!("jitter must be non-negative, got {}", config.jitter_deg),
            });
        }
        if config.bounds.is_some_and(|b| !b.is_valid()) {
            return Err(MonitorError::InvalidSimulator {
                message: "bounds minimum exceeds maximum".to_string(),
            });
        }

        Ok(Self {
            waypoints: route.points().to_vec(),
            leg: 0,
            along_leg_m: 0.0,
            config,
            rng: StdRng::seed_from_u64(seed),
        })
    }

    /// Whether the walker has reached the destination. Further steps stay
    /// there (plus jitter).
    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.leg + 1 >= self.waypoints.len()
    }

    /// Advances one step and returns the new, jittered position.
    pub fn next_position(&mut self) -> Coordinate {
        let on_route = self.advance(self.config.step_m);
        let jittered = self.jitter(on_route);
        match self.config.bounds {
            Some(bounds) => bounds.clamp(jittered),
            None => jittered,
        }
    }

    fn advance(&mut self, mut remaining_m: f64) -> Coordinate {
        while !self.is_finished() {
            let a = self.waypoints[self.leg];
            let b = self.waypoints[self.leg + 1];
            let leg_m = distance(a, b);
            let left_on_leg = leg_m - self.along_leg_m;

            if remaining_m < left_on_leg {
                self.along_leg_m += remaining_m;
                return interpolate(a, b, self.along_leg_m / leg_m);
            }

            remaining_m -= left_on_leg;
            self.leg += 1;
            self.along_leg_m = 0.0;
        }

        self.waypoints[self.waypoints.len() - 1]
    }

    fn jitter(&mut self, point: Coordinate) -> Coordinate {
        let j = self.config.jitter_deg;
        if j == 0.0 {
            return point;
        }
        Coordinate {
            lat: point.lat + self.rng.gen_range(-j..=j),
            lng: point.lng + self.rng.gen_range(-j..=j),
        }
    }
}

fn interpolate(a: Coordinate, b: Coordinate, t: f64) -> Coordinate {
    Coordinate {
        lat: (b.lat - a.lat).mul_add(t, a.lat),
        lng: (b.lng - a.lng).mul_add(t, a.lng),
    }
}
