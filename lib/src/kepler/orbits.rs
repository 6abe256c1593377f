//! Planar elliptical orbits with uniform angular motion.
//!
//! Bodies traverse their ellipse at a constant phase rate rather than
//! following Kepler's equal-areas law. The sun sits at one focus and every
//! orbit lies in the `y = 0` plane.

use std::f64::consts;

use nalgebra::Vector3;
use serde::{Deserialize, Serialize};

use crate::{
    bodies::CelestialBody,
    time::{Days, DAYS_PER_YEAR},
};

/// Number of points in a closed orbit polyline.
pub const ORBIT_PATH_SAMPLES: usize = 101;

/// Orbital parameters of a body.
///
/// Callers must uphold `distance > 0`, `period > 0` and
/// `0 <= eccentricity < 1`. Nothing here checks them; out-of-range values
/// produce whatever IEEE-754 arithmetic yields.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Orbit {
    /// Semi-major axis (scene units).
    pub distance: f64,
    /// Orbital period (years).
    pub period: f64,
    /// Eccentricity (dimensionless).
    pub eccentricity: f64,
}

impl Orbit {
    pub fn new(distance: f64, period: f64, eccentricity: f64) -> Self {
        Self {
            distance,
            period,
            eccentricity,
        }
    }

    pub fn period_days(&self) -> f64 {
        self.period * DAYS_PER_YEAR
    }

    pub fn semi_major_axis(&self) -> f64 {
        self.distance
    }

    pub fn semi_minor_axis(&self) -> f64 {
        self.distance * libm::sqrt(1.0 - self.eccentricity.powi(2))
    }

    /// Distance between the ellipse center and the focus holding the sun.
    pub fn focus_offset(&self) -> f64 {
        self.distance * self.eccentricity
    }

    pub fn periapsis_radius(&self) -> f64 {
        self.distance * (1.0 - self.eccentricity)
    }

    pub fn apoapsis_radius(&self) -> f64 {
        self.distance * (1.0 + self.eccentricity)
    }

    /// Phase angle after `elapsed` days (radians, not wrapped).
    pub fn phase_angle(&self, elapsed: Days) -> f64 {
        (elapsed.get() / self.period_days()) * 2.0 * consts::PI
    }

    /// Position relative to the sun after `elapsed` days.
    pub fn position(&self, elapsed: Days) -> Vector3<f64> {
        let angle = self.phase_angle(elapsed);
        let a = self.semi_major_axis();
        let b = self.semi_minor_axis();
        let f = self.focus_offset();
        Vector3::new(a * libm::cos(angle) - f, 0.0, b * libm::sin(angle))
    }

    /// Sample the orbit at `samples` evenly spaced angles over `[0, 2π]`.
    ///
    /// The first and last points coincide, closing the loop.
    pub fn path(&self, samples: usize) -> Vec<Vector3<f64>> {
        let period_days = self.period_days();
        let steps = samples.saturating_sub(1).max(1) as f64;
        (0..samples)
            .map(|i| {
                let angle = (i as f64 / steps) * 2.0 * consts::PI;
                let t = angle * period_days / (2.0 * consts::PI);
                self.position(Days::new(t))
            })
            .collect()
    }

    pub fn path_default(&self) -> Vec<Vector3<f64>> {
        self.path(ORBIT_PATH_SAMPLES)
    }
}

/// Position of `body` after `elapsed` days.
pub fn position(body: &CelestialBody, elapsed: Days) -> Vector3<f64> {
    body.orbit.position(elapsed)
}
