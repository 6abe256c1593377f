use std::{fmt, ops};

use serde::{Deserialize, Serialize};

/// Length of a Julian year in days.
pub const DAYS_PER_YEAR: f64 = 365.25;

/// Elapsed simulation time in fractional Earth days since the start of
/// the simulation.
#[derive(Copy, Clone, Default, PartialEq, PartialOrd, Serialize, Deserialize)]
#[repr(transparent)]
#[serde(transparent)]
pub struct Days(f64);

impl Days {
    pub const ZERO: Days = Days(0.0);

    pub fn new(days: f64) -> Self {
        Self(days)
    }

    /// Coerce a raw value into something safe to accumulate into.
    ///
    /// NaN and infinities become zero. Negative values are kept as-is.
    pub fn sanitized(days: f64) -> Self {
        if days.is_finite() {
            Self(days)
        } else {
            Self::ZERO
        }
    }

    pub fn get(self) -> f64 {
        self.0
    }

    pub fn years(self) -> f64 {
        self.0 / DAYS_PER_YEAR
    }
}

impl ops::Add<f64> for Days {
    type Output = Days;

    fn add(self, rhs: f64) -> Self::Output {
        Days(self.0 + rhs)
    }
}

impl ops::Sub<Days> for Days {
    type Output = f64;

    fn sub(self, rhs: Days) -> Self::Output {
        self.0 - rhs.0
    }
}

impl fmt::Display for Days {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if f.alternate() {
            write!(f, "Year {:.3}", self.years())
        } else {
            write!(f, "Day {:.2}", self.0)
        }
    }
}

impl fmt::Debug for Days {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Days({})", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sanitize_non_finite() {
        assert_eq!(Days::sanitized(f64::NAN), Days::ZERO);
        assert_eq!(Days::sanitized(f64::INFINITY), Days::ZERO);
        assert_eq!(Days::sanitized(f64::NEG_INFINITY), Days::ZERO);
        assert_eq!(Days::sanitized(42.5).get(), 42.5);
    }

    #[test]
    fn negative_passes_through() {
        assert_eq!(Days::sanitized(-10.0).get(), -10.0);
    }

    #[test]
    fn display() {
        let d = Days::new(DAYS_PER_YEAR * 2.0);
        assert_eq!(format!("{d}"), "Day 730.50");
        assert_eq!(format!("{d:#}"), "Year 2.000");
        assert_eq!(Days::new(3.0) - Days::new(1.0), 2.0);
    }
}
