//! Definitions of celestial bodies.

use std::{fmt, str::FromStr, sync::Arc};

use color_eyre::eyre::{self, bail, ensure, WrapErr};
use itertools::Itertools;
use nalgebra::Vector3;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::{kepler::orbits::Orbit, time::Days};

/// Body set shipped with the crate.
pub const DEFAULT_SYSTEM_TOML: &str = include_str!("../assets/solar_system.toml");

/// Display color of a body, written as `#rrggbb`.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Color(pub [u8; 3]);

impl Color {
    pub fn r(self) -> u8 {
        self.0[0]
    }

    pub fn g(self) -> u8 {
        self.0[1]
    }

    pub fn b(self) -> u8 {
        self.0[2]
    }
}

impl FromStr for Color {
    type Err = eyre::Report;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let Some(hex) = s.strip_prefix('#') else {
            bail!("color {s:?} must start with '#'");
        };
        ensure!(
            hex.len() == 6 && hex.is_ascii(),
            "color {s:?} must have exactly six hex digits"
        );
        let channel = |i: usize| {
            u8::from_str_radix(&hex[i..i + 2], 16)
                .wrap_err_with(|| format!("invalid hex digits in color {s:?}"))
        };
        Ok(Self([channel(0)?, channel(2)?, channel(4)?]))
    }
}

impl TryFrom<String> for Color {
    type Error = eyre::Report;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Color> for String {
    fn from(value: Color) -> Self {
        value.to_string()
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02x}{:02x}{:02x}", self.r(), self.g(), self.b())
    }
}

/// A celestial body orbiting the central star.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CelestialBody {
    /// Name of this body as displayed
    pub name: Arc<str>,
    /// Display color; not used by the orbit math
    pub color: Color,
    /// Relative visual radius; not used by the orbit math
    pub size: f64,
    #[serde(flatten)]
    pub orbit: Orbit,
}

impl CelestialBody {
    /// Check the invariants every body in a [`SolarSystem`] must hold.
    pub fn validate(&self) -> eyre::Result<()> {
        let Orbit {
            distance,
            period,
            eccentricity,
        } = self.orbit;
        ensure!(!self.name.trim().is_empty(), "body name must not be empty");
        ensure!(
            distance.is_finite() && distance > 0.0,
            "{}: distance must be positive, got {distance}",
            self.name
        );
        ensure!(
            period.is_finite() && period > 0.0,
            "{}: period must be positive, got {period}",
            self.name
        );
        ensure!(
            (0.0..1.0).contains(&eccentricity),
            "{}: eccentricity must be in [0, 1), got {eccentricity}",
            self.name
        );
        ensure!(
            self.size.is_finite() && self.size > 0.0,
            "{}: size must be positive, got {}",
            self.name,
            self.size
        );
        Ok(())
    }

    pub fn position(&self, elapsed: Days) -> Vector3<f64> {
        self.orbit.position(elapsed)
    }
}

#[derive(Deserialize)]
struct BodyTable {
    #[serde(default)]
    bodies: Vec<CelestialBody>,
}

/// The fixed set of bodies shown for the lifetime of the process.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct SolarSystem {
    bodies: Vec<CelestialBody>,
}

impl SolarSystem {
    pub fn new(bodies: Vec<CelestialBody>) -> eyre::Result<Self> {
        for body in &bodies {
            body.validate()?;
        }
        let duplicates = bodies.iter().map(|b| &b.name).duplicates().join(", ");
        if !duplicates.is_empty() {
            bail!("duplicate body names: {duplicates}");
        }
        info!(
            "loaded {} bodies: {}",
            bodies.len(),
            bodies.iter().map(|b| &b.name).join(", ")
        );
        Ok(Self { bodies })
    }

    /// Parse a `[[bodies]]` list from TOML.
    pub fn from_toml_str(s: &str) -> eyre::Result<Self> {
        let table: BodyTable = toml::from_str(s).wrap_err("failed to parse body set")?;
        Self::new(table.bodies)
    }

    /// The eight planets bundled with the crate.
    pub fn default_bodies() -> eyre::Result<Self> {
        Self::from_toml_str(DEFAULT_SYSTEM_TOML)
    }

    pub fn get(&self, name: &str) -> Option<&CelestialBody> {
        self.bodies.iter().find(|b| &*b.name == name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &CelestialBody> {
        self.bodies.iter()
    }

    pub fn len(&self) -> usize {
        self.bodies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bodies.is_empty()
    }

    /// Farthest distance from the star any body reaches.
    pub fn extent(&self) -> f64 {
        self.bodies
            .iter()
            .map(|b| b.orbit.apoapsis_radius())
            .fold(0.0, f64::max)
    }

    /// Orbit polylines for every body, in body order.
    ///
    /// These only depend on the body set, so compute them once and keep
    /// them around.
    pub fn orbit_paths(&self) -> OrbitPaths {
        debug!("sampling orbit paths for {} bodies", self.bodies.len());
        OrbitPaths(self.bodies.iter().map(|b| b.orbit.path_default()).collect())
    }
}

impl<'a> IntoIterator for &'a SolarSystem {
    type Item = &'a CelestialBody;
    type IntoIter = std::slice::Iter<'a, CelestialBody>;

    fn into_iter(self) -> Self::IntoIter {
        self.bodies.iter()
    }
}

/// Cached orbit polylines, indexed like the [`SolarSystem`] they came from.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct OrbitPaths(Vec<Vec<Vector3<f64>>>);

impl OrbitPaths {
    pub fn get(&self, index: usize) -> Option<&[Vector3<f64>]> {
        self.0.get(index).map(Vec::as_slice)
    }

    pub fn iter(&self) -> impl Iterator<Item = &[Vector3<f64>]> {
        self.0.iter().map(Vec::as_slice)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}
