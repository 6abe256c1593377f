use std::path::{Path, PathBuf};

use color_eyre::eyre::{self, WrapErr};
use orrery::{
    bodies::{CelestialBody, SolarSystem},
    clock::ClockConfig,
};
use serde::Deserialize;
use tracing::info;

/// Environment variable naming the config file when no argument is given.
pub const CONFIG_ENV: &str = "ORRERY_CONFIG";

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub clock: ClockConfig,
    bodies: Option<Vec<CelestialBody>>,
}

impl Config {
    /// Load from the first CLI argument or `ORRERY_CONFIG`, falling back to
    /// built-in defaults when neither is set.
    pub fn load() -> eyre::Result<Self> {
        let path = std::env::args_os()
            .nth(1)
            .map(PathBuf::from)
            .or_else(|| std::env::var_os(CONFIG_ENV).map(PathBuf::from));
        match path {
            Some(path) => Self::from_path(&path),
            None => {
                info!("no config file given, using defaults");
                Ok(Self::default())
            }
        }
    }

    pub fn from_path(path: &Path) -> eyre::Result<Self> {
        info!("loading config from {}", path.display());
        let text = std::fs::read_to_string(path)
            .wrap_err_with(|| format!("failed to read {}", path.display()))?;
        Self::from_toml_str(&text).wrap_err_with(|| format!("invalid config {}", path.display()))
    }

    pub fn from_toml_str(s: &str) -> eyre::Result<Self> {
        let config: Self = toml::from_str(s)?;
        config.clock.validate().wrap_err("invalid [clock] table")?;
        Ok(config)
    }

    /// The configured body set, or the bundled planets if none was given.
    pub fn system(&self) -> eyre::Result<SolarSystem> {
        match &self.bodies {
            Some(bodies) => SolarSystem::new(bodies.clone()),
            None => SolarSystem::default_bodies(),
        }
    }
}
