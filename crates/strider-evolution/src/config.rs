//! Evolution configuration with layered loading
//!
//! Configuration is loaded from multiple sources (lowest to highest priority):
//! 1. Compiled defaults
//! 2. `strider.ron` file (if exists)
//! 3. Environment variables prefixed with `STRIDER_`
//!
//! Example environment variable: `STRIDER_CREATURE__MAX_NODES=6`

use anyhow::{Context, Result};
use config::{Config, Environment, File, FileFormat};
use serde::{Deserialize, Serialize};
use strider_creature::{CreatureConfig, SimulationConfig};

use crate::error::{EvolutionError, EvolutionResult};

/// Default config file name, looked up in the working directory
pub const CONFIG_FILE: &str = "strider";

/// Population and selection parameters plus the creature and simulation settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EvolutionConfig {
    pub population_size: usize,
    /// Locomotion attempts per evaluation
    pub ticks: u32,
    /// Share of the population replaced every generation
    pub death_percentage: f64,
    /// Per-creature chance of dying regardless of fitness
    pub random_death_probability: f64,
    pub creature: CreatureConfig,
    pub simulation: SimulationConfig,
}

impl Default for EvolutionConfig {
    fn default() -> Self {
        Self {
            population_size: 20,
            ticks: 15,
            death_percentage: 0.2,
            random_death_probability: 0.02,
            creature: CreatureConfig::default(),
            simulation: SimulationConfig::default(),
        }
    }
}

impl EvolutionConfig {
    /// Load configuration from defaults, `strider.ron` and the environment
    pub fn load() -> Result<Self> {
        Self::load_from(CONFIG_FILE)
    }

    /// Like [`EvolutionConfig::load`] with a different config file
    ///
    /// `name` may omit the `.ron` extension. A missing file is not an error.
    pub fn load_from(name: &str) -> Result<Self> {
        let builder = Config::builder()
            // Layer 1: Compiled defaults
            .add_source(
                Config::try_from(&EvolutionConfig::default())
                    .context("Failed to serialize default configuration")?,
            )
            // Layer 2: Config file (optional, won't error if missing)
            .add_source(File::with_name(name).format(FileFormat::Ron).required(false))
            // Layer 3: Environment variables
            // (STRIDER_POPULATION_SIZE, STRIDER_CREATURE__MAX_NODES, ...)
            .add_source(
                Environment::with_prefix("STRIDER")
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            );

        let config: EvolutionConfig = builder
            .build()
            .context("Failed to build configuration")?
            .try_deserialize()
            .context("Failed to deserialize configuration")?;
        config.validate().context("Invalid configuration")?;
        Ok(config)
    }

    /// Parse an inline RON document; missing fields keep their defaults
    pub fn from_ron_str(source: &str) -> Result<Self> {
        let config: EvolutionConfig =
            ron::from_str(source).context("Failed to parse RON configuration")?;
        config.validate().context("Invalid configuration")?;
        Ok(config)
    }

    /// Creatures removed (and born) every generation
    pub fn deaths_per_generation(&self) -> usize {
        (self.death_percentage * self.population_size as f64).round() as usize + 1
    }

    pub fn validate(&self) -> EvolutionResult<()> {
        if self.population_size < 2 {
            return Err(EvolutionError::InvalidConfig(
                "population_size must be at least 2".into(),
            ));
        }
        if !(0.0..1.0).contains(&self.death_percentage) {
            return Err(EvolutionError::InvalidConfig(
                "death_percentage must be in [0, 1)".into(),
            ));
        }
        if !(0.0..=1.0).contains(&self.random_death_probability) {
            return Err(EvolutionError::InvalidConfig(
                "random_death_probability must be between 0 and 1".into(),
            ));
        }
        if self.deaths_per_generation() >= self.population_size {
            return Err(EvolutionError::InvalidConfig(format!(
                "death_percentage {} leaves no survivors in a population of {}",
                self.death_percentage, self.population_size
            )));
        }
        if self.ticks == 0 {
            return Err(EvolutionError::InvalidConfig(
                "ticks must be greater than 0".into(),
            ));
        }
        self.creature
            .validate()
            .map_err(|e| EvolutionError::InvalidConfig(e.to_string()))?;
        self.simulation
            .validate()
            .map_err(|e| EvolutionError::InvalidConfig(e.to_string()))?;
        Ok(())
    }
}
