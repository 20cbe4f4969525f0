//! Tunables for creature growth, mutation and locomotion

use serde::{Deserialize, Serialize};

use crate::error::{CreatureError, CreatureResult};

/// Growth and mutation parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CreatureConfig {
    /// Upper bound of the node count of a freshly grown creature
    pub max_nodes: usize,
    /// Upper bound of muscles added on top of one per node
    pub max_muscles: usize,
    /// Probability of growing another sibling branch
    pub more_nodes_probability: f64,
    /// Random rest positions are drawn from `[0, max_position_x) x [0, max_position_y)`
    pub max_position_x: f64,
    pub max_position_y: f64,
    /// Extended length of a random muscle is drawn up to this value
    pub max_muscle_length: f64,
    /// Strength of a random muscle is drawn from `[0, max_strength)`
    pub max_strength: f64,
    /// Standard deviation of the multiplicative Gaussian drift
    pub mutation_divergence: f64,
    /// Chance of one structural mutation per `Creature::mutate`
    pub structural_mutation_probability: f64,
}

impl Default for CreatureConfig {
    fn default() -> Self {
        Self {
            max_nodes: 10,
            max_muscles: 10,
            more_nodes_probability: 0.4,
            max_position_x: 10.0,
            max_position_y: 10.0,
            max_muscle_length: 12.0,
            max_strength: 10.0,
            mutation_divergence: 0.2,
            structural_mutation_probability: 0.03,
        }
    }
}

impl CreatureConfig {
    pub fn validate(&self) -> CreatureResult<()> {
        if self.max_nodes < 2 {
            return Err(CreatureError::invalid("max_nodes must be at least 2"));
        }
        for (name, p) in [
            ("more_nodes_probability", self.more_nodes_probability),
            (
                "structural_mutation_probability",
                self.structural_mutation_probability,
            ),
        ] {
            if !(0.0..=1.0).contains(&p) {
                return Err(CreatureError::invalid(format!(
                    "{name} must be between 0 and 1"
                )));
            }
        }
        for (name, v) in [
            ("max_position_x", self.max_position_x),
            ("max_position_y", self.max_position_y),
            ("max_muscle_length", self.max_muscle_length),
            ("max_strength", self.max_strength),
            ("mutation_divergence", self.mutation_divergence),
        ] {
            if !v.is_finite() || v < 0.0 {
                return Err(CreatureError::invalid(format!(
                    "{name} must be a non-negative number"
                )));
            }
        }
        Ok(())
    }
}

/// Locomotion simulator parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    /// Sub-steps per locomotion attempt
    pub resolution: u32,
    /// Downward bias per sub-step at time quotient 1
    pub gravity: f64,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            resolution: 15000,
            gravity: 9.81,
        }
    }
}

impl SimulationConfig {
    pub fn validate(&self) -> CreatureResult<()> {
        if self.resolution == 0 {
            return Err(CreatureError::invalid("resolution must be greater than 0"));
        }
        if !self.gravity.is_finite() {
            return Err(CreatureError::invalid("gravity must be finite"));
        }
        Ok(())
    }
}
