//! Per-generation summary numbers

use serde::{Deserialize, Serialize};
use strider_creature::Creature;

use crate::generation::Generation;

/// Statistics from one evaluated generation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerationStats {
    /// Position in the lineage
    pub generation: usize,
    pub population: usize,
    /// Mean node X of the furthest walker
    pub best_fitness: f64,
    pub mean_fitness: f64,
    pub worst_fitness: f64,
    /// Nodes and muscles summed over the population
    pub total_nodes: usize,
    pub total_muscles: usize,
}

impl GenerationStats {
    pub fn from_generation(generation: &Generation) -> Self {
        let creatures = generation.creatures();
        let mean_fitness = if creatures.is_empty() {
            0.0
        } else {
            creatures.iter().map(Creature::position_x).sum::<f64>() / creatures.len() as f64
        };

        Self {
            generation: generation.index(),
            population: creatures.len(),
            best_fitness: generation.best().map_or(0.0, Creature::position_x),
            mean_fitness,
            worst_fitness: generation.worst().map_or(0.0, Creature::position_x),
            total_nodes: creatures.iter().map(|c| c.nodes().len()).sum(),
            total_muscles: creatures.iter().map(|c| c.muscles().len()).sum(),
        }
    }
}

impl std::fmt::Display for GenerationStats {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Gen {}: best={:.2}, avg={:.2}, worst={:.2}, population={}, nodes={}, muscles={}",
            self.generation,
            self.best_fitness,
            self.mean_fitness,
            self.worst_fitness,
            self.population,
            self.total_nodes,
            self.total_muscles
        )
    }
}
