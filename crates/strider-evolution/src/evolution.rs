//! Driver running a lineage of generations

use log::info;
use rand::rngs::StdRng;
use rand::SeedableRng;
use strider_creature::EvolutionRng;

use crate::config::EvolutionConfig;
use crate::error::EvolutionResult;
use crate::generation::Generation;
use crate::stats::GenerationStats;

/// Owns the current generation, the RNG and the stats of every generation
/// seen so far
pub struct Evolution<R: EvolutionRng> {
    config: EvolutionConfig,
    rng: R,
    current: Generation,
    history: Vec<GenerationStats>,
}

impl Evolution<StdRng> {
    /// Reproducible run from a seed
    pub fn seeded(config: EvolutionConfig, seed: u64) -> EvolutionResult<Self> {
        Self::new(config, StdRng::seed_from_u64(seed))
    }
}

impl<R: EvolutionRng> Evolution<R> {
    /// Start a lineage with a random genesis generation
    pub fn new(config: EvolutionConfig, mut rng: R) -> EvolutionResult<Self> {
        info!(
            "Starting evolution: population {}, {} ticks of {} steps",
            config.population_size, config.ticks, config.simulation.resolution
        );
        let current = Generation::genesis(&config, &mut rng)?;
        let stats = current.stats();
        info!("{stats}");
        Ok(Self {
            config,
            rng,
            current,
            history: vec![stats],
        })
    }

    /// Advance by one generation
    pub fn step(&mut self) -> EvolutionResult<&GenerationStats> {
        let next = Generation::succession(&self.current, &self.config, &mut self.rng)?;
        let stats = next.stats();
        info!("{stats}");
        self.current = next;
        self.history.push(stats);
        Ok(&self.history[self.history.len() - 1])
    }

    /// Advance by `generations` generations
    pub fn run(&mut self, generations: usize) -> EvolutionResult<&Generation> {
        for _ in 0..generations {
            self.step()?;
        }
        Ok(&self.current)
    }

    pub fn current(&self) -> &Generation {
        &self.current
    }

    /// Stats of every generation so far, genesis first
    pub fn history(&self) -> &[GenerationStats] {
        &self.history
    }

    pub fn config(&self) -> &EvolutionConfig {
        &self.config
    }
}
