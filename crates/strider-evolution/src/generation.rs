//! One ranked population and the operator producing the next one

use log::debug;
use rayon::prelude::*;
use strider_creature::{Creature, CreatureResult, EvolutionRng};

use crate::config::EvolutionConfig;
use crate::error::{EvolutionError, EvolutionResult};
use crate::stats::GenerationStats;

/// A population ranked ascending by fitness
///
/// After evaluation the creature that walked furthest is last.
#[derive(Debug, Clone)]
pub struct Generation {
    creatures: Vec<Creature>,
    index: usize,
}

impl Generation {
    /// First generation: `population_size` random creatures, evaluated
    pub fn genesis<R: EvolutionRng + ?Sized>(
        config: &EvolutionConfig,
        rng: &mut R,
    ) -> EvolutionResult<Self> {
        config.validate()?;

        let creatures = (0..config.population_size)
            .map(|_| Creature::random(rng, &config.creature))
            .collect::<CreatureResult<Vec<_>>>()?;
        let mut generation = Self {
            creatures,
            index: 0,
        };
        generation.evaluate(config)?;
        Ok(generation)
    }

    /// Next generation: copy `previous`, kill the unlucky and the slow, refill
    /// with mutated copies of the best, then evaluate
    pub fn succession<R: EvolutionRng + ?Sized>(
        previous: &Generation,
        config: &EvolutionConfig,
        rng: &mut R,
    ) -> EvolutionResult<Self> {
        config.validate()?;
        if previous.creatures.is_empty() {
            return Err(EvolutionError::InvalidParameter(
                "previous generation has no creatures".into(),
            ));
        }

        let mut next = Self {
            creatures: previous.creatures.clone(),
            index: previous.index + 1,
        };
        let deaths = next.natural_select(config, rng);
        next.reproduce(deaths, config, rng)?;
        next.evaluate(config)?;
        Ok(next)
    }

    /// Rank creatures as they stand, without simulating them
    pub fn from_creatures(creatures: Vec<Creature>, index: usize) -> Self {
        let mut generation = Self { creatures, index };
        generation.rank();
        generation
    }

    /// Reset and walk every creature, then rank
    ///
    /// Creatures are independent and the simulation draws no random numbers,
    /// so they are walked in parallel.
    fn evaluate(&mut self, config: &EvolutionConfig) -> EvolutionResult<()> {
        let ticks = config.ticks;
        let simulation = &config.simulation;
        self.creatures.par_iter_mut().try_for_each(|creature| {
            creature.reset();
            creature.move_ticks(ticks, simulation)
        })?;
        self.rank();
        Ok(())
    }

    fn rank(&mut self) {
        self.creatures.sort_by(|a, b| a.fitness_cmp(b));
    }

    /// Remove creatures and return how many died
    ///
    /// First every creature may die by chance, stopping once the quota of
    /// `round(death_percentage * N)` is met; then the worst are removed until
    /// one more than the quota has died.
    fn natural_select<R: EvolutionRng + ?Sized>(
        &mut self,
        config: &EvolutionConfig,
        rng: &mut R,
    ) -> usize {
        let deaths = config.deaths_per_generation();
        let quota = deaths - 1;

        let mut dead = 0;
        let mut i = 0;
        while i < self.creatures.len() && dead < quota {
            if rng.bernoulli(config.random_death_probability) {
                self.creatures.remove(i);
                dead += 1;
            } else {
                i += 1;
            }
        }
        let random_deaths = dead;

        // survivors are never exhausted, validate() guarantees deaths < N
        while dead < deaths && self.creatures.len() > 1 {
            self.creatures.remove(0);
            dead += 1;
        }

        debug!(
            "Generation {}: {} random deaths, {} culled",
            self.index,
            random_deaths,
            dead - random_deaths
        );
        dead
    }

    /// Append `births` mutated copies of the best survivors, best first
    fn reproduce<R: EvolutionRng + ?Sized>(
        &mut self,
        births: usize,
        config: &EvolutionConfig,
        rng: &mut R,
    ) -> EvolutionResult<()> {
        let survivors = self.creatures.len();
        if survivors == 0 {
            return Err(EvolutionError::InvalidParameter(
                "no survivors to reproduce from".into(),
            ));
        }
        for k in 0..births {
            let parent = survivors - 1 - (k % survivors);
            let mut child = self.creatures[parent].clone();
            child.mutate(rng, &config.creature)?;
            self.creatures.push(child);
        }
        Ok(())
    }

    pub fn creatures(&self) -> &[Creature] {
        &self.creatures
    }

    pub fn creature_at(&self, i: usize) -> Option<&Creature> {
        self.creatures.get(i)
    }

    /// The creature that walked furthest
    pub fn best(&self) -> Option<&Creature> {
        self.creatures.last()
    }

    pub fn worst(&self) -> Option<&Creature> {
        self.creatures.first()
    }

    pub fn len(&self) -> usize {
        self.creatures.len()
    }

    pub fn is_empty(&self) -> bool {
        self.creatures.is_empty()
    }

    /// Position in the lineage, 0 for genesis
    pub fn index(&self) -> usize {
        self.index
    }

    pub fn stats(&self) -> GenerationStats {
        GenerationStats::from_generation(self)
    }
}
