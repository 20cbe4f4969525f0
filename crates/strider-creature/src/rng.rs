//! RNG capability used by creature growth, mutation and selection
//!
//! Everything that needs randomness takes an `&mut impl EvolutionRng`, so a
//! run is reproducible from a single seeded generator:
//! - `rand_xoshiro::Xoshiro256StarStar::seed_from_u64(..)` in tests and benches
//! - `rand::rng()` for unseeded runs

use rand_distr::{Distribution, StandardNormal};

use crate::error::{CreatureError, CreatureResult};

/// Random number generator capability for evolution
pub trait EvolutionRng {
    /// Uniform integer in `[min, max]` (both inclusive)
    fn uniform_int(&mut self, min: i64, max: i64) -> CreatureResult<i64>;

    /// Uniform real in `[min, max)`; `min` when the range is empty
    fn uniform_real(&mut self, min: f64, max: f64) -> CreatureResult<f64>;

    /// `true` with the given probability
    fn bernoulli(&mut self, probability: f64) -> bool;

    /// Standard normal sample
    fn gaussian(&mut self) -> f64;

    /// Normal sample with the given standard deviation and mean
    fn gaussian_with(&mut self, stddev: f64, mean: f64) -> f64 {
        self.gaussian() * stddev + mean
    }

    /// Uniform index into a collection of `len` elements
    fn pick_index(&mut self, len: usize) -> CreatureResult<usize> {
        if len == 0 {
            return Err(CreatureError::invalid("cannot pick from an empty collection"));
        }
        Ok(self.uniform_int(0, len as i64 - 1)? as usize)
    }

    /// `0..len` in random order (Fisher-Yates)
    fn shuffled_indices(&mut self, len: usize) -> CreatureResult<Vec<usize>> {
        let mut indices: Vec<usize> = (0..len).collect();
        for i in (1..len).rev() {
            let j = self.uniform_int(0, i as i64)? as usize;
            indices.swap(i, j);
        }
        Ok(indices)
    }
}

// Blanket implementation for any rand::Rng (ThreadRng, seeded xoshiro, ...)
impl<T: ?Sized + rand::Rng> EvolutionRng for T {
    fn uniform_int(&mut self, min: i64, max: i64) -> CreatureResult<i64> {
        if max < min {
            return Err(CreatureError::invalid(format!(
                "max ({max}) must not be smaller than min ({min})"
            )));
        }
        Ok(rand::Rng::random_range(self, min..=max))
    }

    fn uniform_real(&mut self, min: f64, max: f64) -> CreatureResult<f64> {
        if !min.is_finite() || !max.is_finite() || max < min {
            return Err(CreatureError::invalid(format!(
                "invalid real range [{min}, {max})"
            )));
        }
        if max == min {
            return Ok(min);
        }
        Ok(rand::Rng::random_range(self, min..max))
    }

    fn bernoulli(&mut self, probability: f64) -> bool {
        rand::Rng::random::<f64>(self) < probability
    }

    fn gaussian(&mut self) -> f64 {
        StandardNormal.sample(self)
    }
}
