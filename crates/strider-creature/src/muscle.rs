//! Actuated springs connecting two nodes

use serde::{Deserialize, Serialize};

use crate::config::CreatureConfig;
use crate::error::{CreatureError, CreatureResult};
use crate::node::Node;
use crate::rng::EvolutionRng;
use crate::types::MuscleId;

const MAX_MARKER_REDRAWS: usize = 16;

/// A linear actuator cycling between a contracted and an extended length
///
/// The cycle is driven by the time quotient `t` in `[0, 1]`. Two phase
/// markers split it: the phase whose marker comes first holds from 0 up to
/// the later marker, the other phase from the later marker to the end.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Muscle {
    id: MuscleId,
    length: f64,
    contracted_length: f64,
    extended_length: f64,
    time_contraction_start: f64,
    time_extension_start: f64,
    strength: f64,
}

impl Muscle {
    pub fn new(
        id: MuscleId,
        length: f64,
        contracted_length: f64,
        extended_length: f64,
        time_contraction_start: f64,
        time_extension_start: f64,
        strength: f64,
    ) -> CreatureResult<Self> {
        if contracted_length > extended_length {
            return Err(CreatureError::invalid(
                "Extended muscle must be longer than contracted muscle",
            ));
        }
        if !(0.0..=1.0).contains(&time_contraction_start) {
            return Err(CreatureError::invalid(
                "time_contraction_start must be between 0 and 1",
            ));
        }
        if !(0.0..=1.0).contains(&time_extension_start) {
            return Err(CreatureError::invalid(
                "time_extension_start must be between 0 and 1",
            ));
        }
        if time_contraction_start == time_extension_start {
            return Err(CreatureError::invalid(
                "time_extension_start must differ from time_contraction_start",
            ));
        }
        Ok(Self {
            id,
            length,
            contracted_length,
            extended_length,
            time_contraction_start,
            time_extension_start,
            strength,
        })
    }

    /// Random muscle whose current length is `length`
    ///
    /// The contracted length lies in `(0, length]`, the extended length in
    /// `[length, max_muscle_length)`; a muscle already longer than the
    /// maximum gets `extended_length == length`.
    pub fn random<R: EvolutionRng + ?Sized>(
        id: MuscleId,
        length: f64,
        rng: &mut R,
        config: &CreatureConfig,
    ) -> CreatureResult<Self> {
        if !length.is_finite() || length < 0.0 {
            return Err(CreatureError::invalid(format!(
                "muscle length must be a non-negative number, got {length}"
            )));
        }
        let contracted = length - rng.uniform_real(0.0, length)?;
        let headroom = (config.max_muscle_length - length).max(0.0);
        let extended = length + rng.uniform_real(0.0, headroom)?;
        let contraction_start = rng.uniform_real(0.0, 1.0)?;
        let mut extension_start = rng.uniform_real(0.0, 1.0)?;
        while extension_start == contraction_start {
            extension_start = rng.uniform_real(0.0, 1.0)?;
        }
        let strength = rng.uniform_real(0.0, config.max_strength)?;
        Self::new(
            id,
            length,
            contracted,
            extended,
            contraction_start,
            extension_start,
            strength,
        )
    }

    pub fn id(&self) -> MuscleId {
        self.id
    }

    /// Current length, as last measured between the endpoints
    pub fn length(&self) -> f64 {
        self.length
    }

    pub fn contracted_length(&self) -> f64 {
        self.contracted_length
    }

    pub fn extended_length(&self) -> f64 {
        self.extended_length
    }

    pub fn time_contraction_start(&self) -> f64 {
        self.time_contraction_start
    }

    pub fn time_extension_start(&self) -> f64 {
        self.time_extension_start
    }

    pub fn strength(&self) -> f64 {
        self.strength
    }

    pub fn is_contracted(&self, time_quotient: f64) -> CreatureResult<bool> {
        if !(0.0..=1.0).contains(&time_quotient) {
            return Err(CreatureError::invalid(
                "time quotient must be between 0 and 1",
            ));
        }
        let contraction = self.time_contraction_start;
        let extension = self.time_extension_start;
        if time_quotient == contraction {
            return Ok(true);
        }
        if time_quotient == extension {
            return Ok(false);
        }
        let contraction_first = contraction < extension;
        let later_marker = contraction.max(extension);
        // before the later marker the earlier marker's phase holds
        Ok(if time_quotient < later_marker {
            contraction_first
        } else {
            !contraction_first
        })
    }

    pub fn target_length(&self, time_quotient: f64) -> CreatureResult<f64> {
        Ok(if self.is_contracted(time_quotient)? {
            self.contracted_length
        } else {
            self.extended_length
        })
    }

    /// Measure the current length between two distinct nodes
    pub fn change_length(&mut self, n1: &Node, n2: &Node) -> CreatureResult<()> {
        if n1.id() == n2.id() {
            return Err(CreatureError::invalid("Nodes must be different"));
        }
        self.length = n1.distance_to(n2);
        Ok(())
    }

    /// Multiplicative Gaussian drift of lengths, phase markers and strength
    ///
    /// Lengths are clamped so that `contracted <= resting_distance <= extended`
    /// and the current length becomes `resting_distance`. Markers wrap back
    /// into `[0, 1)`. Strength has no floor and may become non-positive.
    pub fn mutate<R: EvolutionRng + ?Sized>(
        &mut self,
        divergence: f64,
        resting_distance: f64,
        rng: &mut R,
    ) {
        self.contracted_length *= rng.gaussian_with(divergence, 1.0);
        self.extended_length *= rng.gaussian_with(divergence, 1.0);
        if self.contracted_length > resting_distance {
            self.contracted_length = resting_distance;
        }
        if self.extended_length < resting_distance {
            self.extended_length = resting_distance;
        }
        self.length = resting_distance;

        self.time_contraction_start =
            wrap_unit(self.time_contraction_start * rng.gaussian_with(divergence, 1.0));
        let previous_extension = self.time_extension_start;
        let mut extension = wrap_unit(previous_extension * rng.gaussian_with(divergence, 1.0));
        for _ in 0..MAX_MARKER_REDRAWS {
            if extension != self.time_contraction_start {
                break;
            }
            extension = wrap_unit(previous_extension * rng.gaussian_with(divergence, 1.0));
        }
        if extension == self.time_contraction_start {
            // no drift separates the markers, move half a cycle away
            extension = wrap_unit(extension + 0.5);
        }
        self.time_extension_start = extension;

        self.strength *= rng.gaussian_with(divergence, 1.0);
    }
}

/// Wrap into `[0, 1)` by whole-cycle adjustment
fn wrap_unit(value: f64) -> f64 {
    if !value.is_finite() {
        return 0.0;
    }
    let wrapped = value.rem_euclid(1.0);
    // -tiny wraps to 1.0 - tiny, which can round up to exactly 1.0
    if wrapped >= 1.0 { 0.0 } else { wrapped }
}

impl std::fmt::Display for Muscle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "  Strength: {}", self.strength)?;
        writeln!(
            f,
            "  length(contracted|extended): {}({}|{})",
            self.length, self.contracted_length, self.extended_length
        )?;
        writeln!(
            f,
            "  contractedTime|extendedTime: {}|{}",
            self.time_contraction_start, self.time_extension_start
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::NodeId;
    use glam::DVec2;
    use rand::SeedableRng;
    use rand_xoshiro::Xoshiro256StarStar;

    fn muscle(c: f64, e: f64) -> Muscle {
        Muscle::new(MuscleId::from_raw(0), 5.0, 3.0, 8.0, c, e, 2.0).unwrap()
    }

    #[test]
    fn test_new_validation() {
        let id = MuscleId::from_raw(0);
        assert!(Muscle::new(id, 5.0, 3.0, 8.0, 0.2, 0.7, 1.0).is_ok());
        // equal lengths are allowed
        assert!(Muscle::new(id, 5.0, 5.0, 5.0, 0.0, 1.0, 1.0).is_ok());

        assert!(matches!(
            Muscle::new(id, 5.0, 8.0, 3.0, 0.2, 0.7, 1.0),
            Err(CreatureError::InvalidParameter(_))
        ));
        assert!(Muscle::new(id, 5.0, 3.0, 8.0, -0.1, 0.7, 1.0).is_err());
        assert!(Muscle::new(id, 5.0, 3.0, 8.0, 1.1, 0.7, 1.0).is_err());
        assert!(Muscle::new(id, 5.0, 3.0, 8.0, 0.2, -0.5, 1.0).is_err());
        assert!(Muscle::new(id, 5.0, 3.0, 8.0, 0.2, 1.5, 1.0).is_err());
        assert!(Muscle::new(id, 5.0, 3.0, 8.0, 0.4, 0.4, 1.0).is_err());
    }

    #[test]
    fn test_is_contracted_reference_cases() {
        let m = muscle(0.2, 0.7);
        assert!(m.is_contracted(0.2).unwrap());
        assert!(!m.is_contracted(0.7).unwrap());
        assert!(m.is_contracted(0.0).unwrap());
        assert!(!m.is_contracted(0.9).unwrap());
        assert!(m.is_contracted(0.5).unwrap());
    }

    #[test]
    fn test_is_contracted_extension_first() {
        let m = muscle(0.7, 0.2);
        assert!(m.is_contracted(0.7).unwrap());
        assert!(!m.is_contracted(0.2).unwrap());
        assert!(!m.is_contracted(0.0).unwrap());
        assert!(!m.is_contracted(0.5).unwrap());
        assert!(m.is_contracted(0.9).unwrap());
    }

    #[test]
    fn test_is_contracted_rejects_out_of_range() {
        let m = muscle(0.2, 0.7);
        assert!(m.is_contracted(-0.01).is_err());
        assert!(m.is_contracted(1.01).is_err());
        assert!(m.is_contracted(1.0).is_ok());
    }

    #[test]
    fn test_target_length() {
        let m = muscle(0.2, 0.7);
        assert_eq!(m.target_length(0.3).unwrap(), 3.0);
        assert_eq!(m.target_length(0.8).unwrap(), 8.0);
    }

    #[test]
    fn test_change_length() {
        let a = Node::new(NodeId::from_raw(0), 0.5, DVec2::new(0.0, 0.0)).unwrap();
        let b = Node::new(NodeId::from_raw(1), 0.5, DVec2::new(6.0, 8.0)).unwrap();
        let mut m = muscle(0.2, 0.7);

        m.change_length(&a, &b).unwrap();
        assert_eq!(m.length(), 10.0);
        assert!(matches!(
            m.change_length(&a, &a),
            Err(CreatureError::InvalidParameter(_))
        ));
    }

    #[test]
    fn test_random_respects_invariants() {
        let mut rng = Xoshiro256StarStar::seed_from_u64(12345);
        let config = CreatureConfig::default();

        for (i, length) in [0.0, 0.5, 4.0, 11.9, 14.0].into_iter().enumerate() {
            let id = MuscleId::from_raw(i as u32);
            let m = Muscle::random(id, length, &mut rng, &config).unwrap();
            assert!(m.contracted_length() <= m.length());
            assert!(m.length() <= m.extended_length());
            assert!(m.extended_length() <= config.max_muscle_length.max(length));
            assert_ne!(m.time_contraction_start(), m.time_extension_start());
            assert!((0.0..config.max_strength).contains(&m.strength()));
        }
        assert!(Muscle::random(MuscleId::from_raw(9), -1.0, &mut rng, &config).is_err());
    }

    #[test]
    fn test_mutate_invariants() {
        let mut rng = Xoshiro256StarStar::seed_from_u64(77);

        for _ in 0..500 {
            let mut m = muscle(0.2, 0.7);
            m.mutate(0.5, 4.5, &mut rng);
            assert!(m.contracted_length() <= 4.5);
            assert!(m.extended_length() >= 4.5);
            assert_eq!(m.length(), 4.5);
            assert!((0.0..1.0).contains(&m.time_contraction_start()));
            assert!((0.0..1.0).contains(&m.time_extension_start()));
            assert_ne!(m.time_contraction_start(), m.time_extension_start());
        }
    }

    #[test]
    fn test_strength_can_mutate_non_positive() {
        let mut rng = Xoshiro256StarStar::seed_from_u64(21);

        let mut saw_non_positive = false;
        for _ in 0..200 {
            let mut m = muscle(0.2, 0.7);
            m.mutate(3.0, 5.0, &mut rng);
            saw_non_positive |= m.strength() <= 0.0;
        }
        assert!(saw_non_positive);
    }

    #[test]
    fn test_wrap_unit() {
        assert_eq!(wrap_unit(0.25), 0.25);
        assert!((wrap_unit(1.25) - 0.25).abs() < 1e-12);
        assert!((wrap_unit(2.5) - 0.5).abs() < 1e-12);
        assert!((wrap_unit(-0.25) - 0.75).abs() < 1e-12);
        assert_eq!(wrap_unit(1.0), 0.0);
        assert_eq!(wrap_unit(f64::NAN), 0.0);
    }
}
