//! Discrete-time locomotion simulator
//!
//! Kinematic position-based movement, no forces or velocities. Each
//! sub-step every node collects a downward bias and a pull from each of its
//! muscles towards the muscle's target length, is pushed out of the ground,
//! and only then do all nodes move at once.

use log::trace;

use crate::config::SimulationConfig;
use crate::creature::Creature;
use crate::error::{CreatureError, CreatureResult};

/// Arena indices resolved once per run
struct Wiring {
    /// Per node: (muscle index, other endpoint index)
    incident: Vec<Vec<(usize, usize)>>,
    /// Per muscle: endpoint indices
    endpoints: Vec<(usize, usize)>,
}

impl Wiring {
    fn resolve(creature: &Creature) -> CreatureResult<Self> {
        let mut incident = vec![Vec::new(); creature.nodes.len()];
        let mut endpoints = Vec::with_capacity(creature.muscles.len());
        for (m, muscle) in creature.muscles.iter().enumerate() {
            let (a, b) = creature.endpoint_indices(muscle.id())?;
            incident[a].push((m, b));
            incident[b].push((m, a));
            endpoints.push((a, b));
        }
        Ok(Self {
            incident,
            endpoints,
        })
    }
}

/// Inclination of a muscle from the horizontal, in `[0, pi/2]`
fn incline(y1: f64, y2: f64, length: f64) -> f64 {
    if length.is_nan() || length <= 0.0 {
        return 0.0;
    }
    ((y1 - y2).abs() / length).min(1.0).asin()
}

/// Sign of one offset component, zero when the endpoints line up on that axis
fn side(component: f64) -> f64 {
    if component > 0.0 {
        1.0
    } else if component < 0.0 {
        -1.0
    } else {
        0.0
    }
}

/// Share of a muscle in the weighting at a node
///
/// Mutation can drive strength below zero; such a muscle goes slack instead
/// of pulling against the others.
fn pulling_strength(strength: f64) -> f64 {
    strength.max(0.0)
}

impl Creature {
    /// Let the creature try to walk `ticks` times
    ///
    /// Each attempt runs `sim.resolution` sub-steps with the time quotient
    /// going from 0 towards 1. Attempts continue from where the previous one
    /// stopped; call [`Creature::reset`] to start over.
    pub fn move_ticks(&mut self, ticks: u32, sim: &SimulationConfig) -> CreatureResult<()> {
        if ticks == 0 {
            return Err(CreatureError::invalid("Time to try must be greater than 0"));
        }
        sim.validate()?;

        let wiring = Wiring::resolve(self)?;
        // lengths go stale when nodes are reset or moved outside the simulation
        self.measure_muscles(&wiring)?;
        for attempt in 0..ticks {
            for step in 0..sim.resolution {
                let time_quotient = step as f64 / sim.resolution as f64;
                self.sub_step(time_quotient, sim.gravity, &wiring)?;
            }
            trace!(
                "Attempt {}/{}: mean position ({:.3}, {:.3})",
                attempt + 1,
                ticks,
                self.position_x(),
                self.position_y()
            );
        }
        Ok(())
    }

    fn sub_step(
        &mut self,
        time_quotient: f64,
        gravity: f64,
        wiring: &Wiring,
    ) -> CreatureResult<()> {
        for i in 0..self.nodes.len() {
            self.nodes[i].apply_displacement(0.0, -gravity * time_quotient);

            let incident = &wiring.incident[i];
            let total_strength: f64 = incident
                .iter()
                .map(|&(m, _)| pulling_strength(self.muscles[m].strength()))
                .sum();
            if total_strength > 0.0 {
                let here = self.nodes[i].position();
                for &(m, other) in incident {
                    let muscle = &self.muscles[m];
                    let delta = (muscle.target_length(time_quotient)? - muscle.length())
                        * pulling_strength(muscle.strength())
                        / total_strength;
                    let offset = here - self.nodes[other].position();
                    let angle = incline(here.y, self.nodes[other].position().y, muscle.length());
                    // positive delta pushes away from the other end, negative pulls towards it
                    self.nodes[i].apply_displacement(
                        delta * angle.cos() * side(offset.x),
                        delta * angle.sin() * side(offset.y),
                    );
                }
            }

            // ground contact lifts the node and everything hanging on it
            let depth = self.nodes[i].pending_position().y;
            if depth < 0.0 {
                self.nodes[i].apply_displacement(0.0, -depth);
                for &(_, other) in incident {
                    self.nodes[other].apply_displacement(0.0, -depth);
                }
            }
        }

        for node in &mut self.nodes {
            node.commit_displacement();
        }
        self.measure_muscles(wiring)
    }

    fn measure_muscles(&mut self, wiring: &Wiring) -> CreatureResult<()> {
        for (m, &(a, b)) in wiring.endpoints.iter().enumerate() {
            self.muscles[m].change_length(&self.nodes[a], &self.nodes[b])?;
        }
        Ok(())
    }

    /// Put every node back at its rest position
    pub fn reset(&mut self) {
        for node in &mut self.nodes {
            node.reset_to_rest_position();
        }
    }
}
