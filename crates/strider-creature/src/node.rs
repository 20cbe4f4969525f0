//! Point masses of a creature

use glam::DVec2;
use serde::{Deserialize, Serialize};

use crate::config::CreatureConfig;
use crate::error::{CreatureError, CreatureResult};
use crate::rng::EvolutionRng;
use crate::types::NodeId;

/// A point mass with surface friction
///
/// Movement is two-phase: displacements are accumulated with
/// [`Node::apply_displacement`] while a sub-step is computed and only become
/// visible after [`Node::commit_displacement`], so no node reads another
/// node's post-update position within the same sub-step.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Node {
    id: NodeId,
    friction: f64,
    position: DVec2,
    rest_position: DVec2,
    pending: DVec2,
    connection_count: usize,
}

impl Node {
    /// Create a node resting at `position`
    pub fn new(id: NodeId, friction: f64, position: DVec2) -> CreatureResult<Self> {
        if !(0.0..=1.0).contains(&friction) {
            return Err(CreatureError::invalid("Node friction must be between 0 and 1"));
        }
        if !position.is_finite() {
            return Err(CreatureError::invalid("Node position must be finite"));
        }
        if position.y < 0.0 {
            return Err(CreatureError::invalid("Node must be above ground"));
        }
        Ok(Self {
            id,
            friction,
            position,
            rest_position: position,
            pending: DVec2::ZERO,
            connection_count: 0,
        })
    }

    /// Create a node with random friction somewhere in the spawn box
    pub fn random<R: EvolutionRng + ?Sized>(
        id: NodeId,
        rng: &mut R,
        config: &CreatureConfig,
    ) -> CreatureResult<Self> {
        let friction = rng.uniform_real(0.0, 1.0)?;
        let x = rng.uniform_real(0.0, config.max_position_x)?;
        let y = rng.uniform_real(0.0, config.max_position_y)?;
        Self::new(id, friction, DVec2::new(x, y))
    }

    pub fn id(&self) -> NodeId {
        self.id
    }

    pub fn friction(&self) -> f64 {
        self.friction
    }

    pub fn position(&self) -> DVec2 {
        self.position
    }

    pub fn rest_position(&self) -> DVec2 {
        self.rest_position
    }

    /// Displacement accumulated since the last commit
    pub fn pending_displacement(&self) -> DVec2 {
        self.pending
    }

    /// Where the node ends up once the pending displacement is committed
    pub fn pending_position(&self) -> DVec2 {
        self.position + self.pending
    }

    pub fn connection_count(&self) -> usize {
        self.connection_count
    }

    pub fn distance_to(&self, other: &Node) -> f64 {
        self.position.distance(other.position)
    }

    /// Accumulate a displacement without moving the node yet
    pub fn apply_displacement(&mut self, dx: f64, dy: f64) {
        self.pending += DVec2::new(dx, dy);
    }

    /// Move by the accumulated displacement and clear it
    pub fn commit_displacement(&mut self) {
        self.position += self.pending;
        self.pending = DVec2::ZERO;
    }

    pub fn reset_to_rest_position(&mut self) {
        self.position = self.rest_position;
        self.pending = DVec2::ZERO;
    }

    /// Multiplicative Gaussian drift of rest position and friction
    ///
    /// Only the rest Y is clamped to the ground. X may wander negative and
    /// friction may leave `[0, 1]`.
    pub fn mutate<R: EvolutionRng + ?Sized>(&mut self, divergence: f64, rng: &mut R) {
        self.rest_position.y *= rng.gaussian_with(divergence, 1.0);
        if self.rest_position.y < 0.0 {
            self.rest_position.y = 0.0;
        }
        self.rest_position.x *= rng.gaussian_with(divergence, 1.0);
        self.position = self.rest_position;
        self.pending = DVec2::ZERO;
        self.friction *= rng.gaussian_with(divergence, 1.0);
    }

    pub(crate) fn add_connection(&mut self) {
        self.connection_count += 1;
    }

    pub(crate) fn remove_connection(&mut self) -> CreatureResult<()> {
        if self.connection_count == 0 {
            return Err(CreatureError::structural(format!(
                "{} has no connection left to remove",
                self.id
            )));
        }
        self.connection_count -= 1;
        Ok(())
    }
}

impl std::fmt::Display for Node {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "  Friction: {}", self.friction)?;
        writeln!(f, "  Position: ({}|{})", self.position.x, self.position.y)
    }
}
