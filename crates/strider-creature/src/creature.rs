//! Creature: a node/muscle graph that learns to walk
//!
//! Construction, structural mutation and fitness live here; the locomotion
//! simulator is in [`crate::locomotion`] and render snapshots in
//! [`crate::render`].

use std::cmp::Ordering;

use glam::DVec2;
use log::{debug, warn};
use petgraph::algo::connected_components;
use petgraph::graph::UnGraph;
use serde::{Deserialize, Serialize};

use crate::config::CreatureConfig;
use crate::connections::ConnectionList;
use crate::error::{CreatureError, CreatureResult};
use crate::muscle::Muscle;
use crate::node::Node;
use crate::rng::EvolutionRng;
use crate::types::{IdAllocator, MuscleId, NodeId};

/// Topology-changing mutation, applied at most once per [`Creature::mutate`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StructuralMutation {
    /// New random node linked to one existing node
    AddNode,
    /// New muscle between two distinct existing nodes
    AddMuscle,
    /// Drop one muscle without crippling its endpoints
    RemoveMuscle,
    /// Drop one node and its muscles without crippling its neighbours
    RemoveNode,
}

impl StructuralMutation {
    pub const ALL: [StructuralMutation; 4] = [
        StructuralMutation::AddNode,
        StructuralMutation::AddMuscle,
        StructuralMutation::RemoveMuscle,
        StructuralMutation::RemoveNode,
    ];

    /// Uniform choice among all four kinds
    pub fn random<R: EvolutionRng + ?Sized>(rng: &mut R) -> CreatureResult<Self> {
        Ok(Self::ALL[rng.pick_index(Self::ALL.len())?])
    }
}

/// A walker made of point masses and actuated springs
///
/// Nodes and muscles live in arenas owned by the creature; the connection
/// list refers to them by handle. Cloning is a deep copy and keeps rest
/// positions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Creature {
    pub(crate) nodes: Vec<Node>,
    pub(crate) muscles: Vec<Muscle>,
    pub(crate) connections: ConnectionList,
    ids: IdAllocator,
}

impl Creature {
    fn empty() -> Self {
        Self {
            nodes: Vec::new(),
            muscles: Vec::new(),
            connections: ConnectionList::new(),
            ids: IdAllocator::new(),
        }
    }

    /// Grow a random connected creature
    ///
    /// The node count is drawn from `[2, max_nodes]`. A randomized spanning
    /// tree links them, then slack muscles join unconnected pairs until
    /// `nodes + uniform(0, max_muscles)` muscles exist, capped at the number
    /// of distinct pairs.
    pub fn random<R: EvolutionRng + ?Sized>(
        rng: &mut R,
        config: &CreatureConfig,
    ) -> CreatureResult<Self> {
        config.validate()?;

        let node_target = rng.uniform_int(2, config.max_nodes as i64)? as usize;
        let pair_count = node_target * (node_target - 1) / 2;
        let extra = rng.uniform_int(0, config.max_muscles as i64)? as usize;
        let muscle_target = (node_target + extra).min(pair_count);

        let mut creature = Self::empty();
        creature.grow_branch(None, node_target, rng, config)?;

        let mut free_pairs = Vec::new();
        for a in 0..creature.nodes.len() {
            for b in (a + 1)..creature.nodes.len() {
                if !creature
                    .connections
                    .connected(creature.nodes[a].id(), creature.nodes[b].id())
                {
                    free_pairs.push((a, b));
                }
            }
        }
        while creature.muscles.len() < muscle_target && !free_pairs.is_empty() {
            let (a, b) = free_pairs.swap_remove(rng.pick_index(free_pairs.len())?);
            creature.link(a, b, rng, config)?;
        }

        debug!(
            "Grew creature with {} nodes and {} muscles",
            creature.nodes.len(),
            creature.muscles.len()
        );
        Ok(creature)
    }

    /// Add a node under `parent`, then keep growing child subtrees below it
    /// while the coin says so and the node target is not reached
    fn grow_branch<R: EvolutionRng + ?Sized>(
        &mut self,
        parent: Option<usize>,
        node_target: usize,
        rng: &mut R,
        config: &CreatureConfig,
    ) -> CreatureResult<()> {
        let index = self.push_random_node(rng, config)?;
        if let Some(parent) = parent {
            self.link(parent, index, rng, config)?;
        }
        while self.nodes.len() < node_target {
            self.grow_branch(Some(index), node_target, rng, config)?;
            if self.nodes.len() >= node_target || !rng.bernoulli(config.more_nodes_probability) {
                break;
            }
        }
        Ok(())
    }

    fn push_random_node<R: EvolutionRng + ?Sized>(
        &mut self,
        rng: &mut R,
        config: &CreatureConfig,
    ) -> CreatureResult<usize> {
        let id = self.ids.node();
        self.nodes.push(Node::random(id, rng, config)?);
        Ok(self.nodes.len() - 1)
    }

    /// New random muscle between the nodes at indices `a` and `b`, resting
    /// at their current distance
    fn link<R: EvolutionRng + ?Sized>(
        &mut self,
        a: usize,
        b: usize,
        rng: &mut R,
        config: &CreatureConfig,
    ) -> CreatureResult<MuscleId> {
        if a == b {
            return Err(CreatureError::invalid("Nodes must be different"));
        }
        let length = self.nodes[a].distance_to(&self.nodes[b]);
        let id = self.ids.muscle();
        let muscle = Muscle::random(id, length, rng, config)?;
        self.connections.add_incidence(&mut self.nodes[a], id);
        self.connections.add_incidence(&mut self.nodes[b], id);
        self.muscles.push(muscle);
        Ok(id)
    }

    /// Assemble a creature from explicit parts
    ///
    /// Handles must be unique and the connection list must bind every muscle
    /// to two distinct nodes of `nodes` with matching connection counts.
    pub fn from_parts(
        nodes: Vec<Node>,
        muscles: Vec<Muscle>,
        connections: ConnectionList,
    ) -> CreatureResult<Self> {
        if nodes.is_empty() {
            return Err(CreatureError::invalid("A creature needs at least one node"));
        }
        for (i, node) in nodes.iter().enumerate() {
            if nodes[..i].iter().any(|n| n.id() == node.id()) {
                return Err(CreatureError::structural(format!("duplicate {}", node.id())));
            }
        }
        for (i, muscle) in muscles.iter().enumerate() {
            if muscles[..i].iter().any(|m| m.id() == muscle.id()) {
                return Err(CreatureError::structural(format!("duplicate {}", muscle.id())));
            }
        }
        connections.validate(&nodes, &muscles)?;

        let ids = IdAllocator::after(
            nodes.iter().map(Node::id),
            muscles.iter().map(Muscle::id),
        );
        Ok(Self {
            nodes,
            muscles,
            connections,
            ids,
        })
    }

    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    pub fn muscles(&self) -> &[Muscle] {
        &self.muscles
    }

    pub fn connections(&self) -> &ConnectionList {
        &self.connections
    }

    pub fn node(&self, id: NodeId) -> Option<&Node> {
        self.nodes.iter().find(|n| n.id() == id)
    }

    pub fn muscle(&self, id: MuscleId) -> Option<&Muscle> {
        self.muscles.iter().find(|m| m.id() == id)
    }

    pub(crate) fn node_index(&self, id: NodeId) -> CreatureResult<usize> {
        self.nodes
            .iter()
            .position(|n| n.id() == id)
            .ok_or_else(|| CreatureError::structural(format!("{id} is not part of this creature")))
    }

    /// Arena indices of the two endpoints of `muscle`
    pub(crate) fn endpoint_indices(&self, muscle: MuscleId) -> CreatureResult<(usize, usize)> {
        let [a, b] = self.connections.nodes_of(muscle)?;
        Ok((self.node_index(a)?, self.node_index(b)?))
    }

    /// Centroid of all node positions
    pub fn mean_position(&self) -> DVec2 {
        if self.nodes.is_empty() {
            return DVec2::ZERO;
        }
        let sum: DVec2 = self.nodes.iter().map(Node::position).sum();
        sum / self.nodes.len() as f64
    }

    /// Fitness: mean node X
    pub fn position_x(&self) -> f64 {
        self.mean_position().x
    }

    pub fn position_y(&self) -> f64 {
        self.mean_position().y
    }

    /// Order by fitness; the creature that walked further compares greater
    ///
    /// A non-finite fitness ranks below every finite one and equal to any
    /// other non-finite one, so a diverged creature is culled first.
    pub fn fitness_cmp(&self, other: &Creature) -> Ordering {
        let (a, b) = (self.position_x(), other.position_x());
        match (a.is_finite(), b.is_finite()) {
            (true, true) => a.partial_cmp(&b).unwrap_or(Ordering::Equal),
            (true, false) => Ordering::Greater,
            (false, true) => Ordering::Less,
            (false, false) => Ordering::Equal,
        }
    }

    /// Whether every node is reachable from every other through muscles
    pub fn is_connected(&self) -> CreatureResult<bool> {
        let mut graph =
            UnGraph::<NodeId, MuscleId>::with_capacity(self.nodes.len(), self.muscles.len());
        let handles: Vec<_> = self.nodes.iter().map(|n| graph.add_node(n.id())).collect();
        for muscle in &self.muscles {
            let (a, b) = self.endpoint_indices(muscle.id())?;
            graph.add_edge(handles[a], handles[b], muscle.id());
        }
        Ok(connected_components(&graph) <= 1)
    }

    /// Check that every handle resolves and every count matches
    pub fn validate(&self) -> CreatureResult<()> {
        self.connections.validate(&self.nodes, &self.muscles)
    }

    /// Drift every node and muscle, then maybe change the topology
    ///
    /// Nodes mutate first and snap to their new rest positions; each muscle
    /// then rests at the distance between its endpoints. With probability
    /// `structural_mutation_probability` one [`StructuralMutation`] follows.
    pub fn mutate<R: EvolutionRng + ?Sized>(
        &mut self,
        rng: &mut R,
        config: &CreatureConfig,
    ) -> CreatureResult<()> {
        let divergence = config.mutation_divergence;
        for node in &mut self.nodes {
            node.mutate(divergence, rng);
        }
        for i in 0..self.muscles.len() {
            let (a, b) = self.endpoint_indices(self.muscles[i].id())?;
            let resting_distance = self.nodes[a].distance_to(&self.nodes[b]);
            self.muscles[i].mutate(divergence, resting_distance, rng);
        }

        if rng.bernoulli(config.structural_mutation_probability) {
            let mutation = StructuralMutation::random(rng)?;
            self.apply_structural_mutation(mutation, rng, config)?;
        }
        Ok(())
    }

    /// Apply one topology change
    ///
    /// Returns `false` when a removal found nothing it could take away
    /// without crippling a node; the creature is then unchanged.
    pub fn apply_structural_mutation<R: EvolutionRng + ?Sized>(
        &mut self,
        mutation: StructuralMutation,
        rng: &mut R,
        config: &CreatureConfig,
    ) -> CreatureResult<bool> {
        match mutation {
            StructuralMutation::AddNode => {
                let anchor = rng.pick_index(self.nodes.len())?;
                let index = self.push_random_node(rng, config)?;
                let muscle = self.link(anchor, index, rng, config)?;
                debug!("AddNode: {} via {}", self.nodes[index].id(), muscle);
                Ok(true)
            }
            StructuralMutation::AddMuscle => {
                if self.nodes.len() < 2 {
                    return Ok(false);
                }
                let a = rng.pick_index(self.nodes.len())?;
                let mut b = rng.pick_index(self.nodes.len() - 1)?;
                if b >= a {
                    b += 1;
                }
                let muscle = self.link(a, b, rng, config)?;
                debug!(
                    "AddMuscle: {} between {} and {}",
                    muscle,
                    self.nodes[a].id(),
                    self.nodes[b].id()
                );
                Ok(true)
            }
            StructuralMutation::RemoveMuscle => {
                for i in rng.shuffled_indices(self.muscles.len())? {
                    let id = self.muscles[i].id();
                    match self.connections.remove_muscle(id, &mut self.nodes) {
                        Ok(()) => {
                            self.muscles.remove(i);
                            debug!("RemoveMuscle: {id}");
                            return Ok(true);
                        }
                        Err(e) if e.is_recoverable() => debug!("RemoveMuscle: skipped, {e}"),
                        Err(e) => return Err(e),
                    }
                }
                warn!("RemoveMuscle: every muscle is needed, creature left unchanged");
                Ok(false)
            }
            StructuralMutation::RemoveNode => {
                if self.nodes.len() <= 2 {
                    warn!(
                        "RemoveNode: only {} nodes left, creature left unchanged",
                        self.nodes.len()
                    );
                    return Ok(false);
                }
                for i in rng.shuffled_indices(self.nodes.len())? {
                    let id = self.nodes[i].id();
                    match self.connections.remove_node(id, &mut self.nodes) {
                        Ok(removed) => {
                            self.nodes.remove(i);
                            self.muscles.retain(|m| !removed.contains(&m.id()));
                            debug!("RemoveNode: {id} with {} muscles", removed.len());
                            return Ok(true);
                        }
                        Err(e) if e.is_recoverable() => debug!("RemoveNode: skipped, {e}"),
                        Err(e) => return Err(e),
                    }
                }
                warn!("RemoveNode: every node is needed, creature left unchanged");
                Ok(false)
            }
        }
    }
}

impl std::fmt::Display for Creature {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for (i, node) in self.nodes.iter().enumerate() {
            writeln!(f, "Node {i}:")?;
            write!(f, "{node}")?;
        }
        for (i, muscle) in self.muscles.iter().enumerate() {
            writeln!(f, "Muscle {i}:")?;
            write!(f, "{muscle}")?;
        }
        write!(f, "{}", self.connections)
    }
}
