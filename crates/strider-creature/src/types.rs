//! Arena handles for nodes and muscles
//!
//! A creature owns its nodes and muscles in plain vectors. Everything that
//! refers to them (the connection list, render data) stores these handles
//! instead of references, so cloning a creature never aliases its parent.

use serde::{Deserialize, Serialize};

/// Stable handle of a node inside one creature
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct NodeId(u32);

impl NodeId {
    pub fn from_raw(id: u32) -> Self {
        NodeId(id)
    }

    pub fn raw(&self) -> u32 {
        self.0
    }
}

impl std::fmt::Display for NodeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Node({})", self.0)
    }
}

/// Stable handle of a muscle inside one creature
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct MuscleId(u32);

impl MuscleId {
    pub fn from_raw(id: u32) -> Self {
        MuscleId(id)
    }

    pub fn raw(&self) -> u32 {
        self.0
    }
}

impl std::fmt::Display for MuscleId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Muscle({})", self.0)
    }
}

/// Hands out fresh handles for one creature's arenas
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdAllocator {
    next_node: u32,
    next_muscle: u32,
}

impl IdAllocator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Continue numbering after the highest handles already in use
    pub fn after(
        nodes: impl IntoIterator<Item = NodeId>,
        muscles: impl IntoIterator<Item = MuscleId>,
    ) -> Self {
        let next_node = nodes.into_iter().map(|id| id.0 + 1).max().unwrap_or(0);
        let next_muscle = muscles.into_iter().map(|id| id.0 + 1).max().unwrap_or(0);
        Self {
            next_node,
            next_muscle,
        }
    }

    pub fn node(&mut self) -> NodeId {
        let id = NodeId(self.next_node);
        self.next_node += 1;
        id
    }

    pub fn muscle(&mut self) -> MuscleId {
        let id = MuscleId(self.next_muscle);
        self.next_muscle += 1;
        id
    }
}
