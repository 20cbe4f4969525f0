//! Incidence structure between nodes and muscles
//!
//! The list stores handles only. Node connection counts live on the nodes
//! themselves and are only ever changed from here, so every mutating call
//! takes the node arena it should update.

use serde::{Deserialize, Serialize};

use crate::error::{CreatureError, CreatureResult};
use crate::muscle::Muscle;
use crate::node::Node;
use crate::types::{MuscleId, NodeId};

/// Minimum number of muscles a node keeps once it has been wired up
pub const MIN_CONNECTIONS: usize = 2;

/// One (node, muscle) incidence pair
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Incidence {
    pub node: NodeId,
    pub muscle: MuscleId,
}

/// Bipartite incidence list; every muscle appears in exactly two pairs
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ConnectionList {
    incidences: Vec<Incidence>,
}

fn find_node_mut(nodes: &mut [Node], id: NodeId) -> CreatureResult<&mut Node> {
    nodes
        .iter_mut()
        .find(|n| n.id() == id)
        .ok_or_else(|| CreatureError::structural(format!("{id} is not part of this creature")))
}

impl ConnectionList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.incidences.len()
    }

    pub fn is_empty(&self) -> bool {
        self.incidences.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Incidence> {
        self.incidences.iter()
    }

    /// Bind `muscle` to `node` and bump the node's connection count
    pub fn add_incidence(&mut self, node: &mut Node, muscle: MuscleId) {
        node.add_connection();
        self.incidences.push(Incidence {
            node: node.id(),
            muscle,
        });
    }

    /// Drop a muscle and both of its incidences
    ///
    /// Fails with [`CreatureError::Crippled`], leaving everything untouched,
    /// if either endpoint would end up with fewer than [`MIN_CONNECTIONS`].
    pub fn remove_muscle(&mut self, muscle: MuscleId, nodes: &mut [Node]) -> CreatureResult<()> {
        let endpoints = self.nodes_of(muscle)?;
        for id in endpoints {
            let node = find_node_mut(nodes, id)?;
            if node.connection_count() <= MIN_CONNECTIONS {
                return Err(CreatureError::Crippled { muscle, node: id });
            }
        }

        self.incidences.retain(|inc| inc.muscle != muscle);
        for id in endpoints {
            find_node_mut(nodes, id)?.remove_connection()?;
        }
        Ok(())
    }

    /// Detach a node by removing every muscle incident on it
    ///
    /// Fails with [`CreatureError::Crippled`], leaving everything untouched,
    /// if any other endpoint would end up with fewer than [`MIN_CONNECTIONS`].
    /// Returns the removed muscles.
    pub fn remove_node(
        &mut self,
        node: NodeId,
        nodes: &mut [Node],
    ) -> CreatureResult<Vec<MuscleId>> {
        let muscles = self.muscles_of(node);

        // how many connections each neighbour loses
        let mut losses: Vec<(NodeId, MuscleId, usize)> = Vec::new();
        for &muscle in &muscles {
            let [a, b] = self.nodes_of(muscle)?;
            let other = if a == node { b } else { a };
            match losses.iter_mut().find(|(id, _, _)| *id == other) {
                Some(entry) => entry.2 += 1,
                None => losses.push((other, muscle, 1)),
            }
        }
        for &(other, muscle, lost) in &losses {
            let count = find_node_mut(nodes, other)?.connection_count();
            if count < lost + MIN_CONNECTIONS {
                return Err(CreatureError::Crippled { muscle, node: other });
            }
        }
        let detached = find_node_mut(nodes, node)?;

        self.incidences.retain(|inc| !muscles.contains(&inc.muscle));
        for _ in &muscles {
            detached.remove_connection()?;
        }
        for (other, _, lost) in losses {
            let neighbour = find_node_mut(nodes, other)?;
            for _ in 0..lost {
                neighbour.remove_connection()?;
            }
        }
        Ok(muscles)
    }

    /// Muscles incident on `node`, in insertion order
    pub fn muscles_of(&self, node: NodeId) -> Vec<MuscleId> {
        self.incidences
            .iter()
            .filter(|inc| inc.node == node)
            .map(|inc| inc.muscle)
            .collect()
    }

    /// The two endpoints of `muscle`
    ///
    /// Anything other than exactly two distinct nodes is a
    /// [`CreatureError::StructuralViolation`].
    pub fn nodes_of(&self, muscle: MuscleId) -> CreatureResult<[NodeId; 2]> {
        let mut endpoints = self
            .incidences
            .iter()
            .filter(|inc| inc.muscle == muscle)
            .map(|inc| inc.node);
        match (endpoints.next(), endpoints.next(), endpoints.next()) {
            (Some(a), Some(b), None) if a != b => Ok([a, b]),
            (Some(a), Some(_), None) => Err(CreatureError::structural(format!(
                "{muscle} binds {a} to itself"
            ))),
            _ => Err(CreatureError::structural(format!(
                "{muscle} does not connect exactly two nodes"
            ))),
        }
    }

    pub fn contains_muscle(&self, muscle: MuscleId) -> bool {
        self.incidences.iter().any(|inc| inc.muscle == muscle)
    }

    /// True if the two nodes share at least one muscle
    pub fn connected(&self, n1: NodeId, n2: NodeId) -> bool {
        let m1 = self.muscles_of(n1);
        self.incidences
            .iter()
            .any(|inc| inc.node == n2 && m1.contains(&inc.muscle))
    }

    /// Check the list against the arenas it indexes
    ///
    /// Every muscle resolves to two distinct nodes of `nodes`, every incidence
    /// names a known muscle and node, and every node's connection count
    /// matches its incidences.
    pub fn validate(&self, nodes: &[Node], muscles: &[Muscle]) -> CreatureResult<()> {
        for inc in &self.incidences {
            if !nodes.iter().any(|n| n.id() == inc.node) {
                return Err(CreatureError::structural(format!(
                    "{} references unknown {}",
                    inc.muscle, inc.node
                )));
            }
            if !muscles.iter().any(|m| m.id() == inc.muscle) {
                return Err(CreatureError::structural(format!(
                    "{} references unknown {}",
                    inc.node, inc.muscle
                )));
            }
        }
        for muscle in muscles {
            self.nodes_of(muscle.id())?;
        }
        for node in nodes {
            let incident = self.incidences.iter().filter(|inc| inc.node == node.id()).count();
            if incident != node.connection_count() {
                return Err(CreatureError::structural(format!(
                    "{} counts {} connections but has {} incidences",
                    node.id(),
                    node.connection_count(),
                    incident
                )));
            }
        }
        Ok(())
    }
}

impl std::fmt::Display for ConnectionList {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Connections:")?;
        for inc in &self.incidences {
            writeln!(f, "  {} - {}", inc.node, inc.muscle)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::DVec2;

    fn nodes(n: u32) -> Vec<Node> {
        (0..n)
            .map(|i| Node::new(NodeId::from_raw(i), 0.5, DVec2::new(i as f64, 1.0)).unwrap())
            .collect()
    }

    fn link(list: &mut ConnectionList, nodes: &mut [Node], a: u32, b: u32, m: u32) -> MuscleId {
        let muscle = MuscleId::from_raw(m);
        list.add_incidence(&mut nodes[a as usize], muscle);
        list.add_incidence(&mut nodes[b as usize], muscle);
        muscle
    }

    /// Complete graph on four nodes: every node has three connections
    fn k4() -> (ConnectionList, Vec<Node>) {
        let mut list = ConnectionList::new();
        let mut ns = nodes(4);
        let mut m = 0;
        for a in 0..4 {
            for b in (a + 1)..4 {
                link(&mut list, &mut ns, a, b, m);
                m += 1;
            }
        }
        (list, ns)
    }

    fn counts(nodes: &[Node]) -> Vec<usize> {
        nodes.iter().map(|n| n.connection_count()).collect()
    }

    #[test]
    fn test_add_incidence_bumps_count() {
        let mut list = ConnectionList::new();
        let mut ns = nodes(2);
        let m = link(&mut list, &mut ns, 0, 1, 0);

        assert_eq!(list.len(), 2);
        assert_eq!(counts(&ns), vec![1, 1]);
        assert_eq!(list.nodes_of(m).unwrap(), [NodeId::from_raw(0), NodeId::from_raw(1)]);
        assert_eq!(list.muscles_of(NodeId::from_raw(0)), vec![m]);
        assert!(list.connected(NodeId::from_raw(0), NodeId::from_raw(1)));
    }

    #[test]
    fn test_remove_muscle_refuses_when_endpoint_has_two() {
        // triangle: every node has exactly two connections
        let mut list = ConnectionList::new();
        let mut ns = nodes(3);
        let m0 = link(&mut list, &mut ns, 0, 1, 0);
        link(&mut list, &mut ns, 1, 2, 1);
        link(&mut list, &mut ns, 2, 0, 2);
        let before = list.clone();

        let err = list.remove_muscle(m0, &mut ns).unwrap_err();
        assert!(err.is_recoverable());
        assert_eq!(list, before);
        assert_eq!(counts(&ns), vec![2, 2, 2]);
    }

    #[test]
    fn test_remove_muscle_when_both_endpoints_keep_two() {
        let (mut list, mut ns) = k4();
        let m = MuscleId::from_raw(0);

        list.remove_muscle(m, &mut ns).unwrap();
        assert!(!list.contains_muscle(m));
        assert_eq!(counts(&ns), vec![2, 2, 3, 3]);
        assert!(!list.connected(NodeId::from_raw(0), NodeId::from_raw(1)));

        // endpoints now have two connections, removing another muscle at node 0 fails
        let err = list.remove_muscle(MuscleId::from_raw(1), &mut ns).unwrap_err();
        assert_eq!(
            err,
            CreatureError::Crippled {
                muscle: MuscleId::from_raw(1),
                node: NodeId::from_raw(0)
            }
        );
    }

    #[test]
    fn test_remove_unknown_muscle_is_structural() {
        let (mut list, mut ns) = k4();
        assert!(matches!(
            list.remove_muscle(MuscleId::from_raw(42), &mut ns),
            Err(CreatureError::StructuralViolation(_))
        ));
    }

    #[test]
    fn test_remove_node_cascades() {
        // K4 plus node 4 hanging off nodes 0 and 1
        let (mut list, mut ns) = k4();
        ns.push(Node::new(NodeId::from_raw(4), 0.5, DVec2::new(9.0, 9.0)).unwrap());
        link(&mut list, &mut ns, 4, 0, 10);
        link(&mut list, &mut ns, 4, 1, 11);

        let removed = list.remove_node(NodeId::from_raw(4), &mut ns).unwrap();
        assert_eq!(removed, vec![MuscleId::from_raw(10), MuscleId::from_raw(11)]);
        assert_eq!(counts(&ns), vec![3, 3, 3, 3, 0]);
        assert!(list.muscles_of(NodeId::from_raw(4)).is_empty());
    }

    #[test]
    fn test_remove_node_refuses_to_cripple_neighbour() {
        let (mut list, mut ns) = k4();
        list.remove_muscle(MuscleId::from_raw(0), &mut ns).unwrap();
        let before = list.clone();
        let before_counts = counts(&ns);

        // node 0 now has two connections; removing node 2 would leave it with one
        let err = list.remove_node(NodeId::from_raw(2), &mut ns).unwrap_err();
        assert!(matches!(err, CreatureError::Crippled { .. }));
        assert_eq!(list, before);
        assert_eq!(counts(&ns), before_counts);
    }

    #[test]
    fn test_nodes_of_rejects_broken_muscle() {
        let mut list = ConnectionList::new();
        let mut ns = nodes(3);
        let m = MuscleId::from_raw(0);
        list.add_incidence(&mut ns[0], m);
        assert!(matches!(
            list.nodes_of(m),
            Err(CreatureError::StructuralViolation(_))
        ));

        list.add_incidence(&mut ns[1], m);
        list.add_incidence(&mut ns[2], m);
        assert!(list.nodes_of(m).is_err());

        let mut list = ConnectionList::new();
        list.add_incidence(&mut ns[0], m);
        list.add_incidence(&mut ns[0], m);
        assert!(list.nodes_of(m).is_err());
    }

    #[test]
    fn test_connected() {
        let mut list = ConnectionList::new();
        let mut ns = nodes(3);
        link(&mut list, &mut ns, 0, 1, 0);

        assert!(list.connected(NodeId::from_raw(1), NodeId::from_raw(0)));
        assert!(!list.connected(NodeId::from_raw(0), NodeId::from_raw(2)));
    }
}
