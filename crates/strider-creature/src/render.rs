//! Read-only snapshots for whatever draws the creatures

use glam::DVec2;

use crate::creature::Creature;
use crate::error::CreatureResult;
use crate::types::{MuscleId, NodeId};

/// Render data for a single node
#[derive(Debug, Clone, PartialEq)]
pub struct NodeRenderData {
    pub id: NodeId,
    pub position: DVec2,
    pub color: [u8; 4],
}

/// Render data for a single muscle, drawn as a segment between its endpoints
#[derive(Debug, Clone, PartialEq)]
pub struct MuscleRenderData {
    pub id: MuscleId,
    pub start: DVec2,
    pub end: DVec2,
    pub contracted: bool,
}

/// Render data for an entire creature
#[derive(Debug, Clone, PartialEq)]
pub struct CreatureRenderData {
    pub nodes: Vec<NodeRenderData>,
    pub muscles: Vec<MuscleRenderData>,
    /// Mean node position, the point whose X is the fitness
    pub centroid: DVec2,
}

/// Map friction onto a 24-bit RGB gradient
///
/// Friction outside `[0, 1]` (possible after mutation) is clamped first.
pub fn friction_color(friction: f64) -> [u8; 4] {
    let c = (friction.clamp(0.0, 1.0) * 0xFF_FFFF as f64) as u32;
    [(c >> 16) as u8, (c >> 8) as u8, c as u8, 255]
}

impl Creature {
    /// Snapshot of the current pose; `time_quotient` selects which muscles
    /// show as contracted
    pub fn render_data(&self, time_quotient: f64) -> CreatureResult<CreatureRenderData> {
        let nodes = self
            .nodes()
            .iter()
            .map(|node| NodeRenderData {
                id: node.id(),
                position: node.position(),
                color: friction_color(node.friction()),
            })
            .collect();

        let mut muscles = Vec::with_capacity(self.muscles().len());
        for muscle in self.muscles() {
            let (a, b) = self.endpoint_indices(muscle.id())?;
            muscles.push(MuscleRenderData {
                id: muscle.id(),
                start: self.nodes()[a].position(),
                end: self.nodes()[b].position(),
                contracted: muscle.is_contracted(time_quotient)?,
            });
        }

        Ok(CreatureRenderData {
            nodes,
            muscles,
            centroid: self.mean_position(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::CreatureConfig;
    use rand::SeedableRng;
    use rand_xoshiro::Xoshiro256StarStar;

    #[test]
    fn test_friction_color_gradient() {
        assert_eq!(friction_color(0.0), [0, 0, 0, 255]);
        assert_eq!(friction_color(1.0), [255, 255, 255, 255]);
        assert_eq!(friction_color(0.5), [127, 255, 255, 255]);
        assert_eq!(friction_color(-3.0), friction_color(0.0));
        assert_eq!(friction_color(7.0), friction_color(1.0));
    }

    #[test]
    fn test_render_data_matches_creature() {
        let mut rng = Xoshiro256StarStar::seed_from_u64(12345);
        let creature = Creature::random(&mut rng, &CreatureConfig::default()).unwrap();

        let data = creature.render_data(0.0).unwrap();
        assert_eq!(data.nodes.len(), creature.nodes().len());
        assert_eq!(data.muscles.len(), creature.muscles().len());
        assert_eq!(data.centroid, creature.mean_position());

        for segment in &data.muscles {
            let [a, b] = creature.connections().nodes_of(segment.id).unwrap();
            assert_eq!(segment.start, creature.node(a).unwrap().position());
            assert_eq!(segment.end, creature.node(b).unwrap().position());
        }
        assert!(creature.render_data(1.5).is_err());
    }
}
