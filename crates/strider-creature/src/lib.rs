//! Evolvable walkers for Strider
//!
//! This crate implements:
//! - Nodes (point masses) and muscles (actuated springs) held in per-creature arenas
//! - The incidence list binding every muscle to its two endpoints
//! - Random growth, Gaussian drift and structural mutation of creatures
//! - A kinematic locomotion simulator scoring how far a creature walks

pub mod config;
pub mod connections;
pub mod creature;
pub mod error;
pub mod locomotion;
pub mod muscle;
pub mod node;
pub mod render;
pub mod rng;
pub mod types;

// Re-export main types for convenience
pub use config::{CreatureConfig, SimulationConfig};
pub use connections::ConnectionList;
pub use creature::{Creature, StructuralMutation};
pub use error::{CreatureError, CreatureResult};
pub use muscle::Muscle;
pub use node::Node;
pub use render::{CreatureRenderData, MuscleRenderData, NodeRenderData};
pub use rng::EvolutionRng;
pub use types::{MuscleId, NodeId};
