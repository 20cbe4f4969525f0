//! Error types for creature construction, simulation and mutation

use thiserror::Error;

use crate::types::{MuscleId, NodeId};

/// Errors raised by nodes, muscles, the connection list and creatures
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CreatureError {
    /// Out-of-domain argument (friction, phase marker, tick count, ...)
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    /// Removal would leave a node with fewer than two connections
    #[error("Removing {muscle} would cripple {node}")]
    Crippled { muscle: MuscleId, node: NodeId },

    /// Internal consistency failure in the node/muscle graph
    #[error("Structural violation: {0}")]
    StructuralViolation(String),
}

/// Result type for creature operations
pub type CreatureResult<T> = Result<T, CreatureError>;

impl CreatureError {
    pub fn invalid(msg: impl Into<String>) -> Self {
        Self::InvalidParameter(msg.into())
    }

    pub fn structural(msg: impl Into<String>) -> Self {
        Self::StructuralViolation(msg.into())
    }

    /// Crippling removals can be retried with a different choice; everything
    /// else is a caller or programmer error.
    pub fn is_recoverable(&self) -> bool {
        matches!(self, Self::Crippled { .. })
    }
}
