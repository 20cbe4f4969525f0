//! Error types for the evolutionary loop

use strider_creature::CreatureError;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum EvolutionError {
    #[error(transparent)]
    Creature(#[from] CreatureError),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),
}

pub type EvolutionResult<T> = Result<T, EvolutionError>;
