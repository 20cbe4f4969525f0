//! Generational evolution of Strider walkers
//!
//! This crate implements:
//! - Genesis and succession of ranked creature populations
//! - Natural selection (random deaths plus culling of the slowest) and reproduction
//! - Layered configuration loading (defaults, `strider.ron`, `STRIDER_*` env vars)
//! - An [`Evolution`] driver recording per-generation statistics

pub mod config;
pub mod error;
pub mod evolution;
pub mod generation;
pub mod stats;

// Re-export main types for convenience
pub use crate::config::EvolutionConfig;
pub use error::{EvolutionError, EvolutionResult};
pub use evolution::Evolution;
pub use generation::Generation;
pub use stats::GenerationStats;
