//! Domain types: die kinds, roll results and the engine tuning bundle.

pub mod config;
pub mod dice;

pub use config::{ContactMaterial, EngineConfig};
pub use dice::{DieType, RollResult};
