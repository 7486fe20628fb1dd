//! Core utilities shared by every layer: errors and seeded randomness.

pub mod error;
pub mod random;

pub use error::EngineError;
pub use random::RollRng;
