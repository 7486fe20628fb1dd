//! RigidBody - A convex solid that moves as a unit
//!
//! The body stores its hull in local coordinates (relative to the center of
//! mass) and transforms it to world coordinates using position and
//! orientation.

mod body;
mod mass;

pub use body::RigidBody;
pub use mass::MassProperties;
