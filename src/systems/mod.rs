//! Systems: rigid body math, the physics world and the face resolver.

pub mod resolver;
pub mod rigid_body;
pub mod rigid_body_system;
