//! RigidBodySystem - the dice tray's physics world
//!
//! Fixed room, fixed gravity, convex dice. Each `step` runs fixed substeps:
//! - integrate velocities (gravity, damping)
//! - contacts against the room planes and between dice (SAT)
//! - sequential-impulse solve (friction, restitution, Baumgarte)
//! - integrate positions and orientations

mod collision;
mod room;
mod solver;
mod system;

use std::sync::Arc;

use cgmath::{Quaternion, Vector3};

use crate::geometry::CollisionShape;
use crate::rigid_body::MassProperties;

pub use collision::Contact;
pub use room::{Plane, Room};
pub use system::{PhysicsWorld, StepStats};

/// Opaque handle returned by `add_body`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct BodyHandle(pub u32);

/// Everything needed to spawn a die body.
#[derive(Clone, Debug)]
pub struct BodyDesc {
    pub shape: Arc<CollisionShape>,
    pub mass: MassProperties,
    pub position: Vector3<f32>,
    pub orientation: Quaternion<f32>,
    pub velocity: Vector3<f32>,
    pub angular_velocity: Vector3<f32>,
}

/// Snapshot of a body after the last step.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BodyState {
    pub position: Vector3<f32>,
    pub orientation: Quaternion<f32>,
    pub velocity: Vector3<f32>,
    pub angular_velocity: Vector3<f32>,
}

/// What the roll session needs from a physics backend.
pub trait Simulation {
    fn add_body(&mut self, desc: BodyDesc) -> BodyHandle;
    fn remove_body(&mut self, handle: BodyHandle);
    /// Advance by host time; the backend decides how many substeps that is.
    fn step(&mut self, real_dt: f32) -> StepStats;
    fn body_state(&self, handle: BodyHandle) -> Option<BodyState>;
    fn body_count(&self) -> usize;
    /// Walls the bodies collide with; spawning uses the same room.
    fn room(&self) -> &Room;
}
