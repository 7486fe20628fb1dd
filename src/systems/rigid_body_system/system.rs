use std::sync::Arc;

use cgmath::Vector3;

use crate::domain::config::{MaterialsConfig, PhysicsConfig, RoomConfig};
use crate::rigid_body::RigidBody;

use super::collision::{hull_contacts, room_contacts, Contact};
use super::room::Room;
use super::solver::solve_contacts;
use super::{BodyDesc, BodyHandle, BodyState, Simulation};

/// Substeps land within this fraction of a substep of the accumulator.
const ACCUMULATOR_EPS: f32 = 1e-3;

/// Work done by the last `step` call.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct StepStats {
    pub substeps: u32,
    pub contacts: u32,
}

/// Manages all dice bodies inside the room
pub struct PhysicsWorld {
    bodies: Vec<RigidBody>,
    next_id: u32,
    room: Room,
    config: PhysicsConfig,
    materials: MaterialsConfig,
    gravity: Vector3<f32>,
    accumulator: f32,
    contacts: Vec<Contact>,
}

impl PhysicsWorld {
    pub fn new(width: u32, height: u32, physics: PhysicsConfig, materials: MaterialsConfig, room: &RoomConfig) -> Self {
        Self {
            bodies: Vec::new(),
            next_id: 1,
            room: Room::new(width, height, room),
            gravity: Vector3::new(0.0, -physics.gravity, 0.0),
            config: physics,
            materials,
            accumulator: 0.0,
            contacts: Vec::new(),
        }
    }

    /// Remove all bodies.
    pub fn clear(&mut self) {
        self.bodies.clear();
        self.accumulator = 0.0;
    }

    /// One fixed substep.
    fn substep(&mut self, dt: f32) -> u32 {
        let cfg = &self.config;
        for body in self.bodies.iter_mut() {
            body.refresh_world();
            body.integrate_velocity(self.gravity, cfg.linear_damping, cfg.angular_damping, dt);
        }

        self.contacts.clear();
        for (i, body) in self.bodies.iter().enumerate() {
            room_contacts(&self.room, i, body, &mut self.contacts);
        }
        for i in 0..self.bodies.len() {
            for j in (i + 1)..self.bodies.len() {
                hull_contacts(i, &self.bodies[i], j, &self.bodies[j], &mut self.contacts);
            }
        }

        solve_contacts(
            &mut self.bodies,
            &self.contacts,
            &self.config,
            self.materials.room,
            self.materials.die,
            dt,
        );

        for body in self.bodies.iter_mut() {
            body.integrate_position(dt);
        }
        self.contacts.len() as u32
    }
}

impl Simulation for PhysicsWorld {
    fn add_body(&mut self, desc: BodyDesc) -> BodyHandle {
        let id = self.next_id;
        self.next_id = self.next_id.saturating_add(1);

        let mut body = RigidBody::new(
            id,
            Arc::new(desc.shape.to_hull()),
            desc.mass,
            desc.position,
            desc.orientation,
        );
        body.velocity = desc.velocity;
        body.angular_vel = desc.angular_velocity;
        self.bodies.push(body);
        BodyHandle(id)
    }

    fn remove_body(&mut self, handle: BodyHandle) {
        if let Some(idx) = self.bodies.iter().position(|b| b.id == handle.0) {
            self.bodies.remove(idx);
        }
    }

    /// Clamp host time to `max_frame_time`, then run whole substeps; the
    /// remainder carries over, anything past the clamp is dropped.
    fn step(&mut self, real_dt: f32) -> StepStats {
        let h = self.config.substep;
        let dt = if real_dt.is_finite() {
            real_dt.clamp(0.0, self.config.max_frame_time)
        } else {
            0.0
        };
        self.accumulator += dt;

        let mut stats = StepStats::default();
        while self.accumulator >= h * (1.0 - ACCUMULATOR_EPS) {
            stats.contacts += self.substep(h);
            stats.substeps += 1;
            self.accumulator = (self.accumulator - h).max(0.0);
        }
        stats
    }

    fn body_state(&self, handle: BodyHandle) -> Option<BodyState> {
        self.bodies.iter().find(|b| b.id == handle.0).map(|b| BodyState {
            position: b.pos,
            orientation: b.orientation,
            velocity: b.velocity,
            angular_velocity: b.angular_vel,
        })
    }

    fn body_count(&self) -> usize {
        self.bodies.len()
    }

    fn room(&self) -> &Room {
        &self.room
    }
}
