use std::sync::Arc;

use cgmath::{InnerSpace, Matrix, Matrix3, Quaternion, Rotation, Vector3};

use crate::geometry::ConvexHull;

use super::mass::MassProperties;

/// Rigid Body - a convex die moving as a unit
pub struct RigidBody {
    // === Physics State ===
    /// World position (center of mass)
    pub pos: Vector3<f32>,
    /// Linear velocity, units/s
    pub velocity: Vector3<f32>,
    /// Orientation (unit quaternion)
    pub orientation: Quaternion<f32>,
    /// Angular velocity, rad/s, world frame
    pub angular_vel: Vector3<f32>,
    pub mass: MassProperties,
    /// Unique ID for this body
    pub id: u32,

    // === Shape Definition ===
    /// Hull in local coordinates (relative to the center of mass)
    pub hull: Arc<ConvexHull>,
    /// Hull vertices in world coordinates, refreshed once per substep
    pub world_vertices: Vec<Vector3<f32>>,
    /// World inverse inertia, refreshed with `world_vertices`
    pub inv_inertia_world: Matrix3<f32>,
}

impl RigidBody {
    pub fn new(id: u32, hull: Arc<ConvexHull>, mass: MassProperties, pos: Vector3<f32>, orientation: Quaternion<f32>) -> Self {
        let mut body = Self {
            pos,
            velocity: Vector3::new(0.0, 0.0, 0.0),
            orientation: orientation.normalize(),
            angular_vel: Vector3::new(0.0, 0.0, 0.0),
            mass,
            id,
            world_vertices: Vec::with_capacity(hull.vertices.len()),
            hull,
            inv_inertia_world: mass.inv_inertia,
        };
        body.refresh_world();
        body
    }

    /// Transform a local point to world coordinates
    #[inline]
    pub fn local_to_world(&self, p: Vector3<f32>) -> Vector3<f32> {
        self.pos + self.orientation.rotate_vector(p)
    }

    #[inline]
    pub fn rotate(&self, v: Vector3<f32>) -> Vector3<f32> {
        self.orientation.rotate_vector(v)
    }

    /// World direction expressed in body-local coordinates
    #[inline]
    pub fn to_local(&self, v: Vector3<f32>) -> Vector3<f32> {
        self.orientation.conjugate().rotate_vector(v)
    }

    /// Recompute cached world vertices and the world inverse inertia
    /// (`R · I⁻¹ · Rᵀ`).
    pub fn refresh_world(&mut self) {
        self.world_vertices.clear();
        for i in 0..self.hull.vertices.len() {
            let v = self.local_to_world(self.hull.vertices[i]);
            self.world_vertices.push(v);
        }
        let r = Matrix3::from(self.orientation);
        self.inv_inertia_world = r * self.mass.inv_inertia * r.transpose();
    }

    /// Velocity of the material point at offset `r` from the center of mass
    #[inline]
    pub fn point_velocity(&self, r: Vector3<f32>) -> Vector3<f32> {
        self.velocity + self.angular_vel.cross(r)
    }

    /// Apply impulse at offset `r` from the center of mass
    pub fn apply_impulse(&mut self, impulse: Vector3<f32>, r: Vector3<f32>) {
        self.velocity += impulse * self.mass.inv_mass;
        self.angular_vel += self.inv_inertia_world * r.cross(impulse);
    }

    /// Gravity and damping, `v *= 1 / (1 + dt · c)`.
    pub fn integrate_velocity(&mut self, gravity: Vector3<f32>, linear_damping: f32, angular_damping: f32, dt: f32) {
        self.velocity += gravity * dt;
        self.velocity *= 1.0 / (1.0 + dt * linear_damping);
        self.angular_vel *= 1.0 / (1.0 + dt * angular_damping);
    }

    /// Semi-implicit Euler on position; `q += ½ dt (0, ω) q` on orientation.
    pub fn integrate_position(&mut self, dt: f32) {
        self.pos += self.velocity * dt;
        let spin = Quaternion::from_sv(0.0, self.angular_vel) * self.orientation;
        self.orientation = (self.orientation + spin * (0.5 * dt)).normalize();
    }

    pub fn speed_sq(&self) -> f32 {
        self.velocity.magnitude2()
    }

    pub fn spin_sq(&self) -> f32 {
        self.angular_vel.magnitude2()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cgmath::{Deg, Rotation3};

    fn unit_box_body() -> RigidBody {
        let half = Vector3::new(0.5, 0.5, 0.5);
        RigidBody::new(
            1,
            Arc::new(ConvexHull::cuboid(half)),
            MassProperties::cuboid(half, 1.0),
            Vector3::new(0.0, 0.0, 0.0),
            Quaternion::new(1.0, 0.0, 0.0, 0.0),
        )
    }

    #[test]
    fn impulse_through_center_only_moves_linearly() {
        let mut b = unit_box_body();
        b.apply_impulse(Vector3::new(2.0, 0.0, 0.0), Vector3::new(0.0, 0.0, 0.0));
        assert!((b.velocity.x - 2.0).abs() < 1e-6);
        assert!(b.angular_vel.magnitude() < 1e-6);
    }

    #[test]
    fn off_center_impulse_spins_the_body() {
        let mut b = unit_box_body();
        b.apply_impulse(Vector3::new(1.0, 0.0, 0.0), Vector3::new(0.0, 0.5, 0.0));
        // r × J = (0, 0.5, 0) × (1, 0, 0) = (0, 0, -0.5)
        assert!(b.angular_vel.z < 0.0);
    }

    #[test]
    fn orientation_integration_stays_normalized() {
        let mut b = unit_box_body();
        b.angular_vel = Vector3::new(3.0, -7.0, 11.0);
        for _ in 0..600 {
            b.integrate_position(1.0 / 60.0);
        }
        assert!((b.orientation.magnitude() - 1.0).abs() < 1e-5);
    }

    #[test]
    fn world_vertices_follow_the_transform() {
        let mut b = unit_box_body();
        b.pos = Vector3::new(0.0, 3.0, 0.0);
        b.orientation = Quaternion::from_angle_z(Deg(90.0));
        b.refresh_world();
        let top = b.world_vertices.iter().map(|v| v.y).fold(f32::MIN, f32::max);
        assert!((top - 3.5).abs() < 1e-5);
    }
}
